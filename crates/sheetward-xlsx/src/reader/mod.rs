//! XLSX reader

mod drawing;
mod formula;
mod sheet;

use std::io::Cursor;

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{CodecError, CodecResult};
use crate::package::{
    content_type, read_part, read_relationships, require_part, resolve_target, Archive,
    ContentTypes, Relationship, CONTENT_TYPES_PART, DEFAULT_WORKBOOK_PART, VBA_PROJECT_PART,
};
use crate::styles::read_styles_xml;
use crate::xml::{attr, local_attr};
use crate::DecodeOptions;
use sheetward_core::style::Style;
use sheetward_core::{MacroArchive, SheetVisibility, Workbook, Worksheet};

use self::sheet::{CellBudget, SheetContext};

/// Leading bytes of an OLE compound file (legacy `.xls`, or an encrypted package)
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// One `<sheet>` entry of workbook.xml
#[derive(Debug, Clone, PartialEq)]
struct SheetEntry {
    name: String,
    rel_id: String,
    visibility: SheetVisibility,
}

#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    active_tab: usize,
}

/// XLSX package reader
pub struct XlsxReader;

impl XlsxReader {
    /// Decode a package held in memory
    pub fn read(bytes: &[u8], options: &DecodeOptions) -> CodecResult<Workbook> {
        if bytes.starts_with(&OLE_SIGNATURE) {
            return Err(CodecError::UnsupportedFormat(
                "OLE compound document (legacy .xls or encrypted workbook)".into(),
            ));
        }

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| CodecError::corrupt(format!("not a zip package: {}", e)))?;

        let content_types =
            ContentTypes::parse(&require_part(&mut archive, CONTENT_TYPES_PART)?)?;
        Self::check_document_kind(&archive)?;

        let workbook_part = Self::workbook_part(&mut archive)?;
        let info = Self::read_workbook_xml(
            &require_part(&mut archive, &workbook_part)?,
            &workbook_part,
        )?;
        let workbook_rels = read_relationships(&mut archive, &workbook_part)?;

        let shared_strings =
            match Self::related_part(&workbook_rels, &workbook_part, "sharedStrings") {
                Some(part) => match read_part(&mut archive, &part)? {
                    Some(xml) => sheet::read_shared_strings(&xml, &part)?,
                    None => Vec::new(),
                },
                None => Vec::new(),
            };
        let cell_styles = match Self::related_part(&workbook_rels, &workbook_part, "styles") {
            Some(part) => match read_part(&mut archive, &part)? {
                Some(xml) => read_styles_xml(&xml)?,
                None => vec![Style::default()],
            },
            None => vec![Style::default()],
        };

        let ctx = SheetContext {
            shared_strings: &shared_strings,
            cell_styles: &cell_styles,
            max_cells: options.max_cells,
        };
        let mut budget = CellBudget::default();
        let mut workbook = Workbook::empty();

        for entry in &info.sheets {
            let Some(rel) = workbook_rels.iter().find(|r| r.id == entry.rel_id) else {
                return Err(CodecError::corrupt(format!(
                    "sheet '{}' refers to unknown relationship {}",
                    entry.name, entry.rel_id
                )));
            };
            if !rel.is_kind("worksheet") {
                warn!("skipping sheet '{}': {} is not a worksheet", entry.name, rel.target);
                continue;
            }

            let xml = require_part(&mut archive, &rel.target)?;
            let mut worksheet = Worksheet::new(entry.name.as_str());
            worksheet.set_visibility(entry.visibility);

            let drawing_rid =
                sheet::read_worksheet(&xml, &rel.target, &mut worksheet, &ctx, &mut budget)?;
            if let Some(rid) = drawing_rid {
                let sheet_rels = read_relationships(&mut archive, &rel.target)?;
                let charts =
                    drawing::read_sheet_charts(&mut archive, &rel.target, &rid, &sheet_rels);
                for chart in charts {
                    worksheet.add_chart(chart);
                }
            }

            workbook
                .add_existing_worksheet(worksheet)
                .map_err(|e| CodecError::corrupt(format!("{}: {}", workbook_part, e)))?;
        }

        if info.active_tab < workbook.sheet_count() {
            workbook
                .set_active_sheet(info.active_tab)
                .map_err(|e| CodecError::corrupt(e.to_string()))?;
        }

        let macros = if options.preserve_macros {
            Self::read_macro_archive(&mut archive, &content_types)?
        } else {
            MacroArchive::NotInspected
        };
        workbook.set_macro_archive(macros);

        debug!(
            "decoded {} sheets, {} stored cells",
            workbook.sheet_count(),
            budget.stored
        );
        Ok(workbook)
    }

    /// Reject packages that are valid OPC but not an XML spreadsheet
    fn check_document_kind(archive: &Archive<'_>) -> CodecResult<()> {
        for name in archive.file_names() {
            if name.starts_with("word/") {
                return Err(CodecError::UnsupportedFormat("word processing document".into()));
            }
            if name.starts_with("ppt/") {
                return Err(CodecError::UnsupportedFormat("presentation document".into()));
            }
            if name == "xl/workbook.bin" {
                return Err(CodecError::UnsupportedFormat("binary workbook (.xlsb)".into()));
            }
        }
        Ok(())
    }

    /// Workbook part named by the package's officeDocument relationship
    fn workbook_part(archive: &mut Archive<'_>) -> CodecResult<String> {
        let root_rels = read_relationships(archive, "")?;
        let part = root_rels
            .iter()
            .find(|r| r.is_kind("officeDocument") && !r.external)
            .map(|r| r.target.clone())
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());

        if part.ends_with(".bin") {
            return Err(CodecError::UnsupportedFormat("binary workbook (.xlsb)".into()));
        }
        Ok(part)
    }

    /// Target of the workbook relationship of a given kind, falling back to the
    /// conventional part name
    fn related_part(rels: &[Relationship], workbook_part: &str, kind: &str) -> Option<String> {
        match rels.iter().find(|r| r.is_kind(kind)) {
            Some(rel) if rel.external => None,
            Some(rel) => Some(rel.target.clone()),
            None => Some(resolve_target(workbook_part, &format!("{}.xml", kind))),
        }
    }

    /// Read workbook.xml: sheet order, names, visibility and the active tab
    fn read_workbook_xml(xml: &[u8], part: &str) -> CodecResult<WorkbookInfo> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let name = attr(&e, b"name");
                        let rel_id = local_attr(&e, b"id");
                        let visibility = attr(&e, b"state")
                            .map(|s| SheetVisibility::from_xml(&s))
                            .unwrap_or_default();

                        match (name, rel_id) {
                            (Some(name), Some(rel_id)) => info.sheets.push(SheetEntry {
                                name,
                                rel_id,
                                visibility,
                            }),
                            _ => {
                                return Err(CodecError::corrupt(format!(
                                    "{}: <sheet> without name or r:id",
                                    part
                                )))
                            }
                        }
                    }
                    b"workbookView" => {
                        info.active_tab = attr(&e, b"activeTab")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(CodecError::malformed_xml(part, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Locate the macro project by name or by content type
    fn read_macro_archive(
        archive: &mut Archive<'_>,
        content_types: &ContentTypes,
    ) -> CodecResult<MacroArchive> {
        let part = archive
            .file_names()
            .find(|name| {
                *name == VBA_PROJECT_PART
                    || content_types.content_type_of(name) == Some(content_type::VBA_PROJECT)
            })
            .map(str::to_string);

        let Some(part) = part else {
            return Ok(MacroArchive::Absent);
        };
        match read_part(archive, &part)? {
            Some(bytes) => {
                debug!("macro project {} ({} bytes)", part, bytes.len());
                Ok(MacroArchive::Present(bytes))
            }
            None => Ok(MacroArchive::Absent),
        }
    }
}
