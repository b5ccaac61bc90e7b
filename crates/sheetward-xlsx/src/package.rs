//! OPC package plumbing: part names, relationships and content types

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{CodecError, CodecResult};
use crate::xml::attr;

pub(crate) type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";
pub(crate) const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const VBA_PROJECT_PART: &str = "xl/vbaProject.bin";

pub(crate) mod ns {
    pub const SPREADSHEETML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    pub const RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
    pub const DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
    pub const SPREADSHEET_DRAWING: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
}

pub(crate) mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const DRAWING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const VBA_PROJECT: &str = "http://schemas.microsoft.com/office/2006/relationships/vbaProject";
}

pub(crate) mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const WORKBOOK: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const WORKBOOK_MACRO_ENABLED: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
    pub const DRAWING: &str = "application/vnd.openxmlformats-officedocument.drawing+xml";
    pub const CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
    pub const VBA_PROJECT: &str = "application/vnd.ms-office.vbaProject";
}

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target resolved to a part name, unless external
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with the given short name, e.g. `/worksheet`
    pub fn is_kind(&self, suffix: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|last| last == suffix)
    }
}

/// Read a whole part, `None` when the archive has no such entry
pub(crate) fn read_part(archive: &mut Archive<'_>, name: &str) -> CodecResult<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(CodecError::corrupt(format!("cannot open {}: {}", name, e))),
    };
    let mut bytes = Vec::with_capacity(file.size().min(1 << 24) as usize);
    file.read_to_end(&mut bytes)
        .map_err(|e| CodecError::corrupt(format!("cannot read {}: {}", name, e)))?;
    Ok(Some(bytes))
}

/// Read a part that must exist
pub(crate) fn require_part(archive: &mut Archive<'_>, name: &str) -> CodecResult<Vec<u8>> {
    read_part(archive, name)?
        .ok_or_else(|| CodecError::corrupt(format!("missing required part {}", name)))
}

/// Name of the relationships part describing `part`
///
/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Parse the relationships of `source_part` from the bytes of its rels part
pub(crate) fn parse_relationships(
    xml: &[u8],
    source_part: &str,
) -> CodecResult<Vec<Relationship>> {
    let rels_part = rels_path_for(source_part);
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr(&e, b"Id");
                let target = attr(&e, b"Target");
                let rel_type = attr(&e, b"Type").unwrap_or_default();
                let external = attr(&e, b"TargetMode").as_deref() == Some("External");

                if let (Some(id), Some(target)) = (id, target) {
                    let target = if external {
                        target
                    } else {
                        resolve_target(source_part, &target)
                    };
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CodecError::malformed_xml(&rels_part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Relationships of `source_part`, empty when it has no rels part
pub(crate) fn read_relationships(
    archive: &mut Archive<'_>,
    source_part: &str,
) -> CodecResult<Vec<Relationship>> {
    match read_part(archive, &rels_path_for(source_part))? {
        Some(xml) => parse_relationships(&xml, source_part),
        None => Ok(Vec::new()),
    }
}

/// `[Content_Types].xml`
#[derive(Debug, Default)]
pub(crate) struct ContentTypes {
    /// Extension (lower case) -> content type
    pub defaults: Vec<(String, String)>,
    /// Part name without the leading `/` -> content type
    pub overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &[u8]) -> CodecResult<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut types = ContentTypes::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (attr(&e, b"Extension"), attr(&e, b"ContentType"))
                        {
                            types.defaults.push((ext.to_ascii_lowercase(), ct));
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) =
                            (attr(&e, b"PartName"), attr(&e, b"ContentType"))
                        {
                            types
                                .overrides
                                .push((part.trim_start_matches('/').to_string(), ct));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(CodecError::malformed_xml(CONTENT_TYPES_PART, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Parts declared with an override of the given content type
    pub fn parts_of_type<'a>(&'a self, content_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.overrides
            .iter()
            .filter(move |(_, ct)| ct == content_type)
            .map(|(part, _)| part.as_str())
    }

    /// Content type of a part, falling back to the extension default
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| p == part) {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }
}
