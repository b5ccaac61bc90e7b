//! Charts reached through a worksheet's drawing part

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{CodecError, CodecResult};
use crate::package::{read_part, read_relationships, Archive, Relationship};
use crate::xml::local_attr;
use sheetward_core::chart::{Chart, ChartAnchor, ChartKind, DataReference, DataSeries};
use sheetward_core::CellAddress;

/// Read every supported chart drawn on a worksheet
///
/// Drawing problems never fail the decode: an unreadable drawing or chart
/// part is logged and skipped.
pub(crate) fn read_sheet_charts(
    archive: &mut Archive<'_>,
    sheet_part: &str,
    drawing_rid: &str,
    sheet_rels: &[Relationship],
) -> Vec<Chart> {
    let Some(drawing) = sheet_rels
        .iter()
        .find(|rel| rel.id == drawing_rid && rel.is_kind("drawing") && !rel.external)
    else {
        warn!("{}: drawing relationship {} not found", sheet_part, drawing_rid);
        return Vec::new();
    };

    match read_drawing(archive, &drawing.target) {
        Ok(charts) => charts,
        Err(e) => {
            warn!("{}: skipping drawing {}: {}", sheet_part, drawing.target, e);
            Vec::new()
        }
    }
}

fn read_drawing(archive: &mut Archive<'_>, drawing_part: &str) -> CodecResult<Vec<Chart>> {
    let Some(xml) = read_part(archive, drawing_part)? else {
        return Err(CodecError::corrupt(format!("missing part {}", drawing_part)));
    };
    let anchors = parse_anchors(&xml, drawing_part)?;
    if anchors.is_empty() {
        return Ok(Vec::new());
    }
    let rels = read_relationships(archive, drawing_part)?;

    let mut charts = Vec::new();
    for anchor in anchors {
        let Some(rel) = rels
            .iter()
            .find(|rel| rel.id == anchor.chart_rid && rel.is_kind("chart"))
        else {
            warn!("{}: chart relationship {} not found", drawing_part, anchor.chart_rid);
            continue;
        };
        let Some(chart_xml) = read_part(archive, &rel.target)? else {
            warn!("{}: missing chart part {}", drawing_part, rel.target);
            continue;
        };
        match parse_chart(&chart_xml, &rel.target, anchor.anchor) {
            Ok(Some(chart)) => {
                debug!("{}: read {} chart", rel.target, chart.kind);
                charts.push(chart);
            }
            Ok(None) => {}
            Err(e) => warn!("skipping chart {}: {}", rel.target, e),
        }
    }
    Ok(charts)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChartPlacement {
    pub anchor: ChartAnchor,
    pub chart_rid: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Marker {
    From,
    To,
}

#[derive(Clone, Copy, PartialEq)]
enum MarkerField {
    Col,
    Row,
}

/// Chart frames anchored in a drawing part; pictures and shapes are ignored
pub(crate) fn parse_anchors(xml: &[u8], part: &str) -> CodecResult<Vec<ChartPlacement>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut placements = Vec::new();

    let mut in_anchor = false;
    let mut marker: Option<Marker> = None;
    let mut field: Option<MarkerField> = None;
    // 0-based (col, row) as written in the part
    let mut from: Option<(u32, u32)> = None;
    let mut to: Option<(u32, u32)> = None;
    let mut chart_rid: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    in_anchor = true;
                    from = None;
                    to = None;
                    chart_rid = None;
                }
                b"from" if in_anchor => marker = Some(Marker::From),
                b"to" if in_anchor => marker = Some(Marker::To),
                b"col" if marker.is_some() => field = Some(MarkerField::Col),
                b"row" if marker.is_some() => field = Some(MarkerField::Row),
                b"chart" if in_anchor => chart_rid = local_attr(&e, b"id"),
                _ => {}
            },
            Ok(Event::Empty(e)) if in_anchor && e.local_name().as_ref() == b"chart" => {
                chart_rid = local_attr(&e, b"id");
            }
            Ok(Event::Text(t)) => {
                if let (Some(m), Some(f)) = (marker, field) {
                    let value = t
                        .unescape()
                        .ok()
                        .and_then(|v| v.trim().parse::<u32>().ok())
                        .unwrap_or(0);
                    let slot = match m {
                        Marker::From => &mut from,
                        Marker::To => &mut to,
                    };
                    let (col, row) = slot.get_or_insert((0, 0));
                    match f {
                        MarkerField::Col => *col = value,
                        MarkerField::Row => *row = value,
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"col" | b"row" => field = None,
                b"from" | b"to" => marker = None,
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    in_anchor = false;
                    if let (Some(rid), Some(start)) = (chart_rid.take(), from) {
                        let anchor = match (marker_address(start), to.map(marker_address)) {
                            (Some(from_addr), Some(Some(to_addr))) => Some(ChartAnchor {
                                from: from_addr,
                                to: to_addr,
                            }),
                            (Some(from_addr), None) => {
                                let (cols, rows) = ChartAnchor::DEFAULT_SIZE;
                                Some(ChartAnchor::with_size(from_addr, cols, rows))
                            }
                            _ => None,
                        };
                        match anchor {
                            Some(anchor) => placements.push(ChartPlacement {
                                anchor,
                                chart_rid: rid,
                            }),
                            None => warn!("{}: chart {} anchored off the sheet skipped", part, rid),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(CodecError::malformed_xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(placements)
}

/// Zero-based `(col, row)` marker to a sheet address
fn marker_address((col, row): (u32, u32)) -> Option<CellAddress> {
    CellAddress::checked(row.checked_add(1)?, col.checked_add(1)?).ok()
}

#[derive(Debug, Default)]
struct SeriesBuilder {
    name: String,
    categories: String,
    values: String,
}

/// Which text a `<c:f>` or `<a:t>` belongs to
enum TextTarget {
    SeriesName,
    SeriesCategories,
    SeriesValues,
    ChartTitle,
    AxisTitle(usize),
}

const AXIS_ELEMENTS: &[&[u8]] = &[b"catAx", b"valAx", b"dateAx", b"serAx"];

fn plot_kind(local: &[u8]) -> Option<Result<ChartKind, &'static str>> {
    Some(match local {
        b"barChart" | b"bar3DChart" => Ok(ChartKind::Bar),
        b"lineChart" | b"line3DChart" => Ok(ChartKind::Line),
        b"pieChart" | b"pie3DChart" => Ok(ChartKind::Pie),
        b"scatterChart" => Ok(ChartKind::Scatter),
        b"areaChart" | b"area3DChart" => Err("area"),
        b"radarChart" => Err("radar"),
        b"doughnutChart" => Err("doughnut"),
        b"ofPieChart" => Err("pie-of-pie"),
        b"bubbleChart" => Err("bubble"),
        b"stockChart" => Err("stock"),
        b"surfaceChart" | b"surface3DChart" => Err("surface"),
        _ => return None,
    })
}

/// Parse a chart part; `None` for chart types the model does not carry
pub(crate) fn parse_chart(
    xml: &[u8],
    part: &str,
    anchor: ChartAnchor,
) -> CodecResult<Option<Chart>> {
    // `<a:t>` runs keep their edge spaces; text outside the leaves is ignored
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();

    let mut kind: Option<ChartKind> = None;
    let mut unsupported: Option<&'static str> = None;
    // Depth of the plot element whose series are read
    let mut plot_depth: Option<usize> = None;
    let mut series: Vec<SeriesBuilder> = Vec::new();
    let mut current: Option<SeriesBuilder> = None;
    let mut axis_count = 0usize;
    let mut title = String::new();
    let mut axis_titles = [String::new(), String::new()];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();
                let parent_is_plot_area = stack.last().is_some_and(|p| p == b"plotArea");

                if parent_is_plot_area {
                    if let Some(found) = plot_kind(&local) {
                        match found {
                            Ok(k) if kind.is_none() => {
                                kind = Some(k);
                                plot_depth = Some(stack.len());
                            }
                            Ok(_) => {}
                            Err(name) => {
                                unsupported.get_or_insert(name);
                            }
                        }
                    } else if AXIS_ELEMENTS.contains(&local.as_slice()) {
                        axis_count += 1;
                    }
                }
                if local == b"ser" && plot_depth.is_some_and(|d| stack.len() == d + 1) {
                    current = Some(SeriesBuilder::default());
                }
                stack.push(local);
            }
            Ok(Event::End(_)) => {
                if let Some(local) = stack.pop() {
                    if local == b"ser" {
                        if let Some(done) = current.take() {
                            series.push(done);
                        }
                    }
                    if plot_depth == Some(stack.len()) {
                        plot_depth = None;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(target) = text_target(&stack, current.is_some(), axis_count) {
                    let text = t
                        .unescape()
                        .map_err(|e| CodecError::malformed_xml(part, e))?;
                    let slot = match target {
                        TextTarget::ChartTitle => Some(&mut title),
                        TextTarget::AxisTitle(i) => Some(&mut axis_titles[i]),
                        TextTarget::SeriesName => current.as_mut().map(|b| &mut b.name),
                        TextTarget::SeriesCategories => {
                            current.as_mut().map(|b| &mut b.categories)
                        }
                        TextTarget::SeriesValues => current.as_mut().map(|b| &mut b.values),
                    };
                    if let Some(slot) = slot {
                        slot.push_str(&text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CodecError::malformed_xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    let Some(kind) = kind else {
        warn!(
            "{}: unsupported chart type {}",
            part,
            unsupported.unwrap_or("(none)")
        );
        return Ok(None);
    };

    let mut chart = Chart::new(kind, anchor);
    chart.title = non_empty(title);
    let [x_title, y_title] = axis_titles;
    chart.x_axis_title = non_empty(x_title);
    chart.y_axis_title = non_empty(y_title);

    for builder in series {
        let Some(values) = DataReference::parse(&builder.values) else {
            warn!("{}: series without a cell reference for values skipped", part);
            continue;
        };
        chart.series.push(DataSeries {
            name: DataReference::parse(&builder.name),
            categories: DataReference::parse(&builder.categories),
            values,
        });
    }

    Ok(Some(chart))
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn text_target(stack: &[Vec<u8>], in_series: bool, axis_count: usize) -> Option<TextTarget> {
    let leaf = stack.last()?.as_slice();

    if in_series && leaf == b"f" {
        let ser = stack.iter().rposition(|s| s == b"ser")?;
        return match stack.get(ser + 1)?.as_slice() {
            b"tx" => Some(TextTarget::SeriesName),
            b"cat" | b"xVal" => Some(TextTarget::SeriesCategories),
            b"val" | b"yVal" => Some(TextTarget::SeriesValues),
            _ => None,
        };
    }

    if leaf == b"t" {
        let title = stack.iter().rposition(|s| s == b"title")?;
        let owner = stack.get(title.checked_sub(1)?)?.as_slice();
        if owner == b"chart" {
            return Some(TextTarget::ChartTitle);
        }
        if AXIS_ELEMENTS.contains(&owner) && (1..=2).contains(&axis_count) {
            return Some(TextTarget::AxisTitle(axis_count - 1));
        }
    }

    None
}
