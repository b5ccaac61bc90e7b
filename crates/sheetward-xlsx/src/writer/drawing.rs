//! DrawingML parts for embedded charts

use log::debug;

use crate::package::ns;
use crate::xml::escape_text;
use sheetward_core::chart::{Chart, ChartKind, DataReference};

const CATEGORY_AXIS_ID: u32 = 1;
const VALUE_AXIS_ID: u32 = 2;

/// `xl/drawings/drawingN.xml`: one two-cell anchor per chart
///
/// The k-th anchor refers to the chart through relationship `rId{k+1}`.
pub(crate) fn drawing_xml(charts: &[Chart]) -> String {
    let mut content = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <xdr:wsDr xmlns:xdr=\"{}\" xmlns:a=\"{}\">",
        ns::SPREADSHEET_DRAWING,
        ns::DRAWINGML
    );

    for (k, chart) in charts.iter().enumerate() {
        let from = chart.anchor.from;
        let to = chart.anchor.to;
        content.push_str("<xdr:twoCellAnchor editAs=\"oneCell\">");
        push_marker(&mut content, "from", from.col, from.row);
        push_marker(&mut content, "to", to.col, to.row);
        content.push_str(&format!(
            "<xdr:graphicFrame macro=\"\">\
             <xdr:nvGraphicFramePr><xdr:cNvPr id=\"{}\" name=\"Chart {}\"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>\
             <xdr:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/></xdr:xfrm>\
             <a:graphic><a:graphicData uri=\"{chart_ns}\">\
             <c:chart xmlns:c=\"{chart_ns}\" xmlns:r=\"{rel_ns}\" r:id=\"rId{}\"/>\
             </a:graphicData></a:graphic></xdr:graphicFrame>",
            k + 2,
            k + 1,
            k + 1,
            chart_ns = ns::CHART,
            rel_ns = ns::RELATIONSHIPS,
        ));
        content.push_str("<xdr:clientData/></xdr:twoCellAnchor>");
    }

    content.push_str("</xdr:wsDr>");
    content
}

/// Anchor markers are 0-based
fn push_marker(content: &mut String, tag: &str, col: u32, row: u32) {
    content.push_str(&format!(
        "<xdr:{tag}><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff>\
         <xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:{tag}>",
        col.saturating_sub(1),
        row.saturating_sub(1),
    ));
}

/// `xl/charts/chartK.xml`
pub(crate) fn chart_xml(chart: &Chart, number: usize) -> String {
    let mut content = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <c:chartSpace xmlns:c=\"{}\" xmlns:a=\"{}\" xmlns:r=\"{}\">\
         <c:date1904 val=\"0\"/><c:lang val=\"en-US\"/><c:roundedCorners val=\"0\"/><c:chart>",
        ns::CHART,
        ns::DRAWINGML,
        ns::RELATIONSHIPS
    );

    match chart.title.as_deref() {
        Some(title) => {
            push_title(&mut content, title);
            content.push_str("<c:autoTitleDeleted val=\"0\"/>");
        }
        None => content.push_str("<c:autoTitleDeleted val=\"1\"/>"),
    }

    content.push_str("<c:plotArea><c:layout/>");
    push_plot(&mut content, chart);
    if chart.kind.has_axes() {
        push_axes(&mut content, chart);
    }
    content.push_str("</c:plotArea>");

    content.push_str(
        "<c:legend><c:legendPos val=\"r\"/><c:overlay val=\"0\"/></c:legend>\
         <c:plotVisOnly val=\"1\"/><c:dispBlanksAs val=\"gap\"/></c:chart>",
    );
    content.push_str(
        "<c:printSettings><c:headerFooter/>\
         <c:pageMargins b=\"0.75\" l=\"0.7\" r=\"0.7\" t=\"0.75\" header=\"0.3\" footer=\"0.3\"/>\
         <c:pageSetup/></c:printSettings></c:chartSpace>",
    );

    debug!("chart{}.xml: {} chart, {} series", number, chart.kind, chart.series.len());
    content
}

fn push_title(content: &mut String, text: &str) {
    content.push_str(&format!(
        "<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr/></a:pPr>\
         <a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p></c:rich></c:tx>\
         <c:overlay val=\"0\"/></c:title>",
        escape_text(text)
    ));
}

fn push_plot(content: &mut String, chart: &Chart) {
    let axis_ids = format!(
        "<c:axId val=\"{}\"/><c:axId val=\"{}\"/>",
        CATEGORY_AXIS_ID, VALUE_AXIS_ID
    );

    match chart.kind {
        ChartKind::Bar => {
            content.push_str(
                "<c:barChart><c:barDir val=\"col\"/><c:grouping val=\"clustered\"/><c:varyColors val=\"0\"/>",
            );
            push_series(content, chart);
            content.push_str("<c:gapWidth val=\"150\"/>");
            content.push_str(&axis_ids);
            content.push_str("</c:barChart>");
        }
        ChartKind::Line => {
            content.push_str(
                "<c:lineChart><c:grouping val=\"standard\"/><c:varyColors val=\"0\"/>",
            );
            push_series(content, chart);
            content.push_str("<c:marker val=\"1\"/>");
            content.push_str(&axis_ids);
            content.push_str("</c:lineChart>");
        }
        ChartKind::Pie => {
            content.push_str("<c:pieChart><c:varyColors val=\"1\"/>");
            push_series(content, chart);
            content.push_str("<c:firstSliceAng val=\"0\"/></c:pieChart>");
        }
        ChartKind::Scatter => {
            content.push_str(
                "<c:scatterChart><c:scatterStyle val=\"lineMarker\"/><c:varyColors val=\"0\"/>",
            );
            push_series(content, chart);
            content.push_str(&axis_ids);
            content.push_str("</c:scatterChart>");
        }
    }
}

fn push_series(content: &mut String, chart: &Chart) {
    for (i, series) in chart.series.iter().enumerate() {
        content.push_str(&format!(
            "<c:ser><c:idx val=\"{}\"/><c:order val=\"{}\"/>",
            i, i
        ));
        if let Some(name) = &series.name {
            content.push_str(&format!(
                "<c:tx><c:strRef><c:f>{}</c:f></c:strRef></c:tx>",
                formula(name)
            ));
        }

        match chart.kind {
            ChartKind::Scatter => {
                content.push_str("<c:marker><c:symbol val=\"circle\"/></c:marker>");
                if let Some(x) = &series.categories {
                    push_data_ref(content, "xVal", "numRef", x);
                }
                push_data_ref(content, "yVal", "numRef", &series.values);
                content.push_str("<c:smooth val=\"0\"/>");
            }
            kind => {
                if kind == ChartKind::Bar {
                    content.push_str("<c:invertIfNegative val=\"0\"/>");
                }
                if let Some(categories) = &series.categories {
                    push_data_ref(content, "cat", "strRef", categories);
                }
                push_data_ref(content, "val", "numRef", &series.values);
                if kind == ChartKind::Line {
                    content.push_str("<c:smooth val=\"0\"/>");
                }
            }
        }
        content.push_str("</c:ser>");
    }
}

fn push_data_ref(content: &mut String, tag: &str, ref_kind: &str, reference: &DataReference) {
    content.push_str(&format!(
        "<c:{tag}><c:{ref_kind}><c:f>{}</c:f></c:{ref_kind}></c:{tag}>",
        formula(reference)
    ));
}

fn formula(reference: &DataReference) -> String {
    escape_text(&reference.formula()).into_owned()
}

fn push_axes(content: &mut String, chart: &Chart) {
    // X axis first: the reader maps axis titles by order
    if chart.kind == ChartKind::Scatter {
        push_value_axis(
            content,
            CATEGORY_AXIS_ID,
            VALUE_AXIS_ID,
            "b",
            chart.x_axis_title.as_deref(),
            "midCat",
        );
    } else {
        content.push_str(&format!(
            "<c:catAx><c:axId val=\"{}\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling>\
             <c:delete val=\"0\"/><c:axPos val=\"b\"/>",
            CATEGORY_AXIS_ID
        ));
        if let Some(title) = chart.x_axis_title.as_deref() {
            push_title(content, title);
        }
        content.push_str(&format!(
            "<c:majorTickMark val=\"out\"/><c:minorTickMark val=\"none\"/><c:tickLblPos val=\"nextTo\"/>\
             <c:crossAx val=\"{}\"/><c:crosses val=\"autoZero\"/><c:auto val=\"1\"/>\
             <c:lblAlgn val=\"ctr\"/><c:lblOffset val=\"100\"/><c:noMultiLvlLbl val=\"0\"/></c:catAx>",
            VALUE_AXIS_ID
        ));
    }

    push_value_axis(
        content,
        VALUE_AXIS_ID,
        CATEGORY_AXIS_ID,
        "l",
        chart.y_axis_title.as_deref(),
        "between",
    );
}

fn push_value_axis(
    content: &mut String,
    id: u32,
    cross: u32,
    position: &str,
    title: Option<&str>,
    cross_between: &str,
) {
    content.push_str(&format!(
        "<c:valAx><c:axId val=\"{}\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling>\
         <c:delete val=\"0\"/><c:axPos val=\"{}\"/><c:majorGridlines/>",
        id, position
    ));
    if let Some(title) = title {
        push_title(content, title);
    }
    content.push_str(&format!(
        "<c:numFmt formatCode=\"General\" sourceLinked=\"1\"/>\
         <c:majorTickMark val=\"out\"/><c:minorTickMark val=\"none\"/><c:tickLblPos val=\"nextTo\"/>\
         <c:crossAx val=\"{}\"/><c:crosses val=\"autoZero\"/><c:crossBetween val=\"{}\"/></c:valAx>",
        cross, cross_between
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetward_core::{CellAddress, CellRange, ChartAnchor, DataSeries};

    fn sales_chart(kind: ChartKind) -> Chart {
        let mut chart = Chart::new(
            kind,
            ChartAnchor::with_size(CellAddress::new(2, 5), 8, 15),
        );
        chart.title = Some("Q1 & Q2".into());
        chart.x_axis_title = Some("Month".into());
        chart.series.push(DataSeries {
            name: Some(DataReference::cell("Sales Data", CellAddress::new(1, 2))),
            categories: Some(DataReference::new(
                "Sales Data",
                CellRange::parse("A2:A5").unwrap(),
            )),
            values: DataReference::new("Sales Data", CellRange::parse("B2:B5").unwrap()),
        });
        chart
    }

    #[test]
    fn test_drawing_anchor_is_zero_based() {
        let xml = drawing_xml(&[sales_chart(ChartKind::Bar)]);
        assert!(xml.contains(
            "<xdr:from><xdr:col>4</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>1</xdr:row>"
        ));
        assert!(xml.contains("<xdr:to><xdr:col>12</xdr:col>"));
        assert!(xml.contains("r:id=\"rId1\""));
    }

    #[test]
    fn test_bar_chart_xml() {
        let xml = chart_xml(&sales_chart(ChartKind::Bar), 1);
        assert!(xml.contains("<c:barDir val=\"col\"/>"));
        assert!(xml.contains("<a:t>Q1 &amp; Q2</a:t>"));
        assert!(xml.contains("<c:tx><c:strRef><c:f>'Sales Data'!$B$1</c:f></c:strRef></c:tx>"));
        assert!(xml.contains("<c:cat><c:strRef><c:f>'Sales Data'!$A$2:$A$5</c:f>"));
        assert!(xml.contains("<c:val><c:numRef><c:f>'Sales Data'!$B$2:$B$5</c:f>"));
        assert!(xml.contains("<c:catAx>"));
        assert!(xml.find("<c:catAx>") < xml.find("<c:valAx>"));
    }

    #[test]
    fn test_pie_chart_has_no_axes() {
        let xml = chart_xml(&sales_chart(ChartKind::Pie), 3);
        assert!(xml.contains("<c:pieChart>"));
        assert!(!xml.contains("Ax>"));
    }

    #[test]
    fn test_scatter_uses_x_and_y_values() {
        let xml = chart_xml(&sales_chart(ChartKind::Scatter), 1);
        assert!(xml.contains("<c:xVal><c:numRef><c:f>'Sales Data'!$A$2:$A$5</c:f>"));
        assert!(xml.contains("<c:yVal><c:numRef>"));
        assert_eq!(xml.matches("<c:valAx>").count(), 2);
        assert!(!xml.contains("<c:catAx>"));
    }
}
