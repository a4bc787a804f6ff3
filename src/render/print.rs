use super::layout::{CellContent, GridLayout, LEADING_HEADERS};
use std::fmt::Write;

/// Renders the layout as a standalone HTML document for printing.
///
/// Blocked runs become one `<td>` with `colspan` over the run and `rowspan`
/// over every entry row; covered positions emit no cell at all.
pub fn render_document(layout: &GridLayout) -> String {
    let title = format!(
        "Program Semester {} {}",
        layout.semester.half, layout.semester.year
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(&title));
    html.push_str(
        "<style>table{border-collapse:collapse}th,td{border:1px solid #000;padding:2px 4px;text-align:center}td.lead{text-align:left}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&title));
    html.push_str("<table>\n<thead>\n<tr>");
    for header in LEADING_HEADERS {
        let _ = write!(html, "<th rowspan=\"2\">{}</th>", escape(header));
    }
    for period in &layout.periods {
        let _ = write!(
            html,
            "<th colspan=\"{}\">{}</th>",
            period.slot_count,
            escape(period.name)
        );
    }
    html.push_str("</tr>\n<tr>");
    for period in &layout.periods {
        for slot in 1..=period.slot_count {
            let _ = write!(html, "<th>{slot}</th>");
        }
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &layout.rows {
        html.push_str("<tr>");
        for text in row.leading_cells() {
            let _ = write!(html, "<td class=\"lead\">{}</td>", escape(&text));
        }
        for cell in &row.cells {
            match &cell.content {
                CellContent::Blocked {
                    block_type,
                    label,
                    color,
                    row_span,
                } => {
                    let _ = write!(
                        html,
                        "<td class=\"blocked {}\" colspan=\"{}\" rowspan=\"{}\" style=\"background:{}\">{}</td>",
                        block_type.as_str(),
                        cell.span,
                        row_span,
                        escape(color),
                        escape(label)
                    );
                }
                CellContent::Covered => {}
                CellContent::Plotted { jp } => {
                    let _ = write!(html, "<td class=\"plotted\">{jp}</td>");
                }
                CellContent::Free => html.push_str("<td></td>"),
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
