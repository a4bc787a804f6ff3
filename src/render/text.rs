use super::layout::{CellContent, GridLayout, LEADING_HEADERS, LayoutCell};

/// Characters per week column.
const WEEK_WIDTH: usize = 4;

/// Draws the layout as a boxed terminal grid.
///
/// Blocked runs carry their label on the first entry row; the rows beneath
/// are filled with dots so the run reads as one tall cell.
pub fn render_grid(layout: &GridLayout) -> String {
    let mut lead_widths: Vec<usize> = LEADING_HEADERS.iter().map(|h| h.len()).collect();
    for row in &layout.rows {
        for (idx, text) in row.leading_cells().iter().enumerate() {
            lead_widths[idx] = lead_widths[idx].max(text.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &lead_widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }
    for period in &layout.periods {
        sep.push_str(&"-".repeat(span_width(period.slot_count)));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Semester {} {}\n",
        layout.semester.half, layout.semester.year
    ));
    out.push_str(&sep);
    out.push('\n');

    // Period names, then slot numbers.
    out.push('|');
    for (idx, header) in LEADING_HEADERS.iter().enumerate() {
        out.push_str(&format!(" {} |", pad_right(header, lead_widths[idx])));
    }
    for period in &layout.periods {
        out.push_str(&center(period.name, span_width(period.slot_count)));
        out.push('|');
    }
    out.push('\n');
    out.push('|');
    for w in &lead_widths {
        out.push_str(&" ".repeat(w + 2));
        out.push('|');
    }
    for period in &layout.periods {
        for slot in 1..=period.slot_count {
            out.push_str(&center(&slot.to_string(), WEEK_WIDTH));
            out.push('|');
        }
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row in &layout.rows {
        out.push('|');
        for (idx, text) in row.leading_cells().iter().enumerate() {
            out.push_str(&format!(" {} |", pad_right(text, lead_widths[idx])));
        }
        for cell in &row.cells {
            out.push_str(&cell_text(cell));
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn cell_text(cell: &LayoutCell) -> String {
    let width = span_width(cell.span);
    match &cell.content {
        CellContent::Blocked { label, .. } => center(label, width),
        CellContent::Covered => ".".repeat(width),
        CellContent::Plotted { jp } => center(&jp.to_string(), width),
        CellContent::Free => " ".repeat(width),
    }
}

fn span_width(span: u8) -> usize {
    let span = span.max(1) as usize;
    span * WEEK_WIDTH + (span - 1)
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn pad_right(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(text.chars().count());
    format!("{text}{}", " ".repeat(pad))
}

fn center(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let free = width.saturating_sub(text.chars().count());
    let left = free / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(free - left))
}
