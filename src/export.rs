//! Spreadsheet export of the grid layout.

use crate::persistence::PersistenceResult;
use crate::plan::SemesterPlan;
use crate::render::layout::{CellContent, GridLayout, LEADING_HEADERS};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Rows reserved for the period-name and slot-number headers.
pub const HEADER_ROWS: usize = 2;

/// Inclusive, zero-based rectangle of sheet cells shown as one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

/// A rectangular sheet plus the ranges a spreadsheet should merge.
///
/// Merged ranges carry their text in the top-left cell and are blank
/// elsewhere. The JSON form keeps both; CSV has no merged cells, so
/// [`Spreadsheet::write_csv`] writes [`Spreadsheet::flattened_rows`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spreadsheet {
    pub rows: Vec<Vec<String>>,
    pub merges: Vec<MergeRange>,
}

impl Spreadsheet {
    pub fn from_layout(layout: &GridLayout) -> Self {
        let lead = LEADING_HEADERS.len();
        let width = lead + layout.week_column_count();
        let mut rows = vec![vec![String::new(); width]; HEADER_ROWS + layout.rows.len()];
        let mut merges = Vec::new();

        for (col, header) in LEADING_HEADERS.iter().enumerate() {
            rows[0][col] = header.to_string();
            merges.push(MergeRange {
                first_row: 0,
                first_col: col,
                last_row: 1,
                last_col: col,
            });
        }
        let mut col = lead;
        for period in &layout.periods {
            rows[0][col] = period.name.to_string();
            merges.push(MergeRange {
                first_row: 0,
                first_col: col,
                last_row: 0,
                last_col: col + period.slot_count as usize - 1,
            });
            for slot in 1..=period.slot_count {
                rows[1][col] = slot.to_string();
                col += 1;
            }
        }

        for (row_idx, row) in layout.rows.iter().enumerate() {
            let sheet_row = HEADER_ROWS + row_idx;
            for (col, text) in row.leading_cells().into_iter().enumerate() {
                rows[sheet_row][col] = text;
            }
            for cell in &row.cells {
                let Some(week_col) = layout.week_column(cell.period, cell.start_slot) else {
                    continue;
                };
                let col = lead + week_col;
                match &cell.content {
                    CellContent::Blocked {
                        label, row_span, ..
                    } => {
                        rows[sheet_row][col] = label.clone();
                        merges.push(MergeRange {
                            first_row: sheet_row,
                            first_col: col,
                            last_row: sheet_row + row_span - 1,
                            last_col: col + cell.span as usize - 1,
                        });
                    }
                    CellContent::Plotted { jp } => rows[sheet_row][col] = jp.to_string(),
                    CellContent::Covered | CellContent::Free => {}
                }
            }
        }

        // Single-cell ranges carry no information for a spreadsheet.
        merges.retain(|range| range.first_row != range.last_row || range.first_col != range.last_col);
        Self { rows, merges }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Rows with each merge range's text repeated in every cell it covers.
    pub fn flattened_rows(&self) -> Vec<Vec<String>> {
        let mut rows = self.rows.clone();
        for range in &self.merges {
            let Some(text) = self
                .rows
                .get(range.first_row)
                .and_then(|row| row.get(range.first_col))
            else {
                continue;
            };
            for row in rows
                .iter_mut()
                .take(range.last_row + 1)
                .skip(range.first_row)
            {
                for cell in row.iter_mut().take(range.last_col + 1).skip(range.first_col) {
                    cell.clone_from(text);
                }
            }
        }
        rows
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> PersistenceResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.flattened_rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> PersistenceResult<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| {
            crate::persistence::PersistenceError::InvalidData(format!("csv output is not utf-8: {err}"))
        })
    }
}

/// Writes rows and merge ranges as one JSON document.
pub fn write_sheet_json<W: Write>(sheet: &Spreadsheet, writer: W) -> PersistenceResult<()> {
    serde_json::to_writer_pretty(writer, sheet)?;
    Ok(())
}

pub fn export_plan_to_sheet_json<P: AsRef<Path>>(
    plan: &SemesterPlan,
    path: P,
) -> PersistenceResult<()> {
    let sheet = Spreadsheet::from_layout(&GridLayout::build(plan));
    write_sheet_json(&sheet, File::create(path)?)
}

pub fn export_plan_to_csv<P: AsRef<Path>>(plan: &SemesterPlan, path: P) -> PersistenceResult<()> {
    let sheet = Spreadsheet::from_layout(&GridLayout::build(plan));
    let file = File::create(path)?;
    sheet.write_csv(file)
}
