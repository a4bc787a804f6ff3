use super::{Segment, merge_runs};
use crate::blocks::BlockType;
use crate::calendar::{GridCell, Semester};
use crate::entry::{DateRange, Entry, EntryId};
use crate::plan::SemesterPlan;
use serde::Serialize;

/// Headers of the per-entry columns printed left of the week grid.
pub const LEADING_HEADERS: [&str; 5] = ["Meeting", "Chapter", "Topic", "JP", "Dates"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLayout {
    pub period: u8,
    pub name: &'static str,
    pub slot_count: u8,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSummary {
    pub entry_id: EntryId,
    pub meeting_no: String,
    pub chapter: String,
    pub topic: String,
    pub duration: u32,
    pub date_range: Option<DateRange>,
}

impl RowSummary {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            entry_id: entry.id,
            meeting_no: entry.meeting_no(),
            chapter: entry.chapter.clone(),
            topic: entry.topic.clone(),
            duration: entry.duration(),
            date_range: entry.date_range,
        }
    }

    /// Text of the leading columns, in [`LEADING_HEADERS`] order.
    pub fn leading_cells(&self) -> [String; 5] {
        let dates = self
            .date_range
            .map(|range| format!("{}/{}", range.start.format("%Y-%m-%d"), range.end.format("%Y-%m-%d")))
            .unwrap_or_default();
        [
            self.meeting_no.clone(),
            self.chapter.clone(),
            self.topic.clone(),
            self.duration.to_string(),
            dates,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    /// Top of a blocked run; covers `span` columns and `row_span` rows.
    Blocked {
        block_type: BlockType,
        label: String,
        color: String,
        row_span: usize,
    },
    /// Part of a blocked run opened in an earlier row.
    Covered,
    Plotted { jp: u32 },
    Free,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCell {
    pub period: u8,
    pub start_slot: u8,
    pub span: u8,
    pub content: CellContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRow {
    /// `None` for the placeholder row of a plan without entries.
    pub entry: Option<RowSummary>,
    pub cells: Vec<LayoutCell>,
}

impl LayoutRow {
    pub fn leading_cells(&self) -> [String; 5] {
        self.entry
            .as_ref()
            .map(RowSummary::leading_cells)
            .unwrap_or_default()
    }
}

/// Everything a renderer needs to draw one semester plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub semester: Semester,
    pub periods: Vec<PeriodLayout>,
    pub rows: Vec<LayoutRow>,
}

impl GridLayout {
    pub fn build(plan: &SemesterPlan) -> Self {
        let semester = plan.semester().clone();
        let periods: Vec<PeriodLayout> = semester
            .periods()
            .iter()
            .enumerate()
            .map(|(idx, def)| {
                let period = idx as u8 + 1;
                PeriodLayout {
                    period,
                    name: def.name,
                    slot_count: def.slots,
                    segments: merge_runs(&semester, plan.blocked_weeks(), period),
                }
            })
            .collect();

        let row_count = plan.entries().len().max(1);
        let rows = if plan.entries().is_empty() {
            vec![LayoutRow {
                entry: None,
                cells: Self::row_cells(&periods, None, 0, row_count),
            }]
        } else {
            plan.entries()
                .iter()
                .enumerate()
                .map(|(row_idx, entry)| LayoutRow {
                    entry: Some(RowSummary::from_entry(entry)),
                    cells: Self::row_cells(&periods, Some(entry), row_idx, row_count),
                })
                .collect()
        };

        Self {
            semester,
            periods,
            rows,
        }
    }

    fn row_cells(
        periods: &[PeriodLayout],
        entry: Option<&Entry>,
        row_idx: usize,
        row_count: usize,
    ) -> Vec<LayoutCell> {
        let mut cells = Vec::new();
        for period in periods {
            for segment in &period.segments {
                match &segment.block {
                    Some(block) => {
                        let content = if row_idx == 0 {
                            CellContent::Blocked {
                                block_type: block.block_type,
                                label: block.label.clone(),
                                color: block.color.clone(),
                                row_span: row_count,
                            }
                        } else {
                            CellContent::Covered
                        };
                        cells.push(LayoutCell {
                            period: period.period,
                            start_slot: segment.start_slot,
                            span: segment.span,
                            content,
                        });
                    }
                    None => {
                        let cell = GridCell::new(period.period, segment.start_slot);
                        let content = match entry.and_then(|entry| entry.plot_at(cell)) {
                            Some(plot) => CellContent::Plotted { jp: plot.jp },
                            None => CellContent::Free,
                        };
                        cells.push(LayoutCell {
                            period: period.period,
                            start_slot: segment.start_slot,
                            span: 1,
                            content,
                        });
                    }
                }
            }
        }
        cells
    }

    /// Number of week columns across all periods.
    pub fn week_column_count(&self) -> usize {
        self.periods.iter().map(|period| period.slot_count as usize).sum()
    }

    /// Zero-based week column of a slot, counted across periods.
    pub fn week_column(&self, period: u8, slot: u8) -> Option<usize> {
        let mut offset = 0;
        for layout in &self.periods {
            if layout.period == period {
                return (slot >= 1 && slot <= layout.slot_count).then(|| offset + slot as usize - 1);
            }
            offset += layout.slot_count as usize;
        }
        None
    }
}
