//! Grid rendering.
//!
//! [`merge_runs`] is the only place blocked weeks are merged into spans.
//! [`layout::GridLayout`] applies it to a whole plan, and every output (the
//! terminal grid, the print document and the spreadsheet export) reads that
//! layout, so all of them show the same spans and the same JP numbers.

pub mod layout;
pub mod print;
pub mod text;

use crate::blocks::{BlockRegistry, BlockedWeek};
use crate::calendar::{GridCell, Semester};
use serde::Serialize;
use std::ops::RangeInclusive;

pub use layout::{CellContent, GridLayout, LayoutCell, LayoutRow, PeriodLayout, RowSummary};

/// A run of slots within one period drawn as a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_slot: u8,
    pub span: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockedWeek>,
}

impl Segment {
    pub fn end_slot(&self) -> u8 {
        self.start_slot + self.span - 1
    }

    pub fn slots(&self) -> RangeInclusive<u8> {
        self.start_slot..=self.end_slot()
    }

    pub fn is_blocked(&self) -> bool {
        self.block.is_some()
    }
}

/// Splits one period into segments, left to right.
///
/// Adjacent blocked slots share a segment only when their type and label are
/// identical; every other slot is its own one-wide segment. The segments
/// cover `1..=slot_count` exactly once. Unknown periods yield nothing.
pub fn merge_runs(semester: &Semester, blocks: &BlockRegistry, period: u8) -> Vec<Segment> {
    let Some(slot_count) = semester.slot_count(period) else {
        return Vec::new();
    };

    let mut segments: Vec<Segment> = Vec::with_capacity(slot_count as usize);
    for slot in 1..=slot_count {
        let block = blocks.block_at(GridCell::new(period, slot));
        if let (Some(block), Some(last)) = (block, segments.last_mut()) {
            let extends = last
                .block
                .as_ref()
                .is_some_and(|previous| previous.merges_with(block));
            if extends {
                last.span += 1;
                continue;
            }
        }
        segments.push(Segment {
            start_slot: slot,
            span: 1,
            block: block.cloned(),
        });
    }
    segments
}
