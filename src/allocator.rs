use crate::blocks::BlockRegistry;
use crate::calendar::{GridCell, Semester};
use crate::entry::{Entry, EntryId, PlotWeek};
use serde::Serialize;
use tracing::debug;

/// Why a grid click was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PlacementConflict {
    Blocked,
    OccupiedBy { entry_id: EntryId },
    OutOfGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlacementOutcome {
    Added,
    Removed,
    Rejected { conflict: PlacementConflict },
}

impl PlacementOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, PlacementOutcome::Rejected { .. })
    }
}

/// `total` split into `n` integer shares: `total / n` each, with the first
/// `total % n` shares one larger.
pub fn spread_evenly(total: u32, n: usize) -> Vec<u32> {
    if n == 0 {
        return Vec::new();
    }
    let n32 = n as u32;
    let base = total / n32;
    let remainder = (total % n32) as usize;
    (0..n)
        .map(|idx| if idx < remainder { base + 1 } else { base })
        .collect()
}

/// Re-spreads the entry's full duration over its plotted weeks in insertion
/// order. Always recomputes every share.
pub fn redistribute(entry: &mut Entry) {
    let shares = spread_evenly(entry.duration(), entry.plot_weeks.len());
    for (plot, jp) in entry.plot_weeks.iter_mut().zip(shares) {
        plot.jp = jp;
    }
}

/// The entry plotting `cell`, ignoring `excluding`.
pub fn owner_of(entries: &[Entry], cell: GridCell, excluding: Option<EntryId>) -> Option<EntryId> {
    entries
        .iter()
        .filter(|entry| Some(entry.id) != excluding)
        .find(|entry| entry.plots(cell))
        .map(|entry| entry.id)
}

/// What would stop `entry_id` from claiming `cell`, if anything.
pub fn placement_conflict(
    entry_id: EntryId,
    cell: GridCell,
    semester: &Semester,
    blocks: &BlockRegistry,
    entries: &[Entry],
) -> Option<PlacementConflict> {
    if !semester.contains(cell) {
        return Some(PlacementConflict::OutOfGrid);
    }
    if blocks.is_blocked(cell) {
        return Some(PlacementConflict::Blocked);
    }
    owner_of(entries, cell, Some(entry_id)).map(|owner| PlacementConflict::OccupiedBy { entry_id: owner })
}

/// Adds or removes `cell` from the entry's plotted weeks.
///
/// Blocked cells, cells owned by another entry in `entries` and cells outside
/// the grid leave the entry untouched and come back as `Rejected`.
pub fn toggle_plot(
    entry: &mut Entry,
    cell: GridCell,
    semester: &Semester,
    blocks: &BlockRegistry,
    entries: &[Entry],
) -> PlacementOutcome {
    if let Some(conflict) = placement_conflict(entry.id, cell, semester, blocks, entries) {
        debug!(entry_id = entry.id, %cell, ?conflict, "placement rejected");
        return PlacementOutcome::Rejected { conflict };
    }

    let outcome = if let Some(idx) = entry.plot_weeks.iter().position(|plot| plot.cell() == cell) {
        entry.plot_weeks.remove(idx);
        PlacementOutcome::Removed
    } else {
        entry.plot_weeks.push(PlotWeek {
            period: cell.period,
            slot: cell.slot,
            jp: 0,
        });
        PlacementOutcome::Added
    };
    redistribute(entry);
    debug!(
        entry_id = entry.id,
        %cell,
        ?outcome,
        weeks = entry.plot_weeks.len(),
        "placement toggled"
    );
    outcome
}
