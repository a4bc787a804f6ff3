use crate::blocks::BlockRegistry;
use crate::calendar::{GridCell, Semester};
use crate::entry::{
    Entry, EntryId, MAX_MEETING_JP, MAX_MEETING_NUMBER, MIN_MEETING_JP, MeetingDetail,
};
use crate::plan::PlanError;
use std::collections::{HashMap, HashSet};

/// Required-field checks shared by drafts and stored entries.
pub fn validate_entry_fields(chapter: &str, details: &[MeetingDetail]) -> Result<(), PlanError> {
    if chapter.trim().is_empty() {
        return Err(PlanError::Validation("chapter is required".into()));
    }
    if details.is_empty() {
        return Err(PlanError::Validation(
            "an entry needs at least one meeting".into(),
        ));
    }

    let mut ids = HashSet::with_capacity(details.len());
    let mut numbers = HashSet::with_capacity(details.len());
    for detail in details {
        if detail.number == 0 {
            return Err(PlanError::Validation(format!(
                "meeting {} must have a number of at least 1",
                detail.id
            )));
        }
        if detail.number > MAX_MEETING_NUMBER {
            return Err(PlanError::Validation(format!(
                "meeting {} has number {} (at most {})",
                detail.id, detail.number, MAX_MEETING_NUMBER
            )));
        }
        if !(MIN_MEETING_JP..=MAX_MEETING_JP).contains(&detail.jp) {
            return Err(PlanError::Validation(format!(
                "meeting P{} has {} JP (must be between {} and {})",
                detail.number, detail.jp, MIN_MEETING_JP, MAX_MEETING_JP
            )));
        }
        if !ids.insert(detail.id) {
            return Err(PlanError::Validation(format!(
                "duplicate meeting id {}",
                detail.id
            )));
        }
        if !numbers.insert(detail.number) {
            return Err(PlanError::Validation(format!(
                "meeting P{} listed twice",
                detail.number
            )));
        }
    }
    Ok(())
}

pub fn validate_entry(entry: &Entry) -> Result<(), PlanError> {
    validate_entry_fields(&entry.chapter, &entry.meeting_details).map_err(|err| match err {
        PlanError::Validation(message) => {
            PlanError::Validation(format!("entry {}: {message}", entry.id))
        }
        other => other,
    })?;

    if let Some(range) = entry.date_range {
        if range.start > range.end {
            return Err(PlanError::Validation(format!(
                "entry {} starts on {} after it ends on {}",
                entry.id, range.start, range.end
            )));
        }
    }

    let mut cells = HashSet::with_capacity(entry.plot_weeks.len());
    for plot in &entry.plot_weeks {
        if !cells.insert(plot.cell()) {
            return Err(PlanError::Validation(format!(
                "entry {} plots cell {} twice",
                entry.id,
                plot.cell()
            )));
        }
    }
    if !entry.plot_weeks.is_empty() && entry.plotted_jp() != entry.duration() {
        return Err(PlanError::Validation(format!(
            "entry {} plots {} JP but its meetings add up to {}",
            entry.id,
            entry.plotted_jp(),
            entry.duration()
        )));
    }
    Ok(())
}

/// Whole-aggregate invariants: distinct block cells, disjoint placements,
/// nothing plotted on a blocked week or outside the grid.
pub fn validate_plan_parts(
    semester: &Semester,
    blocks: &BlockRegistry,
    entries: &[Entry],
) -> Result<(), PlanError> {
    let mut block_ids = HashSet::with_capacity(blocks.len());
    let mut block_cells = HashSet::with_capacity(blocks.len());
    for block in blocks.iter() {
        if !block_ids.insert(block.id) {
            return Err(PlanError::Validation(format!(
                "duplicate blocked week id {}",
                block.id
            )));
        }
        if !block_cells.insert(block.cell()) {
            return Err(PlanError::DuplicateBlock {
                period: block.period,
                slot: block.slot,
            });
        }
        if !semester.contains(block.cell()) {
            return Err(PlanError::Validation(format!(
                "blocked week {} sits outside the semester grid at {}",
                block.id,
                block.cell()
            )));
        }
        if block.label.trim().is_empty() {
            return Err(PlanError::Validation(format!(
                "blocked week {} has an empty label",
                block.id
            )));
        }
    }

    let mut entry_ids = HashSet::with_capacity(entries.len());
    let mut owners: HashMap<GridCell, EntryId> = HashMap::new();
    for entry in entries {
        if !entry_ids.insert(entry.id) {
            return Err(PlanError::Validation(format!(
                "duplicate entry id {}",
                entry.id
            )));
        }
        validate_entry(entry)?;
        for plot in &entry.plot_weeks {
            let cell = plot.cell();
            if !semester.contains(cell) {
                return Err(PlanError::Validation(format!(
                    "entry {} plots {} outside the semester grid",
                    entry.id, cell
                )));
            }
            if block_cells.contains(&cell) {
                return Err(PlanError::Validation(format!(
                    "entry {} plots blocked week {}",
                    entry.id, cell
                )));
            }
            if let Some(owner) = owners.insert(cell, entry.id) {
                return Err(PlanError::Validation(format!(
                    "entries {} and {} both plot {}",
                    owner, entry.id, cell
                )));
            }
        }
    }
    Ok(())
}
