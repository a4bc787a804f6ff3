use crate::allocator::{self, PlacementOutcome};
use crate::blocks::{BlockId, BlockRegistry, BlockType, BlockedWeek};
use crate::calendar::{GridCell, Semester, SemesterHalf};
use crate::entry::{self, DateRange, Entry, EntryDraft, EntryId, MeetingId};
use crate::entry_validation;
use crate::suggest;
use chrono::Days;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("week ({period}, {slot}) is already blocked")]
    DuplicateBlock { period: u8, slot: u8 },

    #[error("entry {0} not found")]
    EntryNotFound(EntryId),
}

/// The semester plan aggregate: semester metadata, blocked weeks and entries.
///
/// Every mutator checks before it changes anything, so a failed call leaves
/// the plan exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterPlan {
    #[serde(flatten)]
    semester: Semester,
    #[serde(default)]
    blocked_weeks: BlockRegistry,
    #[serde(default)]
    entries: Vec<Entry>,
    /// Highest meeting number handed out by [`SemesterPlan::reserve_meeting_number`].
    #[serde(default)]
    meeting_counter: u32,
    /// Highest block id ever handed out; removed ids are not reused.
    #[serde(default)]
    block_counter: BlockId,
    /// Highest entry id ever handed out.
    #[serde(default)]
    entry_counter: EntryId,
}

impl SemesterPlan {
    pub fn new(semester: Semester) -> Self {
        Self::from_parts(semester, BlockRegistry::new(), Vec::new())
    }

    pub fn for_half(half: SemesterHalf, year: impl Into<String>) -> Self {
        Self::new(Semester::new(half, year))
    }

    pub fn from_parts(semester: Semester, blocked_weeks: BlockRegistry, entries: Vec<Entry>) -> Self {
        Self {
            semester,
            blocked_weeks,
            entries,
            meeting_counter: 0,
            block_counter: 0,
            entry_counter: 0,
        }
    }

    pub fn semester(&self) -> &Semester {
        &self.semester
    }

    pub fn blocked_weeks(&self) -> &BlockRegistry {
        &self.blocked_weeks
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, entry_id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == entry_id)
    }

    pub fn meeting_counter(&self) -> u32 {
        self.meeting_counter
    }

    pub fn block_counter(&self) -> BlockId {
        self.block_counter
    }

    pub fn entry_counter(&self) -> EntryId {
        self.entry_counter
    }

    pub(crate) fn restore_counters(&mut self, meeting: u32, block: BlockId, entry: EntryId) {
        self.meeting_counter = meeting;
        self.block_counter = block;
        self.entry_counter = entry;
    }

    /// Takes `other`'s blocked weeks and block id mark, leaving entries alone.
    pub(crate) fn adopt_blocked_weeks(&mut self, other: &SemesterPlan) {
        self.blocked_weeks = other.blocked_weeks.clone();
        self.block_counter = other.block_counter;
    }

    /// Takes `other`'s entries with the meeting and entry marks.
    pub(crate) fn adopt_entries(&mut self, other: &SemesterPlan) {
        self.entries = other.entries.clone();
        self.meeting_counter = other.meeting_counter;
        self.entry_counter = other.entry_counter;
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        entry_validation::validate_plan_parts(&self.semester, &self.blocked_weeks, &self.entries)
    }

    pub fn add_block(
        &mut self,
        cell: GridCell,
        block_type: BlockType,
        label: &str,
    ) -> Result<BlockId, PlanError> {
        // A week already carrying a plot cannot be blocked underneath it.
        if let Some(owner) = allocator::owner_of(&self.entries, cell, None) {
            return Err(PlanError::Validation(format!(
                "week {cell} is already plotted by entry {owner}"
            )));
        }
        let id = self.blocked_weeks.add_block_after(
            self.block_counter,
            &self.semester,
            cell,
            block_type,
            label,
        )?;
        self.block_counter = id;
        Ok(id)
    }

    pub fn remove_block(&mut self, block_id: BlockId) -> bool {
        self.blocked_weeks.remove_block(block_id)
    }

    pub fn block_at(&self, cell: GridCell) -> Option<&BlockedWeek> {
        self.blocked_weeks.block_at(cell)
    }

    pub fn create_entry(&mut self, draft: EntryDraft) -> Result<EntryId, PlanError> {
        entry_validation::validate_entry_fields(&draft.chapter, &draft.meeting_details)?;
        check_date_range(draft.date_range)?;

        let id = self
            .entries
            .iter()
            .map(|entry| entry.id)
            .max()
            .unwrap_or(0)
            .max(self.entry_counter)
            .checked_add(1)
            .ok_or_else(|| PlanError::Validation("no entry ids left".into()))?;
        let mut created = Entry::new(id, draft.chapter.trim(), draft.meeting_details);
        created.topic = draft.topic;
        created.date_range = draft.date_range;
        self.warn_on_duplicate_numbers(&created);
        self.bump_meeting_counter(&created);
        self.entries.push(created);
        self.entry_counter = id;
        Ok(id)
    }

    /// Replaces an entry's content, keeping its plotted weeks and spreading
    /// the new duration over them.
    pub fn update_entry(&mut self, entry_id: EntryId, draft: EntryDraft) -> Result<(), PlanError> {
        entry_validation::validate_entry_fields(&draft.chapter, &draft.meeting_details)?;
        check_date_range(draft.date_range)?;
        let idx = self.entry_index(entry_id)?;

        let mut updated = self.entries[idx].clone();
        updated.chapter = draft.chapter.trim().to_string();
        updated.topic = draft.topic;
        updated.date_range = draft.date_range;
        updated.meeting_details = draft.meeting_details;
        allocator::redistribute(&mut updated);
        self.warn_on_duplicate_numbers(&updated);
        self.bump_meeting_counter(&updated);
        self.entries[idx] = updated;
        Ok(())
    }

    pub fn delete_entry(&mut self, entry_id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != entry_id);
        self.entries.len() != before
    }

    /// Toggles one grid cell for an entry. Conflicts are reported through the
    /// outcome, not as errors; only an unknown entry id fails.
    pub fn toggle_plot(
        &mut self,
        entry_id: EntryId,
        cell: GridCell,
    ) -> Result<PlacementOutcome, PlanError> {
        let idx = self.entry_index(entry_id)?;
        let mut edited = self.entries[idx].clone();
        let outcome = allocator::toggle_plot(
            &mut edited,
            cell,
            &self.semester,
            &self.blocked_weeks,
            &self.entries,
        );
        if outcome.changed() {
            self.entries[idx] = edited;
        }
        Ok(outcome)
    }

    pub fn add_meeting_detail(&mut self, entry_id: EntryId) -> Result<MeetingId, PlanError> {
        let idx = self.entry_index(entry_id)?;
        let mut edited = self.entries[idx].clone();
        let meeting_id = edited.add_meeting_detail();
        entry_validation::validate_entry_fields(&edited.chapter, &edited.meeting_details)?;
        self.warn_on_duplicate_numbers(&edited);
        self.bump_meeting_counter(&edited);
        self.entries[idx] = edited;
        Ok(meeting_id)
    }

    pub fn remove_meeting_detail(
        &mut self,
        entry_id: EntryId,
        meeting_id: MeetingId,
    ) -> Result<bool, PlanError> {
        let idx = self.entry_index(entry_id)?;
        Ok(self.entries[idx].remove_meeting_detail(meeting_id))
    }

    /// Suggested number for the next meeting. Nothing is reserved.
    pub fn next_meeting_number(&self) -> u32 {
        entry::next_meeting_number(&self.entries)
    }

    /// Hands out a meeting number that this aggregate will not hand out
    /// again, even before the entry using it is saved.
    pub fn reserve_meeting_number(&mut self) -> u32 {
        let number = self
            .next_meeting_number()
            .max(self.meeting_counter.saturating_add(1));
        self.meeting_counter = number;
        number
    }

    pub fn suggest_next_dates(&self) -> Option<DateRange> {
        suggest::suggest_next_dates(&self.semester, &self.blocked_weeks, &self.entries)
    }

    /// Monday-to-Friday range of the first week that is neither blocked nor
    /// plotted. Used as the default when there is no previous entry.
    pub fn first_free_week(&self) -> Option<DateRange> {
        let cell = self.semester.cells().find(|cell| {
            !self.blocked_weeks.is_blocked(*cell)
                && allocator::owner_of(&self.entries, *cell, None).is_none()
        })?;
        let start = self.semester.week_start(cell)?;
        Some(DateRange::new(start, start.checked_add_days(Days::new(4))?))
    }

    fn entry_index(&self, entry_id: EntryId) -> Result<usize, PlanError> {
        self.entries
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or(PlanError::EntryNotFound(entry_id))
    }

    fn bump_meeting_counter(&mut self, entry: &Entry) {
        if let Some(max) = entry.max_meeting_number() {
            self.meeting_counter = self.meeting_counter.max(max);
        }
    }

    fn warn_on_duplicate_numbers(&self, candidate: &Entry) {
        let taken: HashSet<u32> = self
            .entries
            .iter()
            .filter(|entry| entry.id != candidate.id)
            .flat_map(|entry| entry.meeting_details.iter().map(|detail| detail.number))
            .collect();
        for detail in &candidate.meeting_details {
            if taken.contains(&detail.number) {
                warn!(
                    entry_id = candidate.id,
                    number = detail.number,
                    "meeting number already used by another entry"
                );
            }
        }
    }
}

fn check_date_range(range: Option<DateRange>) -> Result<(), PlanError> {
    match range {
        Some(range) if range.start > range.end => Err(PlanError::Validation(format!(
            "start date {} is after end date {}",
            range.start, range.end
        ))),
        _ => Ok(()),
    }
}
