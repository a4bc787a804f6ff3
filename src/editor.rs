//! An editing session over one semester plan.
//!
//! The session applies each change to a copy of the plan, writes the changed
//! field (blocked weeks or entries) to the store, and only then adopts the
//! copy. A rejected change or a failed write leaves both sides as they were.

use crate::allocator::PlacementOutcome;
use crate::blocks::{BlockId, BlockType};
use crate::calendar::GridCell;
use crate::entry::{DEFAULT_MEETING_JP, EntryDraft, EntryId, MeetingDetail, MeetingId};
use crate::persistence::{PersistenceError, PlanStore};
use crate::plan::{PlanError, SemesterPlan};
use crate::render::GridLayout;
use std::collections::VecDeque;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// A request one view makes of another, delivered through the session
/// instead of a global broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorRequest {
    OpenAddEntryForm { draft: EntryDraft },
}

enum Field {
    BlockedWeeks,
    Entries,
}

pub struct PlanEditor<S> {
    plan: SemesterPlan,
    store: S,
    requests: VecDeque<EditorRequest>,
}

impl<S: PlanStore> PlanEditor<S> {
    /// Starts a session on `plan` without touching the store.
    pub fn new(store: S, plan: SemesterPlan) -> Self {
        Self {
            plan,
            store,
            requests: VecDeque::new(),
        }
    }

    /// Loads the stored plan, failing with `NotFound` when there is none.
    pub fn load(store: S) -> EditorResult<Self> {
        let plan = store.load_plan()?.ok_or(PersistenceError::NotFound)?;
        Ok(Self::new(store, plan))
    }

    /// Loads the stored plan, or saves and uses `fallback()` when the store
    /// is empty.
    pub fn open_or_create<F>(store: S, fallback: F) -> EditorResult<Self>
    where
        F: FnOnce() -> SemesterPlan,
    {
        match store.load_plan()? {
            Some(plan) => Ok(Self::new(store, plan)),
            None => {
                let plan = fallback();
                store.save_plan(&plan)?;
                info!(
                    half = %plan.semester().half,
                    year = %plan.semester().year,
                    "created new semester plan"
                );
                Ok(Self::new(store, plan))
            }
        }
    }

    pub fn plan(&self) -> &SemesterPlan {
        &self.plan
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout::build(&self.plan)
    }

    /// Swaps in a whole plan (e.g. one loaded from a file) and saves it.
    pub fn replace_plan(&mut self, plan: SemesterPlan) -> EditorResult<()> {
        self.store.save_plan(&plan)?;
        self.plan = plan;
        Ok(())
    }

    pub fn add_block(
        &mut self,
        cell: GridCell,
        block_type: BlockType,
        label: &str,
    ) -> EditorResult<BlockId> {
        self.apply(Field::BlockedWeeks, |plan| {
            plan.add_block(cell, block_type, label)
        })
    }

    pub fn remove_block(&mut self, block_id: BlockId) -> EditorResult<bool> {
        let mut next = self.plan.clone();
        if !next.remove_block(block_id) {
            return Ok(false);
        }
        self.commit(Field::BlockedWeeks, next)?;
        Ok(true)
    }

    pub fn create_entry(&mut self, draft: EntryDraft) -> EditorResult<EntryId> {
        self.apply(Field::Entries, |plan| plan.create_entry(draft))
    }

    pub fn update_entry(&mut self, entry_id: EntryId, draft: EntryDraft) -> EditorResult<()> {
        self.apply(Field::Entries, |plan| plan.update_entry(entry_id, draft))
    }

    pub fn delete_entry(&mut self, entry_id: EntryId) -> EditorResult<bool> {
        let mut next = self.plan.clone();
        if !next.delete_entry(entry_id) {
            return Ok(false);
        }
        self.commit(Field::Entries, next)?;
        Ok(true)
    }

    /// Rejected toggles are returned as outcomes and never written.
    pub fn toggle_plot(&mut self, entry_id: EntryId, cell: GridCell) -> EditorResult<PlacementOutcome> {
        let mut next = self.plan.clone();
        let outcome = next.toggle_plot(entry_id, cell)?;
        if outcome.changed() {
            self.commit(Field::Entries, next)?;
        }
        Ok(outcome)
    }

    pub fn add_meeting_detail(&mut self, entry_id: EntryId) -> EditorResult<MeetingId> {
        self.apply(Field::Entries, |plan| plan.add_meeting_detail(entry_id))
    }

    pub fn remove_meeting_detail(
        &mut self,
        entry_id: EntryId,
        meeting_id: MeetingId,
    ) -> EditorResult<bool> {
        let mut next = self.plan.clone();
        if !next.remove_meeting_detail(entry_id, meeting_id)? {
            return Ok(false);
        }
        self.commit(Field::Entries, next)?;
        Ok(true)
    }

    /// Reserves a meeting number and writes the raised counter with the
    /// entries, so the number stays taken after a reload.
    pub fn reserve_meeting_number(&mut self) -> EditorResult<u32> {
        let mut next = self.plan.clone();
        let number = next.reserve_meeting_number();
        self.commit(Field::Entries, next)?;
        Ok(number)
    }

    /// Pre-filled "add entry" form: one meeting with a freshly reserved
    /// number and the suggested dates (or the first free week when there is
    /// no previous entry to start from).
    pub fn prepare_entry_draft(&mut self) -> EditorResult<EntryDraft> {
        let number = self.reserve_meeting_number()?;
        let mut draft = EntryDraft::new(
            "",
            vec![MeetingDetail::new(1, number, DEFAULT_MEETING_JP)],
        );
        draft.date_range = self
            .plan
            .suggest_next_dates()
            .or_else(|| self.plan.first_free_week());
        Ok(draft)
    }

    /// Queues a request for the add-entry form to open with a prepared draft.
    pub fn request_add_entry(&mut self) -> EditorResult<()> {
        let draft = self.prepare_entry_draft()?;
        self.requests
            .push_back(EditorRequest::OpenAddEntryForm { draft });
        Ok(())
    }

    /// Drains pending requests in the order they were made.
    pub fn take_requests(&mut self) -> Vec<EditorRequest> {
        self.requests.drain(..).collect()
    }

    fn apply<T, F>(&mut self, field: Field, change: F) -> EditorResult<T>
    where
        F: FnOnce(&mut SemesterPlan) -> Result<T, PlanError>,
    {
        let mut next = self.plan.clone();
        let value = change(&mut next)?;
        self.commit(field, next)?;
        Ok(value)
    }

    fn commit(&mut self, field: Field, next: SemesterPlan) -> EditorResult<()> {
        match field {
            Field::BlockedWeeks => self.store.save_blocked_weeks(&next)?,
            Field::Entries => self.store.save_entries(&next)?,
        }
        self.plan = next;
        Ok(())
    }
}
