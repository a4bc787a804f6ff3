use crate::allocator;
use crate::blocks::BlockRegistry;
use crate::calendar::Semester;
use crate::entry::{DateRange, Entry};
use chrono::{Days, NaiveDate};
use tracing::debug;

/// Upper bound on one-week advances while looking for a free week.
pub const MAX_SUGGESTION_STEPS: usize = 12;

/// Offset from a suggested start to its end: a Monday-to-Friday span.
const END_OFFSET: Days = Days::new(4);

const WEEK: Days = Days::new(7);

/// Proposes dates for the next entry, starting one week after the
/// latest-numbered entry.
///
/// Weeks that fall outside the grid, are blocked, or are already plotted by
/// any entry are skipped a week at a time, at most [`MAX_SUGGESTION_STEPS`]
/// times. The candidate reached is returned even if still unusable; callers
/// validate before saving. `None` when there is nothing to start from.
///
/// Stepping stops early at the end of the representable calendar; `None`
/// when not even one week or the end date fits.
pub fn suggest_next_dates(
    semester: &Semester,
    blocks: &BlockRegistry,
    entries: &[Entry],
) -> Option<DateRange> {
    let previous = entries
        .iter()
        .filter(|entry| entry.max_meeting_number().is_some())
        .max_by_key(|entry| entry.max_meeting_number())?;
    let previous_start = previous.date_range?.start;

    let mut candidate = previous_start.checked_add_days(WEEK)?;
    let mut steps = 0;
    while steps < MAX_SUGGESTION_STEPS && !is_free_week(semester, blocks, entries, candidate) {
        let Some(next) = candidate.checked_add_days(WEEK) else {
            break;
        };
        candidate = next;
        steps += 1;
    }
    debug!(
        previous_entry = previous.id,
        %previous_start,
        %candidate,
        steps,
        "suggested next entry dates"
    );

    Some(DateRange::new(candidate, candidate.checked_add_days(END_OFFSET)?))
}

fn is_free_week(
    semester: &Semester,
    blocks: &BlockRegistry,
    entries: &[Entry],
    date: NaiveDate,
) -> bool {
    match semester.coordinate_of(date) {
        Some(cell) if semester.contains(cell) => {
            !blocks.is_blocked(cell) && allocator::owner_of(entries, cell, None).is_none()
        }
        _ => false,
    }
}
