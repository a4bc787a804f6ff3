use crate::allocator;
use crate::calendar::GridCell;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub type EntryId = u32;
pub type MeetingId = u32;

/// Smallest teaching-hour count a single meeting may carry.
pub const MIN_MEETING_JP: u32 = 1;
/// Largest teaching-hour count a single meeting may carry.
pub const MAX_MEETING_JP: u32 = 6;
/// Hour count given to meetings added without an explicit value.
pub const DEFAULT_MEETING_JP: u32 = 2;
/// Largest meeting number an entry may carry, so every number has a successor.
pub const MAX_MEETING_NUMBER: u32 = u32::MAX - 1;

/// One physical class meeting and its hour count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDetail {
    pub id: MeetingId,
    pub number: u32,
    pub jp: u32,
}

impl MeetingDetail {
    pub fn new(id: MeetingId, number: u32, jp: u32) -> Self {
        Self { id, number, jp }
    }
}

/// Share of an entry's hour budget assigned to one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotWeek {
    pub period: u8,
    pub slot: u8,
    pub jp: u32,
}

impl PlotWeek {
    pub fn cell(&self) -> GridCell {
        GridCell::new(self.period, self.slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// A teaching session plotted onto the grid.
///
/// `meeting_no` and `duration` are never stored on the struct; both are
/// derived from `meeting_details` on read and written out on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EntryRecord", try_from = "EntryRecord")]
pub struct Entry {
    pub id: EntryId,
    pub chapter: String,
    pub topic: String,
    pub date_range: Option<DateRange>,
    pub plot_weeks: Vec<PlotWeek>,
    pub meeting_details: Vec<MeetingDetail>,
}

impl Entry {
    pub fn new(id: EntryId, chapter: impl Into<String>, meeting_details: Vec<MeetingDetail>) -> Self {
        Self {
            id,
            chapter: chapter.into(),
            topic: String::new(),
            date_range: None,
            plot_weeks: Vec::new(),
            meeting_details,
        }
    }

    pub fn meeting_no(&self) -> String {
        compose_meeting_no(&self.meeting_details)
    }

    pub fn duration(&self) -> u32 {
        compose_duration(&self.meeting_details)
    }

    pub fn max_meeting_number(&self) -> Option<u32> {
        self.meeting_details.iter().map(|detail| detail.number).max()
    }

    pub fn plots(&self, cell: GridCell) -> bool {
        self.plot_weeks.iter().any(|plot| plot.cell() == cell)
    }

    pub fn plot_at(&self, cell: GridCell) -> Option<&PlotWeek> {
        self.plot_weeks.iter().find(|plot| plot.cell() == cell)
    }

    pub fn plotted_jp(&self) -> u32 {
        self.plot_weeks.iter().map(|plot| plot.jp).sum()
    }

    /// Appends a meeting numbered after the entry's highest one and
    /// re-spreads the grown budget over the plotted weeks.
    pub fn add_meeting_detail(&mut self) -> MeetingId {
        let id = self
            .meeting_details
            .iter()
            .map(|detail| detail.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let number = self
            .max_meeting_number()
            .map_or(1, |max| max.saturating_add(1));
        self.meeting_details
            .push(MeetingDetail::new(id, number, DEFAULT_MEETING_JP));
        allocator::redistribute(self);
        id
    }

    /// Removes one meeting. An entry always keeps at least one, so removing
    /// the last remaining meeting (or an unknown id) returns `false`.
    pub fn remove_meeting_detail(&mut self, meeting_id: MeetingId) -> bool {
        if self.meeting_details.len() <= 1 {
            return false;
        }
        let before = self.meeting_details.len();
        self.meeting_details.retain(|detail| detail.id != meeting_id);
        if self.meeting_details.len() == before {
            return false;
        }
        allocator::redistribute(self);
        true
    }
}

/// Form payload for creating or updating an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub chapter: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    pub meeting_details: Vec<MeetingDetail>,
}

impl EntryDraft {
    pub fn new(chapter: impl Into<String>, meeting_details: Vec<MeetingDetail>) -> Self {
        Self {
            chapter: chapter.into(),
            topic: String::new(),
            date_range: None,
            meeting_details,
        }
    }
}

/// `P<number>` for each meeting in ascending order, joined with `/`.
pub fn compose_meeting_no(details: &[MeetingDetail]) -> String {
    let mut numbers: Vec<u32> = details.iter().map(|detail| detail.number).collect();
    numbers.sort_unstable();
    numbers
        .iter()
        .map(|number| format!("P{number}"))
        .collect::<Vec<_>>()
        .join("/")
}

pub fn compose_duration(details: &[MeetingDetail]) -> u32 {
    details.iter().map(|detail| detail.jp).sum()
}

/// Every unsigned integer embedded in a meeting label, in order of appearance.
pub fn parse_meeting_numbers(meeting_no: &str) -> Vec<u32> {
    meeting_no
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse::<u32>().ok())
        .collect()
}

/// Highest meeting number in use plus one, or 1 for an empty plan.
pub fn next_meeting_number(entries: &[Entry]) -> u32 {
    entries
        .iter()
        .filter_map(Entry::max_meeting_number)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Rebuilds meeting details for entries stored before details existed.
///
/// Numbers come from the integers in the old label (zeros dropped, sorted,
/// deduplicated). A known duration is spread over them the same way plot
/// weeks are filled, clamped to the per-meeting hour range.
pub fn migrate_legacy_meeting_no(meeting_no: &str, duration: Option<u32>) -> Vec<MeetingDetail> {
    let mut numbers: Vec<u32> = parse_meeting_numbers(meeting_no)
        .into_iter()
        .filter(|number| *number > 0)
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    if numbers.is_empty() {
        return Vec::new();
    }

    let shares = match duration {
        Some(total) if total > 0 => allocator::spread_evenly(total, numbers.len()),
        _ => vec![DEFAULT_MEETING_JP; numbers.len()],
    };
    numbers
        .into_iter()
        .zip(shares)
        .enumerate()
        .map(|(idx, (number, jp))| {
            MeetingDetail::new(
                idx as MeetingId + 1,
                number,
                jp.clamp(MIN_MEETING_JP, MAX_MEETING_JP),
            )
        })
        .collect()
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    id: EntryId,
    #[serde(default)]
    meeting_no: String,
    chapter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_range: Option<DateRange>,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    plot_weeks: Vec<PlotWeek>,
    #[serde(default)]
    meeting_details: Vec<MeetingDetail>,
}

impl From<Entry> for EntryRecord {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            meeting_no: entry.meeting_no(),
            duration: Some(entry.duration()),
            chapter: entry.chapter,
            date_range: entry.date_range,
            topic: entry.topic,
            plot_weeks: entry.plot_weeks,
            meeting_details: entry.meeting_details,
        }
    }
}

impl TryFrom<EntryRecord> for Entry {
    type Error = String;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        let legacy = record.meeting_details.is_empty() && !record.meeting_no.trim().is_empty();
        let meeting_details = if legacy {
            let migrated = migrate_legacy_meeting_no(&record.meeting_no, record.duration);
            if migrated.is_empty() {
                return Err(format!(
                    "entry {} has no meeting details and an unreadable meeting label '{}'",
                    record.id, record.meeting_no
                ));
            }
            warn!(
                entry_id = record.id,
                meeting_no = %record.meeting_no,
                "migrated legacy meeting label into meeting details"
            );
            migrated
        } else {
            record.meeting_details
        };

        let mut entry = Self {
            id: record.id,
            chapter: record.chapter,
            topic: record.topic,
            date_range: record.date_range,
            plot_weeks: record.plot_weeks,
            meeting_details,
        };
        if legacy {
            // Clamped hours may no longer match the stored plot shares.
            allocator::redistribute(&mut entry);
        }
        Ok(entry)
    }
}
