use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of periods (months) in one semester half.
pub const PERIODS_PER_HALF: u8 = 6;

/// Widest period in the fixed table.
pub const MAX_SLOTS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SemesterHalf {
    /// July to December.
    First,
    /// January to June.
    Second,
}

impl SemesterHalf {
    pub fn as_number(self) -> u8 {
        match self {
            SemesterHalf::First => 1,
            SemesterHalf::Second => 2,
        }
    }
}

impl TryFrom<u8> for SemesterHalf {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SemesterHalf::First),
            2 => Ok(SemesterHalf::Second),
            other => Err(format!("semester half must be 1 or 2 (got {other})")),
        }
    }
}

impl From<SemesterHalf> for u8 {
    fn from(value: SemesterHalf) -> Self {
        value.as_number()
    }
}

impl fmt::Display for SemesterHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_number())
    }
}

/// One row of the fixed month table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDef {
    pub name: &'static str,
    pub month: u32,
    pub slots: u8,
}

// Weeks per month are a fixed lookup, not derived from real calendars.
// Three long months per half carry a fifth slot.
const FIRST_HALF: [PeriodDef; 6] = [
    PeriodDef { name: "Juli", month: 7, slots: 4 },
    PeriodDef { name: "Agustus", month: 8, slots: 5 },
    PeriodDef { name: "September", month: 9, slots: 4 },
    PeriodDef { name: "Oktober", month: 10, slots: 5 },
    PeriodDef { name: "November", month: 11, slots: 4 },
    PeriodDef { name: "Desember", month: 12, slots: 5 },
];

const SECOND_HALF: [PeriodDef; 6] = [
    PeriodDef { name: "Januari", month: 1, slots: 5 },
    PeriodDef { name: "Februari", month: 2, slots: 4 },
    PeriodDef { name: "Maret", month: 3, slots: 5 },
    PeriodDef { name: "April", month: 4, slots: 4 },
    PeriodDef { name: "Mei", month: 5, slots: 5 },
    PeriodDef { name: "Juni", month: 6, slots: 4 },
];

/// The six periods of a half, in teaching order.
pub fn periods_for(half: SemesterHalf) -> &'static [PeriodDef; 6] {
    match half {
        SemesterHalf::First => &FIRST_HALF,
        SemesterHalf::Second => &SECOND_HALF,
    }
}

pub fn period_names(half: SemesterHalf) -> [&'static str; 6] {
    let table = *periods_for(half);
    table.map(|def| def.name)
}

/// Slot count for a month name. Names outside the table get 4.
pub fn slot_count(period_name: &str) -> u8 {
    FIRST_HALF
        .iter()
        .chain(SECOND_HALF.iter())
        .find(|def| def.name == period_name)
        .map(|def| def.slots)
        .unwrap_or(4)
}

/// Slot count for a 1-based period index, `None` outside 1..=6.
pub fn slot_count_at(half: SemesterHalf, period: u8) -> Option<u8> {
    if period == 0 || period > PERIODS_PER_HALF {
        return None;
    }
    Some(periods_for(half)[(period - 1) as usize].slots)
}

/// A `(period, slot)` coordinate on the semester grid, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub period: u8,
    pub slot: u8,
}

impl GridCell {
    pub fn new(period: u8, slot: u8) -> Self {
        Self { period, slot }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.period, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    #[serde(rename = "semesterHalf")]
    pub half: SemesterHalf,
    pub year: String,
}

impl Semester {
    pub fn new(half: SemesterHalf, year: impl Into<String>) -> Self {
        Self {
            half,
            year: year.into(),
        }
    }

    pub fn periods(&self) -> &'static [PeriodDef; 6] {
        periods_for(self.half)
    }

    pub fn slot_count(&self, period: u8) -> Option<u8> {
        slot_count_at(self.half, period)
    }

    /// True when the coordinate exists in this semester's grid.
    pub fn contains(&self, cell: GridCell) -> bool {
        match self.slot_count(cell.period) {
            Some(slots) => cell.slot >= 1 && cell.slot <= slots,
            None => false,
        }
    }

    /// Every grid coordinate in period-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.periods()
            .iter()
            .enumerate()
            .flat_map(|(idx, def)| (1..=def.slots).map(move |slot| GridCell::new(idx as u8 + 1, slot)))
    }

    /// Calendar year the half falls in. `"2024/2025"` puts the first half in
    /// 2024 and the second in 2025; a single year is used for both halves.
    pub fn calendar_year(&self) -> Option<i32> {
        let years = four_digit_numbers(&self.year);
        match (self.half, years.as_slice()) {
            (_, []) => None,
            (SemesterHalf::First, [first, ..]) => Some(*first),
            (SemesterHalf::Second, [only]) => Some(*only),
            (SemesterHalf::Second, [_, second, ..]) => Some(*second),
        }
    }

    /// Maps a date onto the grid. The slot is `(day - 1) / 7 + 1` and may
    /// exceed the period's slot count; check with [`Semester::contains`].
    pub fn coordinate_of(&self, date: NaiveDate) -> Option<GridCell> {
        if let Some(year) = self.calendar_year() {
            if date.year() != year {
                return None;
            }
        }
        let position = self.periods().iter().position(|def| def.month == date.month())?;
        let slot = ((date.day() - 1) / 7 + 1) as u8;
        Some(GridCell::new(position as u8 + 1, slot))
    }

    /// First day of the week a cell stands for.
    pub fn week_start(&self, cell: GridCell) -> Option<NaiveDate> {
        if !self.contains(cell) {
            return None;
        }
        let year = self.calendar_year()?;
        let month = self.periods()[(cell.period - 1) as usize].month;
        NaiveDate::from_ymd_opt(year, month, (cell.slot as u32 - 1) * 7 + 1)
    }
}

fn four_digit_numbers(input: &str) -> Vec<i32> {
    input
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| run.len() == 4)
        .filter_map(|run| run.parse::<i32>().ok())
        .collect()
}
