use crate::persistence::PersistenceResult;
use crate::plan::SemesterPlan;
use chrono::{Datelike, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;

/// One row per entry, in plan order.
pub fn entries_frame(plan: &SemesterPlan) -> PersistenceResult<DataFrame> {
    let entries = plan.entries();
    let ids: Vec<i32> = entries.iter().map(|entry| entry.id as i32).collect();
    let meeting_no: Vec<String> = entries.iter().map(|entry| entry.meeting_no()).collect();
    let chapter: Vec<&str> = entries.iter().map(|entry| entry.chapter.as_str()).collect();
    let topic: Vec<&str> = entries.iter().map(|entry| entry.topic.as_str()).collect();
    let duration: Vec<i64> = entries.iter().map(|entry| entry.duration() as i64).collect();
    let start: Vec<Option<i32>> = entries
        .iter()
        .map(|entry| entry.date_range.map(|range| date_to_i32(range.start)))
        .collect();
    let end: Vec<Option<i32>> = entries
        .iter()
        .map(|entry| entry.date_range.map(|range| date_to_i32(range.end)))
        .collect();
    let weeks: Vec<i32> = entries
        .iter()
        .map(|entry| entry.plot_weeks.len() as i32)
        .collect();

    let columns = vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("meeting_no"), meeting_no).into_column(),
        Series::new(PlSmallStr::from_static("chapter"), chapter).into_column(),
        Series::new(PlSmallStr::from_static("topic"), topic).into_column(),
        Series::new(PlSmallStr::from_static("duration"), duration).into_column(),
        Series::new(PlSmallStr::from_static("start"), start)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("end"), end)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("weeks"), weeks).into_column(),
    ];
    Ok(DataFrame::new(columns)?)
}

/// Boxed text table of a frame, one line per row.
pub fn render_frame(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| match col.get(row_idx) {
                Ok(AnyValue::Null) | Err(_) => String::new(),
                Ok(AnyValue::Int32(v)) => v.to_string(),
                Ok(AnyValue::Int64(v)) => v.to_string(),
                Ok(AnyValue::String(s)) => s.to_string(),
                Ok(other) => other.to_string(),
            })
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_line(&mut out, &names, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_line(out: &mut String, values: &[String], widths: &[usize]) {
    out.push('|');
    for (value, width) in values.iter().zip(widths) {
        out.push(' ');
        out.push_str(value);
        out.push_str(&" ".repeat(width.saturating_sub(value.chars().count())));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Days since 1970-01-01, the physical value of a polars `Date`.
fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - DAYS_FROM_CE_TO_UNIX_EPOCH
}

const DAYS_FROM_CE_TO_UNIX_EPOCH: i32 = 719_163;
