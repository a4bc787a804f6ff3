use chrono::NaiveDate;
use polars::prelude::*;
use semester_grid::report::{entries_frame, render_frame};
use semester_grid::{DateRange, EntryDraft, GridCell, MeetingDetail, SemesterHalf, SemesterPlan};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan() -> SemesterPlan {
    let mut plan = SemesterPlan::for_half(SemesterHalf::First, "2024/2025");
    let mut draft = EntryDraft::new(
        "Bilangan",
        vec![MeetingDetail::new(1, 1, 3), MeetingDetail::new(2, 2, 2)],
    );
    draft.date_range = Some(DateRange::new(d(2024, 8, 5), d(2024, 8, 9)));
    let id = plan.create_entry(draft).unwrap();
    plan.toggle_plot(id, GridCell::new(2, 1)).unwrap();
    plan.create_entry(EntryDraft::new("Aljabar", vec![MeetingDetail::new(1, 3, 2)]))
        .unwrap();
    plan
}

#[test]
fn frame_has_one_row_per_entry() {
    let df = entries_frame(&plan()).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(
        df.get_column_names_str(),
        vec!["id", "meeting_no", "chapter", "topic", "duration", "start", "end", "weeks"]
    );
    assert_eq!(df.column("duration").unwrap().get(0).unwrap(), AnyValue::Int64(5));
    assert_eq!(df.column("weeks").unwrap().get(0).unwrap(), AnyValue::Int32(1));
}

#[test]
fn dates_become_epoch_days() {
    let df = entries_frame(&plan()).unwrap();
    let start = df.column("start").unwrap();
    assert_eq!(start.dtype(), &DataType::Date);
    // 2024-08-05 is 19_940 days after 1970-01-01.
    assert_eq!(start.get(0).unwrap(), AnyValue::Date(19_940));
    assert_eq!(df.column("end").unwrap().get(0).unwrap(), AnyValue::Date(19_944));
    assert_eq!(start.get(1).unwrap(), AnyValue::Null);
}

#[test]
fn rendered_table_lists_chapters_and_dates() {
    let table = render_frame(&entries_frame(&plan()).unwrap());
    assert!(table.contains("P1/P2"));
    assert!(table.contains("Aljabar"));
    assert!(table.contains("2024-08-05"));
    assert_eq!(table.lines().count(), 2 + 1 + 2 + 1);
}
