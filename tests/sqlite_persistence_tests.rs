#![cfg(feature = "sqlite")]

use semester_grid::{
    BlockType, EntryDraft, GridCell, MeetingDetail, PlanStore, SemesterHalf, SemesterPlan,
    SqlitePlanStore,
};
use tempfile::NamedTempFile;

fn plan_with_entries(chapters: &[&str]) -> SemesterPlan {
    let mut plan = SemesterPlan::for_half(SemesterHalf::First, "2025/2026");
    plan.add_block(GridCell::new(2, 3), BlockType::Holiday, "HUT RI")
        .unwrap();
    for (idx, chapter) in chapters.iter().enumerate() {
        plan.create_entry(EntryDraft::new(
            *chapter,
            vec![MeetingDetail::new(1, idx as u32 + 1, 2)],
        ))
        .unwrap();
    }
    plan
}

#[test]
fn sqlite_store_round_trip_plan() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(file.path()).unwrap();
    assert!(store.load_plan().unwrap().is_none());

    let mut plan = plan_with_entries(&["Bilangan", "Aljabar"]);
    plan.toggle_plot(1, GridCell::new(1, 1)).unwrap();
    plan.reserve_meeting_number();
    store.save_plan(&plan).unwrap();

    let reopened = SqlitePlanStore::new(file.path()).unwrap();
    let loaded = reopened.load_plan().unwrap().unwrap();
    assert_eq!(loaded, plan);
    assert_eq!(loaded.meeting_counter(), 3);
}

#[test]
fn entries_keep_row_order_not_id_order() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let mut plan = plan_with_entries(&["Pertama", "Kedua", "Ketiga"]);
    plan.delete_entry(1);
    plan.create_entry(EntryDraft::new("Keempat", vec![MeetingDetail::new(1, 9, 2)]))
        .unwrap();
    store.save_plan(&plan).unwrap();

    let loaded = store.load_plan().unwrap().unwrap();
    let chapters: Vec<&str> = loaded.entries().iter().map(|e| e.chapter.as_str()).collect();
    assert_eq!(chapters, vec!["Kedua", "Ketiga", "Keempat"]);
}

#[test]
fn partial_saves_touch_one_field() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let base = plan_with_entries(&["Bilangan"]);
    store.save_plan(&base).unwrap();

    let mut edited = base.clone();
    edited.remove_block(1);
    edited
        .create_entry(EntryDraft::new("Geometri", vec![MeetingDetail::new(1, 5, 3)]))
        .unwrap();

    store.save_entries(&edited).unwrap();
    let loaded = store.load_plan().unwrap().unwrap();
    assert_eq!(loaded.entries().len(), 2);
    assert_eq!(loaded.blocked_weeks().len(), 1);
    assert_eq!(loaded.meeting_counter(), 5);

    store.save_blocked_weeks(&edited).unwrap();
    let loaded = store.load_plan().unwrap().unwrap();
    assert!(loaded.blocked_weeks().is_empty());
}

#[test]
fn partial_save_on_empty_store_writes_everything() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let plan = plan_with_entries(&["Bilangan"]);
    store.save_blocked_weeks(&plan).unwrap();
    assert_eq!(store.load_plan().unwrap(), Some(plan));
}

#[test]
fn id_marks_survive_partial_saves() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(file.path()).unwrap();
    let mut plan = plan_with_entries(&["Bilangan", "Aljabar"]);
    store.save_plan(&plan).unwrap();

    plan.remove_block(1);
    plan.delete_entry(2);
    store.save_blocked_weeks(&plan).unwrap();
    store.save_entries(&plan).unwrap();

    let mut loaded = SqlitePlanStore::new(file.path())
        .unwrap()
        .load_plan()
        .unwrap()
        .unwrap();
    assert_eq!(loaded.block_counter(), 1);
    assert_eq!(loaded.entry_counter(), 2);
    let block = loaded
        .add_block(GridCell::new(3, 1), BlockType::Exam, "PTS")
        .unwrap();
    assert_eq!(block, 2);
    let entry = loaded
        .create_entry(EntryDraft::new("Geometri", vec![MeetingDetail::new(1, 7, 2)]))
        .unwrap();
    assert_eq!(entry, 3);
}
