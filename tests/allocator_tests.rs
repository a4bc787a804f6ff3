use proptest::prelude::*;
use semester_grid::allocator::{self, placement_conflict};
use semester_grid::{
    BlockRegistry, BlockType, Entry, EntryDraft, GridCell, MeetingDetail, PlacementConflict,
    PlacementOutcome, Semester, SemesterHalf, SemesterPlan,
};
use std::collections::HashSet;

fn semester() -> Semester {
    Semester::new(SemesterHalf::First, "2024/2025")
}

fn entry_with_hours(id: u32, hours: &[u32]) -> Entry {
    let details = hours
        .iter()
        .enumerate()
        .map(|(idx, jp)| MeetingDetail::new(idx as u32 + 1, idx as u32 + 1, *jp))
        .collect();
    Entry::new(id, "Bab", details)
}

fn shares(entry: &Entry) -> Vec<u32> {
    entry.plot_weeks.iter().map(|plot| plot.jp).collect()
}

#[test]
fn duration_five_over_three_weeks_splits_two_two_one() {
    let mut entry = entry_with_hours(1, &[3, 2]);
    let blocks = BlockRegistry::new();
    for slot in 1..=3 {
        let outcome = allocator::toggle_plot(&mut entry, GridCell::new(2, slot), &semester(), &blocks, &[]);
        assert_eq!(outcome, PlacementOutcome::Added);
    }
    assert_eq!(shares(&entry), vec![2, 2, 1]);
}

#[test]
fn remainder_follows_insertion_order() {
    let mut entry = entry_with_hours(1, &[3, 2]);
    let blocks = BlockRegistry::new();
    for cell in [GridCell::new(3, 4), GridCell::new(1, 1), GridCell::new(2, 2)] {
        allocator::toggle_plot(&mut entry, cell, &semester(), &blocks, &[]);
    }
    assert_eq!(entry.plot_weeks[0].cell(), GridCell::new(3, 4));
    assert_eq!(shares(&entry), vec![2, 2, 1]);
}

#[test]
fn toggling_again_removes_and_respreads() {
    let mut entry = entry_with_hours(1, &[3, 2]);
    let blocks = BlockRegistry::new();
    for slot in 1..=3 {
        allocator::toggle_plot(&mut entry, GridCell::new(2, slot), &semester(), &blocks, &[]);
    }
    let outcome = allocator::toggle_plot(&mut entry, GridCell::new(2, 1), &semester(), &blocks, &[]);
    assert_eq!(outcome, PlacementOutcome::Removed);
    assert_eq!(shares(&entry), vec![3, 2]);
    assert!(!entry.plots(GridCell::new(2, 1)));
}

#[test]
fn blocked_cell_is_a_silent_no_op() {
    let mut blocks = BlockRegistry::new();
    blocks
        .add_block(&semester(), GridCell::new(1, 2), BlockType::Holiday, "Libur")
        .unwrap();
    let mut entry = entry_with_hours(1, &[2]);
    let before = entry.clone();
    let outcome = allocator::toggle_plot(&mut entry, GridCell::new(1, 2), &semester(), &blocks, &[]);
    assert_eq!(
        outcome,
        PlacementOutcome::Rejected {
            conflict: PlacementConflict::Blocked
        }
    );
    assert!(!outcome.changed());
    assert_eq!(entry, before);
}

#[test]
fn cell_owned_by_another_entry_is_rejected() {
    let mut other = entry_with_hours(2, &[2]);
    other.plot_weeks.push(semester_grid::PlotWeek {
        period: 4,
        slot: 1,
        jp: 2,
    });
    let mut entry = entry_with_hours(1, &[2]);
    let outcome = allocator::toggle_plot(
        &mut entry,
        GridCell::new(4, 1),
        &semester(),
        &BlockRegistry::new(),
        std::slice::from_ref(&other),
    );
    assert_eq!(
        outcome,
        PlacementOutcome::Rejected {
            conflict: PlacementConflict::OccupiedBy { entry_id: 2 }
        }
    );
    assert!(entry.plot_weeks.is_empty());
}

#[test]
fn out_of_grid_cells_are_rejected() {
    let conflict = placement_conflict(1, GridCell::new(1, 5), &semester(), &BlockRegistry::new(), &[]);
    assert_eq!(conflict, Some(PlacementConflict::OutOfGrid));
    let conflict = placement_conflict(1, GridCell::new(0, 1), &semester(), &BlockRegistry::new(), &[]);
    assert_eq!(conflict, Some(PlacementConflict::OutOfGrid));
}

#[test]
fn outcome_serializes_with_reason_tag() {
    let outcome = PlacementOutcome::Rejected {
        conflict: PlacementConflict::OccupiedBy { entry_id: 7 },
    };
    let value = serde_json::to_value(outcome).unwrap();
    assert_eq!(value["outcome"], "rejected");
    assert_eq!(value["conflict"]["reason"], "occupied_by");
    assert_eq!(value["conflict"]["entry_id"], 7);
}

fn plan_with_two_entries() -> SemesterPlan {
    let mut plan = SemesterPlan::new(semester());
    plan.add_block(GridCell::new(1, 2), BlockType::Holiday, "Idul Adha")
        .unwrap();
    plan.add_block(GridCell::new(4, 3), BlockType::Exam, "PTS")
        .unwrap();
    plan.create_entry(EntryDraft::new(
        "Bab 1",
        vec![MeetingDetail::new(1, 1, 3), MeetingDetail::new(2, 2, 4)],
    ))
    .unwrap();
    plan.create_entry(EntryDraft::new("Bab 2", vec![MeetingDetail::new(1, 3, 5)]))
        .unwrap();
    plan
}

proptest! {
    #[test]
    fn toggles_keep_budget_and_ownership_invariants(
        clicks in prop::collection::vec((1u32..=2, 0u8..=7, 0u8..=6), 0..40)
    ) {
        let mut plan = plan_with_two_entries();
        for (entry_id, period, slot) in clicks {
            plan.toggle_plot(entry_id, GridCell::new(period, slot)).unwrap();
        }

        let mut seen = HashSet::new();
        for entry in plan.entries() {
            if !entry.plot_weeks.is_empty() {
                prop_assert_eq!(entry.plotted_jp(), entry.duration());
                let max = entry.plot_weeks.iter().map(|p| p.jp).max().unwrap();
                let min = entry.plot_weeks.iter().map(|p| p.jp).min().unwrap();
                prop_assert!(max - min <= 1);
            }
            for plot in &entry.plot_weeks {
                prop_assert!(plan.semester().contains(plot.cell()));
                prop_assert!(plan.block_at(plot.cell()).is_none());
                prop_assert!(seen.insert(plot.cell()));
            }
        }
        prop_assert!(plan.validate().is_ok());
    }

    #[test]
    fn spread_evenly_sums_to_total(total in 0u32..200, n in 1usize..20) {
        let shares = allocator::spread_evenly(total, n);
        prop_assert_eq!(shares.len(), n);
        prop_assert_eq!(shares.iter().sum::<u32>(), total);
        prop_assert!(shares.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
