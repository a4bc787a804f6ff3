use semester_grid::{
    BlockRegistry, BlockType, GridCell, PlanError, Semester, SemesterHalf, SemesterPlan,
};

fn semester() -> Semester {
    Semester::new(SemesterHalf::First, "2024/2025")
}

#[test]
fn add_block_assigns_ids_and_type_color() {
    let mut registry = BlockRegistry::new();
    let first = registry
        .add_block(&semester(), GridCell::new(1, 2), BlockType::Holiday, "Idul Fitri")
        .unwrap();
    let second = registry
        .add_block(&semester(), GridCell::new(3, 1), BlockType::Exam, "  PTS  ")
        .unwrap();
    assert_eq!((first, second), (1, 2));

    let exam = registry.get(second).unwrap();
    assert_eq!(exam.label, "PTS");
    assert_eq!(exam.color, BlockType::Exam.color());
    assert!(registry.is_blocked(GridCell::new(3, 1)));
    assert_eq!(registry.block_at(GridCell::new(1, 2)).unwrap().id, first);
    assert_eq!(registry.len(), 2);
}

#[test]
fn duplicate_cell_is_rejected() {
    let mut registry = BlockRegistry::new();
    registry
        .add_block(&semester(), GridCell::new(2, 1), BlockType::Activity, "Class meeting")
        .unwrap();
    let err = registry
        .add_block(&semester(), GridCell::new(2, 1), BlockType::Holiday, "Other")
        .unwrap_err();
    assert_eq!(err, PlanError::DuplicateBlock { period: 2, slot: 1 });
    assert_eq!(registry.len(), 1);
}

#[test]
fn empty_label_and_out_of_grid_are_validation_errors() {
    let mut registry = BlockRegistry::new();
    let err = registry
        .add_block(&semester(), GridCell::new(1, 1), BlockType::Holiday, "   ")
        .unwrap_err();
    assert!(matches!(err, PlanError::Validation(_)));

    // Juli has four weeks.
    let err = registry
        .add_block(&semester(), GridCell::new(1, 5), BlockType::Holiday, "Libur")
        .unwrap_err();
    assert!(matches!(err, PlanError::Validation(_)));
    assert!(registry.is_empty());
}

#[test]
fn remove_block_is_idempotent() {
    let mut registry = BlockRegistry::new();
    let id = registry
        .add_block(&semester(), GridCell::new(4, 4), BlockType::Preparation, "Persiapan PAS")
        .unwrap();
    assert!(registry.remove_block(id));
    assert!(!registry.remove_block(id));
    assert!(!registry.is_blocked(GridCell::new(4, 4)));
}

#[test]
fn ids_continue_after_removal() {
    let mut registry = BlockRegistry::new();
    let a = registry
        .add_block(&semester(), GridCell::new(1, 1), BlockType::Holiday, "A")
        .unwrap();
    let b = registry
        .add_block(&semester(), GridCell::new(1, 2), BlockType::Holiday, "B")
        .unwrap();
    registry.remove_block(a);
    let c = registry
        .add_block(&semester(), GridCell::new(1, 3), BlockType::Holiday, "C")
        .unwrap();
    assert!(c > b);
}

#[test]
fn high_water_mark_keeps_removed_newest_id_retired() {
    let mut registry = BlockRegistry::new();
    let a = registry
        .add_block(&semester(), GridCell::new(1, 1), BlockType::Holiday, "A")
        .unwrap();
    let b = registry
        .add_block_after(a, &semester(), GridCell::new(1, 2), BlockType::Holiday, "B")
        .unwrap();
    assert!(registry.remove_block(b));
    let c = registry
        .add_block_after(b, &semester(), GridCell::new(1, 3), BlockType::Holiday, "C")
        .unwrap();
    assert_eq!(c, b + 1);
}

#[test]
fn plan_never_reuses_the_newest_block_id() {
    let mut plan = SemesterPlan::new(semester());
    plan.add_block(GridCell::new(2, 1), BlockType::Exam, "PTS")
        .unwrap();
    let newest = plan
        .add_block(GridCell::new(2, 2), BlockType::Exam, "PTS")
        .unwrap();
    assert!(plan.remove_block(newest));
    let next = plan
        .add_block(GridCell::new(2, 3), BlockType::Exam, "PTS")
        .unwrap();
    assert_eq!(next, newest + 1);
    assert_eq!(plan.block_counter(), next);

    let reloaded: SemesterPlan =
        serde_json::from_value(serde_json::to_value(&plan).unwrap()).unwrap();
    assert_eq!(reloaded.block_counter(), next);
}

#[test]
fn block_types_parse_and_serialize_snake_case() {
    for block_type in BlockType::ALL {
        assert_eq!(block_type.as_str().parse::<BlockType>(), Ok(block_type));
    }
    assert_eq!(" Exam ".parse::<BlockType>(), Ok(BlockType::Exam));
    assert!(matches!(
        "vacation".parse::<BlockType>(),
        Err(PlanError::Validation(_))
    ));

    let mut registry = BlockRegistry::new();
    registry
        .add_block(&semester(), GridCell::new(6, 3), BlockType::Religious, "Natal")
        .unwrap();
    let json = serde_json::to_value(&registry).unwrap();
    assert_eq!(json[0]["type"], "religious");
    assert_eq!(json[0]["period"], 6);
    assert_eq!(json[0]["slot"], 3);
}
