pub mod allocator;
pub mod blocks;
pub mod calendar;
pub mod config;
pub mod editor;
pub mod entry;
pub(crate) mod entry_validation;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod plan;
pub mod render;
pub mod report;
pub mod suggest;

pub use allocator::{PlacementConflict, PlacementOutcome};
pub use blocks::{BlockId, BlockRegistry, BlockType, BlockedWeek};
pub use calendar::{GridCell, Semester, SemesterHalf};
pub use config::{ConfigError, PlannerConfig, StorageBackend};
pub use editor::{EditorError, EditorRequest, EditorResult, PlanEditor};
pub use entry::{DateRange, Entry, EntryDraft, EntryId, MeetingDetail, MeetingId, PlotWeek};
pub use export::{MergeRange, Spreadsheet};
pub use persistence::{
    JsonPlanStore, MemoryPlanStore, PersistenceError, PersistenceResult, PlanStore,
    SharedPlanStore,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use plan::{PlanError, SemesterPlan};
pub use render::{GridLayout, Segment, merge_runs};
