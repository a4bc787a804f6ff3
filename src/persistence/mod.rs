use crate::plan::SemesterPlan;
use serde_json::Error as SerdeJsonError;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataframe error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("no semester plan stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The document store a semester plan lives in.
///
/// A plan is always read whole. Writes replace whole fields: the complete
/// blocked-week list or the complete entry list, never single elements.
pub trait PlanStore {
    fn load_plan(&self) -> PersistenceResult<Option<SemesterPlan>>;
    fn save_plan(&self, plan: &SemesterPlan) -> PersistenceResult<()>;
    fn save_blocked_weeks(&self, plan: &SemesterPlan) -> PersistenceResult<()>;
    fn save_entries(&self, plan: &SemesterPlan) -> PersistenceResult<()>;
}

/// Store handle shared across threads by the binaries.
pub type SharedPlanStore = Box<dyn PlanStore + Send + Sync>;

impl<T: PlanStore + ?Sized> PlanStore for Box<T> {
    fn load_plan(&self) -> PersistenceResult<Option<SemesterPlan>> {
        (**self).load_plan()
    }

    fn save_plan(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        (**self).save_plan(plan)
    }

    fn save_blocked_weeks(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        (**self).save_blocked_weeks(plan)
    }

    fn save_entries(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        (**self).save_entries(plan)
    }
}

pub fn validate_plan(plan: &SemesterPlan) -> PersistenceResult<()> {
    plan.validate()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonPlanStore, load_plan_from_json, save_plan_to_json};
pub use memory::MemoryPlanStore;
