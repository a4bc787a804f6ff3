use super::{PersistenceResult, PlanStore};
use crate::plan::SemesterPlan;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &SemesterPlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    write_document(plan, path.as_ref())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SemesterPlan> {
    let file = File::open(path)?;
    let plan: SemesterPlan = serde_json::from_reader(file)?;
    super::validate_plan(&plan)?;
    Ok(plan)
}

fn write_document(plan: &SemesterPlan, path: &Path) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, plan)?;
    Ok(())
}

/// A plan kept as one JSON document on disk.
///
/// Partial saves read the stored document back, swap in the named field and
/// rewrite the file.
#[derive(Debug, Clone)]
pub struct JsonPlanStore {
    path: PathBuf,
}

impl JsonPlanStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> PersistenceResult<Option<SemesterPlan>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_reader(file)?))
    }
}

impl PlanStore for JsonPlanStore {
    fn load_plan(&self) -> PersistenceResult<Option<SemesterPlan>> {
        let Some(plan) = self.read_document()? else {
            return Ok(None);
        };
        super::validate_plan(&plan)?;
        info!(path = %self.path.display(), entries = plan.entries().len(), "loaded semester plan");
        Ok(Some(plan))
    }

    fn save_plan(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        save_plan_to_json(plan, &self.path)?;
        info!(path = %self.path.display(), "saved semester plan");
        Ok(())
    }

    fn save_blocked_weeks(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let Some(mut stored) = self.read_document()? else {
            return self.save_plan(plan);
        };
        stored.adopt_blocked_weeks(plan);
        write_document(&stored, &self.path)?;
        info!(
            path = %self.path.display(),
            blocked_weeks = plan.blocked_weeks().len(),
            "saved blocked weeks"
        );
        Ok(())
    }

    fn save_entries(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let Some(mut stored) = self.read_document()? else {
            return self.save_plan(plan);
        };
        stored.adopt_entries(plan);
        write_document(&stored, &self.path)?;
        info!(path = %self.path.display(), entries = plan.entries().len(), "saved entries");
        Ok(())
    }
}
