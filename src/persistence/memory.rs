use super::{PersistenceResult, PlanStore};
use crate::plan::SemesterPlan;
use std::sync::Mutex;

/// Keeps the stored plan in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    stored: Mutex<Option<SemesterPlan>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(plan: SemesterPlan) -> Self {
        Self {
            stored: Mutex::new(Some(plan)),
        }
    }

    /// Copy of whatever was last written.
    pub fn snapshot(&self) -> Option<SemesterPlan> {
        self.stored.lock().expect("memory store mutex poisoned").clone()
    }
}

impl PlanStore for MemoryPlanStore {
    fn load_plan(&self) -> PersistenceResult<Option<SemesterPlan>> {
        let plan = self.snapshot();
        if let Some(plan) = &plan {
            super::validate_plan(plan)?;
        }
        Ok(plan)
    }

    fn save_plan(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        *self.stored.lock().expect("memory store mutex poisoned") = Some(plan.clone());
        Ok(())
    }

    fn save_blocked_weeks(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut stored = self.stored.lock().expect("memory store mutex poisoned");
        match stored.as_mut() {
            Some(current) => current.adopt_blocked_weeks(plan),
            None => *stored = Some(plan.clone()),
        }
        Ok(())
    }

    fn save_entries(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut stored = self.stored.lock().expect("memory store mutex poisoned");
        match stored.as_mut() {
            Some(current) => current.adopt_entries(plan),
            None => *stored = Some(plan.clone()),
        }
        Ok(())
    }
}
