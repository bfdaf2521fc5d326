//! The store seam the synchronizer writes through.

use anyhow::{Result, bail};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::model::RequirementGroup;
use crate::snapshot::StoredPlan;

/// Full-snapshot persistence for a plan and its requirement groups.
///
/// Both saves replace everything previously stored for that collection
/// inside one transaction. There is no incremental path.
pub trait PlanStore: Send {
    /// Read every course, semester, and placement row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_plan(&mut self) -> Result<StoredPlan>;

    /// Read the requirement-group list in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_requirements(&mut self) -> Result<Vec<RequirementGroup>>;

    /// Replace the stored plan with `plan`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the previous contents survive.
    fn save_plan(&mut self, plan: &StoredPlan) -> Result<()>;

    /// Replace the stored requirement groups, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the previous contents survive.
    fn save_requirements(&mut self, groups: &[RequirementGroup]) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    plan: StoredPlan,
    groups: Vec<RequirementGroup>,
    plan_saves: usize,
    group_saves: usize,
    fail_saves: usize,
    save_delay: Option<Duration>,
}

/// In-memory [`PlanStore`]. Clones share state, so a test can keep a handle
/// while the synchronizer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_plan(plan: StoredPlan) -> Self {
        let store = Self::default();
        store.lock().plan = plan;
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `count` saves fail without touching stored data.
    pub fn fail_next_saves(&self, count: usize) {
        self.lock().fail_saves = count;
    }

    /// Sleep this long inside every save, simulating slow I/O.
    pub fn set_save_delay(&self, delay: Duration) {
        self.lock().save_delay = Some(delay);
    }

    #[must_use]
    pub fn plan(&self) -> StoredPlan {
        self.lock().plan.clone()
    }

    #[must_use]
    pub fn groups(&self) -> Vec<RequirementGroup> {
        self.lock().groups.clone()
    }

    /// Successful plan saves so far.
    #[must_use]
    pub fn plan_saves(&self) -> usize {
        self.lock().plan_saves
    }

    /// Successful requirement-group saves so far.
    #[must_use]
    pub fn group_saves(&self) -> usize {
        self.lock().group_saves
    }

    fn before_save(&self) -> Result<()> {
        let delay = {
            let mut inner = self.lock();
            if inner.fail_saves > 0 {
                inner.fail_saves -= 1;
                bail!("injected save failure");
            }
            inner.save_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        Ok(())
    }
}

impl PlanStore for MemoryStore {
    fn load_plan(&mut self) -> Result<StoredPlan> {
        Ok(self.plan())
    }

    fn load_requirements(&mut self) -> Result<Vec<RequirementGroup>> {
        Ok(self.groups())
    }

    fn save_plan(&mut self, plan: &StoredPlan) -> Result<()> {
        self.before_save()?;
        let mut inner = self.lock();
        inner.plan = plan.clone();
        inner.plan_saves += 1;
        Ok(())
    }

    fn save_requirements(&mut self, groups: &[RequirementGroup]) -> Result<()> {
        self.before_save()?;
        let mut inner = self.lock();
        inner.groups = groups.to_vec();
        inner.group_saves += 1;
        Ok(())
    }
}
