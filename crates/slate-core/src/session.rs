//! An editing session: the single mutation boundary over one plan.
//!
//! A [`Session`] holds the current plan as an immutable snapshot. Every
//! mutation clones the snapshot, applies one [`Intent`] to the clone, and on
//! success swaps the new snapshot in and hands it to the [`Synchronizer`].
//! Rejected mutations leave the held snapshot untouched.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog;
use crate::config::{self, ProjectConfig};
use crate::db::SqliteStore;
use crate::error::{SlateError, ValidationError};
use crate::model::course::{validate_code, validate_course, validate_credits, validate_name};
use crate::model::{Course, CourseId, CoursePatch, GroupPatch, Requirements, SemesterId};
use crate::plan::{Intent, Outcome, Plan, Selection};
use crate::snapshot::{self, MigrationReport};
use crate::sync::{PlanStore, SyncStats, SyncStatus, Synchronizer};

pub struct Session {
    root: Option<PathBuf>,
    config: ProjectConfig,
    plan: Arc<Plan>,
    requirements: Arc<Requirements>,
    selection: Selection,
    report: MigrationReport,
    sync: Option<Synchronizer>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("root", &self.root)
            .field("courses", &self.plan.courses().len())
            .field("semesters", &self.plan.semesters().len())
            .field("selected", &self.selection.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create `.slate/` under `root` (config and store) and open it.
    /// Existing files are left as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, config, or store cannot be created.
    pub fn init(root: &Path) -> Result<Self> {
        let dir = config::slate_dir(root);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create {}", dir.display()))?;

        let config_path = config::config_path(root);
        if !config_path.exists() {
            let rendered = config::render_project_config(&ProjectConfig::default())
                .context("render default config")?;
            std::fs::write(&config_path, rendered)
                .with_context(|| format!("write {}", config_path.display()))?;
            info!(path = %config_path.display(), "wrote default config");
        }

        Self::open(root)
    }

    /// Open the plan stored under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SlateError::NotInitialized`] if `root` has no `.slate/`
    /// directory, a config error if the config is malformed, or a store
    /// error if loading fails.
    pub fn open(root: &Path) -> Result<Self> {
        if !config::slate_dir(root).is_dir() {
            return Err(SlateError::NotInitialized {
                root: root.to_path_buf(),
            }
            .into());
        }
        let config = config::load_project_config(root).map_err(SlateError::from)?;
        let store = SqliteStore::open(&config::store_path(root))?;
        let mut session = Self::with_store(store, config)?;
        session.root = Some(root.to_path_buf());
        Ok(session)
    }

    /// Load from `store`, run the load migration, and start a synchronizer
    /// writing back to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the synchronizer
    /// thread cannot start.
    pub fn with_store<S>(mut store: S, config: ProjectConfig) -> Result<Self>
    where
        S: PlanStore + 'static,
    {
        let stored = store.load_plan().context("load plan")?;
        let groups = store.load_requirements().context("load requirement groups")?;

        let (mut plan, mut report) = snapshot::migrate(stored);
        let requirements = snapshot::migrate_requirements(groups, &mut report);
        report.log();

        let mut seeded = 0;
        if plan.courses().is_empty() && config.plan.seed_catalog {
            for course in catalog::default_catalog().context("parse built-in catalog")? {
                seeded += plan.add_course(course).affected();
            }
            info!(courses = seeded, "seeded empty pool from built-in catalog");
        }

        let sync = Synchronizer::spawn(store, config.sync.debounce())?;
        let session = Self {
            root: None,
            config,
            plan: Arc::new(plan),
            requirements: Arc::new(requirements),
            selection: Selection::new(),
            sync: Some(sync),
            report,
        };

        if seeded > 0 || !session.report.is_clean() {
            session.schedule_plan();
        }
        if session.report.defaulted_groups {
            session.schedule_requirements();
        }
        Ok(session)
    }

    /// A session with no store behind it. Mutations are never persisted.
    #[must_use]
    pub fn detached(mut plan: Plan, requirements: Requirements, config: ProjectConfig) -> Self {
        plan.ensure_mandatory();
        Self {
            root: None,
            config,
            plan: Arc::new(plan),
            requirements: Arc::new(requirements),
            selection: Selection::new(),
            report: MigrationReport::default(),
            sync: None,
        }
    }

    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The current snapshot, shareable with another thread.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Plan> {
        Arc::clone(&self.plan)
    }

    #[must_use]
    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// What the load migration changed.
    #[must_use]
    pub const fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    /// Selection is session state, not plan state, and never persisted.
    pub const fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Replace the selection with every pool course.
    pub fn select_all(&mut self) {
        let ids: Vec<CourseId> = self.plan.courses().iter().map(|c| c.id.clone()).collect();
        self.selection.select_all(ids);
    }

    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        self.sync
            .as_ref()
            .map_or(SyncStatus::Idle, Synchronizer::status)
    }

    #[must_use]
    pub fn sync_stats(&self) -> SyncStats {
        self.sync
            .as_ref()
            .map_or_else(SyncStats::default, Synchronizer::stats)
    }

    /// Apply one intent. Drop requests are resolved against the current
    /// snapshot first, so a stale drag payload cannot act on a course that
    /// has since moved.
    pub fn apply(&mut self, intent: Intent) -> Outcome {
        let intent = match intent {
            Intent::Drop(request) => match request.resolve(&self.plan, &self.selection) {
                Ok(resolved) => resolved,
                Err(reason) => {
                    debug!(intent = "drop", %reason, course = %request.course, "mutation rejected");
                    return Outcome::Unchanged(reason);
                }
            },
            other => other,
        };

        let mut next = Plan::clone(&self.plan);
        let outcome = next.apply(&intent, &self.selection);
        match outcome {
            Outcome::Applied { affected } => {
                next.ensure_mandatory();
                self.plan = Arc::new(next);
                if intent.consumes_selection() {
                    self.selection.clear();
                }
                debug!(intent = intent.name(), affected, "mutation applied");
                self.schedule_plan();
            }
            Outcome::Unchanged(reason) => {
                debug!(intent = intent.name(), %reason, "mutation rejected");
            }
        }
        outcome
    }

    /// Validate and add a new pool course.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field; the plan is not touched.
    pub fn add_course(&mut self, mut course: Course) -> Result<Outcome, ValidationError> {
        course.normalize();
        validate_course(&course, self.config.plan.max_course_credits)?;
        Ok(self.apply(Intent::AddCourse(course)))
    }

    /// Validate the fields present in `patch` and merge them into a course.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field; the plan is not touched.
    pub fn edit_course(&mut self, id: &str, mut patch: CoursePatch) -> Result<Outcome, ValidationError> {
        if let Some(code) = patch.code.as_mut() {
            validate_code(code)?;
            *code = code.trim().to_string();
        }
        if let Some(name) = patch.name.as_mut() {
            validate_name(name)?;
            *name = name.trim().to_string();
        }
        if let Some(credits) = patch.credits {
            validate_credits(credits, self.config.plan.max_course_credits)?;
        }
        Ok(self.apply(Intent::UpdateCourse {
            course: id.into(),
            patch,
        }))
    }

    /// Validate a new course and place it in `semester` in one step.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field; the plan is not touched.
    pub fn insert_new_course(
        &mut self,
        semester: &str,
        mut course: Course,
        position: Option<usize>,
    ) -> Result<Outcome, ValidationError> {
        course.normalize();
        validate_course(&course, self.config.plan.max_course_credits)?;
        Ok(self.apply(Intent::InsertNew {
            semester: SemesterId::from(semester),
            course,
            position,
        }))
    }

    pub fn add_group(&mut self, id: &str, name: &str, color: &str) -> Outcome {
        self.edit_groups("add_group", |groups| groups.add(id, name, color))
    }

    pub fn update_group(&mut self, id: &str, patch: &GroupPatch) -> Outcome {
        self.edit_groups("update_group", |groups| groups.update(id, patch))
    }

    /// Remove a group definition. Courses keep the tag; it reports under
    /// the bare id until a group with that id exists again.
    pub fn remove_group(&mut self, id: &str) -> Outcome {
        self.edit_groups("remove_group", |groups| groups.remove(id))
    }

    pub fn reorder_groups(&mut self, from: usize, to: usize) -> Outcome {
        self.edit_groups("reorder_groups", |groups| groups.reorder(from, to))
    }

    fn edit_groups(&mut self, name: &'static str, edit: impl FnOnce(&mut Requirements) -> Outcome) -> Outcome {
        let mut next = Requirements::clone(&self.requirements);
        let outcome = edit(&mut next);
        match outcome {
            Outcome::Applied { affected } => {
                self.requirements = Arc::new(next);
                debug!(intent = name, affected, "requirement groups updated");
                self.schedule_requirements();
            }
            Outcome::Unchanged(reason) => {
                debug!(intent = name, %reason, "mutation rejected");
            }
        }
        outcome
    }

    fn schedule_plan(&self) {
        if let Some(sync) = &self.sync {
            sync.schedule_plan(Arc::clone(&self.plan));
        }
    }

    fn schedule_requirements(&self) {
        if let Some(sync) = &self.sync {
            sync.schedule_requirements(Arc::clone(&self.requirements));
        }
    }

    /// Flush anything pending and stop the synchronizer.
    pub fn close(mut self) -> SyncStats {
        self.sync
            .take()
            .map_or_else(SyncStats::default, Synchronizer::close)
    }
}
