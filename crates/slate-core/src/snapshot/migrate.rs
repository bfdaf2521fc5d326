//! Load migration: rows to a consistent [`Plan`].
//!
//! Runs once per load, before anything observes the data. Deterministic:
//! the same rows always produce the same plan and report.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

use crate::model::course::DEFAULT_MAX_CREDITS;
use crate::model::{Category, Course, RequirementGroup, Requirements, Semester, SemesterKind};
use crate::plan::Plan;

use super::{StoredCourse, StoredPlan};

/// What the migration changed while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Courses whose category was missing or unknown.
    pub defaulted_categories: usize,
    /// Courses whose requirement list was missing or unreadable.
    pub defaulted_requirements: usize,
    /// Courses with credits outside `0..=DEFAULT_MAX_CREDITS`, clamped.
    pub clamped_credits: usize,
    /// Pool rows dropped because their id was already seen.
    pub duplicate_courses: usize,
    /// Semester rows dropped for an unknown kind or a repeated term.
    pub dropped_semesters: usize,
    /// Join rows naming an unknown course or semester.
    pub dangling_placements: usize,
    /// Join rows placing an already-placed course.
    pub duplicate_placements: usize,
    /// Program semesters synthesized because they were missing.
    pub created_semesters: usize,
    /// Requirement groups replaced by the built-in defaults.
    pub defaulted_groups: bool,
}

impl MigrationReport {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.defaulted_categories == 0
            && self.defaulted_requirements == 0
            && self.clamped_credits == 0
            && self.duplicate_courses == 0
            && self.dropped_semesters == 0
            && self.dangling_placements == 0
            && self.duplicate_placements == 0
            && self.created_semesters == 0
            && !self.defaulted_groups
    }

    /// Emit the report through tracing.
    pub fn log(&self) {
        if self.is_clean() {
            debug!("load migration: no changes");
            return;
        }
        info!(
            defaulted_categories = self.defaulted_categories,
            defaulted_requirements = self.defaulted_requirements,
            clamped_credits = self.clamped_credits,
            duplicate_courses = self.duplicate_courses,
            dropped_semesters = self.dropped_semesters,
            dangling_placements = self.dangling_placements,
            duplicate_placements = self.duplicate_placements,
            created_semesters = self.created_semesters,
            defaulted_groups = self.defaulted_groups,
            "load migration repaired stored plan"
        );
    }
}

fn migrate_course(row: StoredCourse, report: &mut MigrationReport) -> Course {
    let category = match row.category.as_deref().map(str::parse::<Category>) {
        Some(Ok(category)) => category,
        Some(Err(_)) | None => {
            report.defaulted_categories += 1;
            Category::default()
        }
    };

    let requirements = match row
        .requirements
        .as_deref()
        .map(serde_json::from_str::<Vec<String>>)
    {
        Some(Ok(list)) => list.into_iter().collect(),
        Some(Err(_)) | None => {
            report.defaulted_requirements += 1;
            BTreeSet::new()
        }
    };

    let credits = match u32::try_from(row.credits) {
        Ok(credits) if credits <= DEFAULT_MAX_CREDITS => credits,
        _ => {
            report.clamped_credits += 1;
            if row.credits < 0 { 0 } else { DEFAULT_MAX_CREDITS }
        }
    };

    Course {
        id: row.id.into(),
        code: row.code,
        name: row.name,
        credits,
        completed: row.completed,
        category,
        requirements,
    }
}

/// Rebuild a plan from stored rows.
///
/// Pool order follows `pool_index`. Semesters are sorted before placements
/// are applied so that, when one course is placed twice, the earliest
/// semester keeps it. Mandatory semesters are synthesized last.
#[must_use]
pub fn migrate(stored: StoredPlan) -> (Plan, MigrationReport) {
    let mut report = MigrationReport::default();

    let mut rows = stored.courses;
    rows.sort_by_key(|row| row.pool_index);
    let mut seen_courses = HashSet::new();
    let mut courses = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen_courses.insert(row.id.clone()) {
            report.duplicate_courses += 1;
            continue;
        }
        courses.push(migrate_course(row, &mut report));
    }

    let mut terms = HashSet::new();
    let mut semester_ids = HashSet::new();
    let mut semesters = Vec::with_capacity(stored.semesters.len());
    for row in stored.semesters {
        let Ok(kind) = row.kind.parse::<SemesterKind>() else {
            report.dropped_semesters += 1;
            continue;
        };
        if !terms.insert((kind, row.year)) || !semester_ids.insert(row.id.clone()) {
            report.dropped_semesters += 1;
            continue;
        }
        let mut semester = Semester::new(row.id, kind, row.year);
        semester.name = row.name;
        semesters.push(semester);
    }
    semesters.sort_by_key(Semester::sort_key);

    let rank: HashMap<&str, usize> = semesters
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let mut placements: Vec<(usize, i64, String)> = Vec::with_capacity(stored.placements.len());
    for row in stored.placements {
        match rank.get(row.semester_id.as_str()) {
            Some(&index) if seen_courses.contains(&row.course_id) => {
                placements.push((index, row.order_index, row.course_id));
            }
            _ => report.dangling_placements += 1,
        }
    }
    drop(rank);
    placements.sort();

    let mut placed = HashSet::new();
    for (index, _, course_id) in placements {
        if !placed.insert(course_id.clone()) {
            report.duplicate_placements += 1;
            continue;
        }
        semesters[index].courses.push(course_id.into());
    }

    let mut plan = Plan::from_parts(courses, semesters);
    report.created_semesters = plan.ensure_mandatory();
    (plan, report)
}

/// Loaded requirement groups, with defaults when the stored list is empty.
#[must_use]
pub fn migrate_requirements(stored: Vec<RequirementGroup>, report: &mut MigrationReport) -> Requirements {
    report.defaulted_groups = stored.is_empty();
    Requirements::from_loaded(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{StoredPlacement, StoredSemester};

    fn course_row(id: &str, pool_index: i64) -> StoredCourse {
        StoredCourse {
            id: id.to_string(),
            code: id.to_uppercase(),
            name: format!("Course {id}"),
            credits: 3,
            completed: false,
            category: Some("Electives".to_string()),
            requirements: Some(r#"["DSCT"]"#.to_string()),
            pool_index,
        }
    }

    fn semester_row(id: &str, kind: &str, year: i32) -> StoredSemester {
        StoredSemester {
            id: id.to_string(),
            name: format!("{kind} {year}"),
            kind: kind.to_string(),
            year,
        }
    }

    fn placement(semester: &str, course: &str, order_index: i64) -> StoredPlacement {
        StoredPlacement {
            semester_id: semester.to_string(),
            course_id: course.to_string(),
            order_index,
        }
    }

    #[test]
    fn empty_store_yields_program_semesters() {
        let (plan, report) = migrate(StoredPlan::default());
        assert_eq!(plan.semesters().len(), 8);
        assert_eq!(report.created_semesters, 8);
        assert!(plan.check_invariants().is_empty());
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let mut row = course_row("a", 0);
        row.category = None;
        row.requirements = None;
        let mut odd = course_row("b", 1);
        odd.category = Some("Lab".to_string());
        odd.credits = -2;

        let (plan, report) = migrate(StoredPlan {
            courses: vec![row, odd],
            ..StoredPlan::default()
        });

        let a = plan.course("a").expect("a loaded");
        assert_eq!(a.category, Category::MajorRequirement);
        assert!(a.requirements.is_empty());
        assert_eq!(plan.course("b").map(|c| c.credits), Some(0));
        assert_eq!(report.defaulted_categories, 2);
        assert_eq!(report.defaulted_requirements, 1);
        assert_eq!(report.clamped_credits, 1);
    }

    #[test]
    fn placements_follow_order_index_and_pool_follows_pool_index() {
        let (plan, report) = migrate(StoredPlan {
            courses: vec![course_row("b", 1), course_row("a", 0), course_row("c", 2)],
            semesters: vec![semester_row("s", "Summer", 2025)],
            placements: vec![placement("s", "c", 1), placement("s", "a", 0), placement("s", "b", 7)],
        });
        let pool: Vec<&str> = plan.courses().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(pool, vec!["a", "b", "c"]);
        let seq: Vec<String> = plan
            .semester("s")
            .expect("semester loaded")
            .courses
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(seq, vec!["a", "c", "b"]);
        assert_eq!(report.created_semesters, 8);
    }

    #[test]
    fn dangling_and_duplicate_placements_are_dropped() {
        let (plan, report) = migrate(StoredPlan {
            courses: vec![course_row("a", 0)],
            semesters: vec![
                semester_row("late", "Fall", 2026),
                semester_row("early", "Fall", 2024),
            ],
            placements: vec![
                placement("late", "a", 0),
                placement("early", "a", 0),
                placement("early", "ghost", 1),
                placement("nowhere", "a", 0),
            ],
        });
        assert_eq!(plan.semester_of("a").map(|s| s.id.as_str()), Some("early"));
        assert_eq!(report.dangling_placements, 2);
        assert_eq!(report.duplicate_placements, 1);
        assert!(plan.check_invariants().is_empty());
    }

    #[test]
    fn bad_kind_and_repeated_term_are_dropped() {
        let (plan, report) = migrate(StoredPlan {
            semesters: vec![
                semester_row("x", "Autumn", 2025),
                semester_row("y", "Summer", 2025),
                semester_row("z", "Summer", 2025),
            ],
            ..StoredPlan::default()
        });
        assert_eq!(report.dropped_semesters, 2);
        assert!(plan.semester("y").is_some());
        assert!(plan.semester("z").is_none());
    }

    #[test]
    fn oversized_credits_are_clamped_and_totals_stay_finite() {
        let mut huge = course_row("a", 0);
        huge.credits = 5_000_000_000;
        huge.completed = true;
        let mut big = course_row("b", 1);
        big.credits = 25;

        let (plan, report) = migrate(StoredPlan {
            courses: vec![huge, big, course_row("c", 2)],
            ..StoredPlan::default()
        });

        assert_eq!(report.clamped_credits, 2);
        assert_eq!(plan.course("a").map(|c| c.credits), Some(DEFAULT_MAX_CREDITS));
        assert_eq!(plan.course("b").map(|c| c.credits), Some(DEFAULT_MAX_CREDITS));
        let totals = crate::plan::aggregate::plan_totals(&plan, &Requirements::default());
        assert_eq!(totals.credits.total, 2 * DEFAULT_MAX_CREDITS + 3);
        assert_eq!(totals.credits.completed, DEFAULT_MAX_CREDITS);
    }

    #[test]
    fn stored_semester_holding_a_program_id_keeps_it() {
        let (plan, report) = migrate(StoredPlan {
            courses: vec![course_row("a", 0)],
            semesters: vec![semester_row("semester_2024_fall", "Summer", 2030)],
            placements: vec![placement("semester_2024_fall", "a", 0)],
        });

        assert!(plan.check_invariants().is_empty());
        assert_eq!(report.created_semesters, 8);
        let stored = plan.semester("semester_2024_fall").expect("stored row kept");
        assert_eq!((stored.kind, stored.year), (SemesterKind::Summer, 2030));
        assert_eq!(plan.semester_of("a").map(|s| s.id.as_str()), Some("semester_2024_fall"));
        let fall = plan
            .find_term(SemesterKind::Fall, 2024)
            .expect("program fall 2024");
        assert_ne!(fall.id, stored.id);
    }

    #[test]
    fn empty_groups_are_defaulted_and_reported() {
        let mut report = MigrationReport::default();
        let reqs = migrate_requirements(Vec::new(), &mut report);
        assert!(report.defaulted_groups);
        assert_eq!(reqs.groups().len(), 3);
        assert!(!report.is_clean());
    }
}
