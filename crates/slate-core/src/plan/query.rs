//! Read-only queries over a plan: library filtering and placed-course search.

use std::collections::BTreeSet;

use crate::model::{Category, Course, Requirements, Semester};

use super::Plan;

/// Requirement filter value matching courses with no requirement tags.
pub const NO_REQUIREMENT: &str = "OTHER";
/// Semester filter value matching courses that are not placed anywhere.
pub const UNPLACED: &str = "CREDIT_ONLY";

/// Library filter. Empty sets do not filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFilter {
    /// Case-insensitive substring of code or name.
    pub text: Option<String>,
    pub show_completed: bool,
    pub show_incomplete: bool,
    pub categories: BTreeSet<Category>,
    /// Requirement-group ids; [`NO_REQUIREMENT`] matches untagged courses.
    pub requirements: BTreeSet<String>,
    /// Semester ids; [`UNPLACED`] matches courses outside every semester.
    pub semesters: BTreeSet<String>,
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            text: None,
            show_completed: true,
            show_incomplete: true,
            categories: BTreeSet::new(),
            requirements: BTreeSet::new(),
            semesters: BTreeSet::new(),
        }
    }
}

fn matches_text(course: &Course, needle: &str) -> bool {
    course.code.to_lowercase().contains(needle) || course.name.to_lowercase().contains(needle)
}

impl CourseFilter {
    #[must_use]
    pub fn matches(&self, plan: &Plan, course: &Course) -> bool {
        let text = self.text.as_deref().map(str::trim).unwrap_or_default();
        if !text.is_empty() && !matches_text(course, &text.to_lowercase()) {
            return false;
        }

        if (course.completed && !self.show_completed) || (!course.completed && !self.show_incomplete)
        {
            return false;
        }

        if !self.categories.is_empty() && !self.categories.contains(&course.category) {
            return false;
        }

        if !self.requirements.is_empty() {
            let untagged_ok =
                self.requirements.contains(NO_REQUIREMENT) && course.requirements.is_empty();
            let tagged_ok = self
                .requirements
                .iter()
                .any(|req| req != NO_REQUIREMENT && course.counts_toward(req));
            if !untagged_ok && !tagged_ok {
                return false;
            }
        }

        if !self.semesters.is_empty() {
            let ok = match plan.semester_of(course.id.as_str()) {
                Some(semester) => self.semesters.contains(semester.id.as_str()),
                None => self.semesters.contains(UNPLACED),
            };
            if !ok {
                return false;
            }
        }

        true
    }

    /// Pool courses passing the filter, in pool order.
    #[must_use]
    pub fn apply<'a>(&self, plan: &'a Plan) -> Vec<&'a Course> {
        plan.courses()
            .iter()
            .filter(|course| self.matches(plan, course))
            .collect()
    }
}

/// Sort for library display: courses tagged with an earlier requirement
/// group first, untagged last, then by code.
pub fn sort_for_library(courses: &mut [&Course], requirements: &Requirements) {
    let priority = |course: &Course| {
        requirements
            .groups()
            .iter()
            .position(|g| course.counts_toward(&g.id))
            .unwrap_or(requirements.groups().len())
    };
    courses.sort_by(|a, b| {
        priority(*a)
            .cmp(&priority(*b))
            .then_with(|| a.code.cmp(&b.code))
    });
}

/// Placed courses whose code or name contains `text`, case-insensitively,
/// in semester order.
#[must_use]
pub fn search_placed<'a>(plan: &'a Plan, text: &str) -> Vec<(&'a Semester, &'a Course)> {
    let needle = text.to_lowercase();
    plan.semesters()
        .iter()
        .flat_map(|semester| {
            plan.semester_courses(semester)
                .map(move |course| (semester, course))
        })
        .filter(|(_, course)| matches_text(course, &needle))
        .collect()
}
