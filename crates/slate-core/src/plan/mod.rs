//! The collection state engine.
//!
//! A [`Plan`] is the course pool plus the ordered semesters that reference
//! pool courses by id. Every mutation is a method returning an [`Outcome`];
//! a rejected mutation leaves the plan exactly as it was.
//!
//! Invariants held between calls:
//!
//! - a course id appears in at most one semester sequence;
//! - every placed id names a course in the pool;
//! - semester ids are unique, and so are (kind, year) pairs.
//!
//! Mandatory semesters and sort order are restored by
//! [`Plan::ensure_mandatory`] and [`Plan::sort`], which the session runs
//! after every applied mutation and after load.

use std::collections::HashSet;

use crate::model::{Course, CourseId, Semester, SemesterId};
pub use crate::outcome::{Outcome, Rejection};

pub mod aggregate;
pub mod intent;
pub mod placement;
pub mod pool;
pub mod query;
pub mod selection;
pub mod semesters;

pub use aggregate::{CreditTally, GraduationProgress, Totals};
pub use intent::{DropRequest, DropSource, DropTarget, Intent};
pub use query::CourseFilter;
pub use selection::Selection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    courses: Vec<Course>,
    semesters: Vec<Semester>,
}

impl Plan {
    /// Assemble a plan from already-migrated parts. The caller is
    /// responsible for the placement invariants (see
    /// [`crate::snapshot::migrate`]).
    #[must_use]
    pub const fn from_parts(courses: Vec<Course>, semesters: Vec<Semester>) -> Self {
        Self { courses, semesters }
    }

    /// Pool courses in pool order.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Semesters in display order.
    #[must_use]
    pub fn semesters(&self) -> &[Semester] {
        &self.semesters
    }

    #[must_use]
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id.as_str() == id)
    }

    #[must_use]
    pub fn semester(&self, id: &str) -> Option<&Semester> {
        self.semesters.iter().find(|s| s.id.as_str() == id)
    }

    /// The semester holding `course`, if it is placed.
    #[must_use]
    pub fn semester_of(&self, course: &str) -> Option<&Semester> {
        self.semesters.iter().find(|s| s.contains(course))
    }

    #[must_use]
    pub fn is_placed(&self, course: &str) -> bool {
        self.semester_of(course).is_some()
    }

    /// Ids of every placed course.
    #[must_use]
    pub fn placed_ids(&self) -> HashSet<&CourseId> {
        self.semesters.iter().flat_map(|s| s.courses.iter()).collect()
    }

    /// Courses of one semester, resolved against the pool, in sequence order.
    pub fn semester_courses<'a>(&'a self, semester: &'a Semester) -> impl Iterator<Item = &'a Course> {
        semester.courses.iter().filter_map(|id| self.course(id.as_str()))
    }

    pub(crate) fn semester_index(&self, id: &str) -> Option<usize> {
        self.semesters.iter().position(|s| s.id.as_str() == id)
    }

    pub(crate) fn course_index(&self, id: &str) -> Option<usize> {
        self.courses.iter().position(|c| c.id.as_str() == id)
    }

    pub(crate) fn semester_mut(&mut self, id: &str) -> Option<&mut Semester> {
        self.semesters.iter_mut().find(|s| s.id.as_str() == id)
    }

    /// Describe every broken invariant. Empty means the plan is consistent.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut pool_ids = HashSet::new();
        for course in &self.courses {
            if !pool_ids.insert(course.id.as_str()) {
                errors.push(format!("duplicate course id '{}' in pool", course.id));
            }
        }

        let mut semester_ids: HashSet<&SemesterId> = HashSet::new();
        let mut terms = HashSet::new();
        let mut placed: HashSet<&str> = HashSet::new();
        for semester in &self.semesters {
            if !semester_ids.insert(&semester.id) {
                errors.push(format!("duplicate semester id '{}'", semester.id));
            }
            if !terms.insert((semester.kind, semester.year)) {
                errors.push(format!(
                    "{}: duplicate term {} {}",
                    semester.id, semester.kind, semester.year
                ));
            }
            for course in &semester.courses {
                if !placed.insert(course.as_str()) {
                    errors.push(format!(
                        "{}: course '{course}' is placed more than once",
                        semester.id
                    ));
                }
                if !pool_ids.contains(course.as_str()) {
                    errors.push(format!(
                        "{}: course '{course}' is not in the pool",
                        semester.id
                    ));
                }
            }
        }

        for (kind, year) in crate::model::semester::MANDATORY_SEMESTERS {
            if !terms.contains(&(kind, year)) {
                errors.push(format!("missing mandatory semester {kind} {year}"));
            }
        }

        let sorted = self
            .semesters
            .windows(2)
            .all(|pair| pair[0].sort_key() <= pair[1].sort_key());
        if !sorted {
            errors.push("semesters are not in academic order".to_string());
        }

        errors
    }
}
