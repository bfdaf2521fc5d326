//! Relational shape of a persisted plan.
//!
//! A [`StoredPlan`] mirrors the store's three tables one row per struct.
//! [`StoredPlan::capture`] flattens an in-memory plan; [`migrate::migrate`]
//! rebuilds a plan from rows, filling defaults and repairing what it can.

use serde::{Deserialize, Serialize};

use crate::model::Course;
use crate::plan::Plan;

pub mod migrate;

pub use migrate::{MigrationReport, migrate, migrate_requirements};

/// A `courses` row. Optional columns are raw so the load migration decides
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCourse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub credits: i64,
    pub completed: bool,
    pub category: Option<String>,
    /// JSON array of requirement-group ids.
    pub requirements: Option<String>,
    pub pool_index: i64,
}

/// A `semesters` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSemester {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub year: i32,
}

/// A `semester_courses` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlacement {
    pub semester_id: String,
    pub course_id: String,
    pub order_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub courses: Vec<StoredCourse>,
    pub semesters: Vec<StoredSemester>,
    pub placements: Vec<StoredPlacement>,
}

impl StoredCourse {
    #[must_use]
    pub fn from_course(course: &Course, pool_index: usize) -> Self {
        let requirements: Vec<&str> = course.requirements.iter().map(String::as_str).collect();
        Self {
            id: course.id.to_string(),
            code: course.code.clone(),
            name: course.name.clone(),
            credits: i64::from(course.credits),
            completed: course.completed,
            category: Some(course.category.as_str().to_string()),
            requirements: serde_json::to_string(&requirements).ok(),
            pool_index: i64::try_from(pool_index).unwrap_or(i64::MAX),
        }
    }
}

impl StoredPlan {
    /// Flatten `plan` into rows. Each placement's `order_index` is its
    /// position in the semester sequence at capture time.
    #[must_use]
    pub fn capture(plan: &Plan) -> Self {
        let courses = plan
            .courses()
            .iter()
            .enumerate()
            .map(|(index, course)| StoredCourse::from_course(course, index))
            .collect();

        let semesters = plan
            .semesters()
            .iter()
            .map(|s| StoredSemester {
                id: s.id.to_string(),
                name: s.name.clone(),
                kind: s.kind.as_str().to_string(),
                year: s.year,
            })
            .collect();

        let placements = plan
            .semesters()
            .iter()
            .flat_map(|s| {
                (0i64..).zip(s.courses.iter()).map(move |(order_index, course)| StoredPlacement {
                    semester_id: s.id.to_string(),
                    course_id: course.to_string(),
                    order_index,
                })
            })
            .collect();

        Self {
            courses,
            semesters,
            placements,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.semesters.is_empty() && self.placements.is_empty()
    }
}
