//! Plain data types: courses, semesters, and requirement groups.

pub mod course;
pub mod requirement;
pub mod semester;

pub use course::{Category, Course, CourseId, CoursePatch};
pub use requirement::{GroupPatch, RequirementGroup, Requirements};
pub use semester::{Semester, SemesterId, SemesterKind};
