//! Result type for plan mutations.
//!
//! A mutation the invariants forbid is not an error: the plan is left exactly
//! as it was and the caller gets [`Outcome::Unchanged`] with the reason.

use serde::Serialize;
use std::fmt;

/// Why a mutation left the plan untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    UnknownSemester,
    UnknownCourse,
    UnknownGroup,
    AlreadyPlaced,
    NotInSource,
    SameSemester,
    IndexOutOfBounds,
    NoOp,
    MandatorySemester,
    DuplicateSemester,
    DuplicateCourse,
    DuplicateGroup,
    NothingSelected,
    EmptyName,
}

impl Rejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownSemester => "unknown_semester",
            Self::UnknownCourse => "unknown_course",
            Self::UnknownGroup => "unknown_group",
            Self::AlreadyPlaced => "already_placed",
            Self::NotInSource => "not_in_source",
            Self::SameSemester => "same_semester",
            Self::IndexOutOfBounds => "index_out_of_bounds",
            Self::NoOp => "no_op",
            Self::MandatorySemester => "mandatory_semester",
            Self::DuplicateSemester => "duplicate_semester",
            Self::DuplicateCourse => "duplicate_course",
            Self::DuplicateGroup => "duplicate_group",
            Self::NothingSelected => "nothing_selected",
            Self::EmptyName => "empty_name",
        }
    }

    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::UnknownSemester => "no semester with that id",
            Self::UnknownCourse => "no course with that id",
            Self::UnknownGroup => "no requirement group with that id",
            Self::AlreadyPlaced => "course is already placed in a semester",
            Self::NotInSource => "course is not in the source semester",
            Self::SameSemester => "source and target are the same semester",
            Self::IndexOutOfBounds => "index is out of bounds",
            Self::NoOp => "nothing to change",
            Self::MandatorySemester => "program semesters cannot be removed",
            Self::DuplicateSemester => "a semester of that kind and year already exists",
            Self::DuplicateCourse => "a course with that id already exists",
            Self::DuplicateGroup => "a requirement group with that id already exists",
            Self::NothingSelected => "no eligible course is selected",
            Self::EmptyName => "name must not be empty",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The plan changed; `affected` counts the courses or semesters touched.
    Applied { affected: usize },
    Unchanged(Rejection),
}

impl Outcome {
    pub const fn applied(affected: usize) -> Self {
        Self::Applied { affected }
    }

    /// `Applied` when `affected > 0`, otherwise `Unchanged(reason)`.
    pub const fn counted(affected: usize, reason: Rejection) -> Self {
        if affected == 0 {
            Self::Unchanged(reason)
        } else {
            Self::Applied { affected }
        }
    }

    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    #[must_use]
    pub const fn affected(self) -> usize {
        match self {
            Self::Applied { affected } => affected,
            Self::Unchanged(_) => 0,
        }
    }

    #[must_use]
    pub const fn rejection(self) -> Option<Rejection> {
        match self {
            Self::Applied { .. } => None,
            Self::Unchanged(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { affected } => write!(f, "applied ({affected} affected)"),
            Self::Unchanged(reason) => write!(f, "unchanged: {reason}"),
        }
    }
}
