use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::{fmt, str::FromStr};

use super::course::CourseId;

/// Semester type tag. Drives ordering within an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemesterKind {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl SemesterKind {
    pub const ALL: [Self; 4] = [Self::Fall, Self::Winter, Self::Spring, Self::Summer];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
        }
    }

    /// Tie-break rank inside one academic year.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Fall => 1,
            Self::Spring => 2,
            Self::Winter => 3,
            Self::Summer => 4,
        }
    }

    /// Academic year a semester of this kind in calendar `year` belongs to.
    ///
    /// An academic year starts in Fall, so Spring of 2025 sorts with Fall of
    /// 2024.
    #[must_use]
    pub const fn academic_year(self, year: i32) -> i32 {
        match self {
            Self::Spring => year - 1,
            Self::Fall | Self::Winter | Self::Summer => year,
        }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::Fall => "fall",
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
        }
    }
}

impl fmt::Display for SemesterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown semester kind '{0}' (expected fall, winter, spring, or summer)")]
pub struct ParseSemesterKindError(pub String);

impl FromStr for SemesterKind {
    type Err = ParseSemesterKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSemesterKindError(s.to_string()))
    }
}

/// The program semesters that must always exist.
pub const MANDATORY_SEMESTERS: [(SemesterKind, i32); 8] = [
    (SemesterKind::Fall, 2024),
    (SemesterKind::Spring, 2025),
    (SemesterKind::Fall, 2025),
    (SemesterKind::Spring, 2026),
    (SemesterKind::Fall, 2026),
    (SemesterKind::Spring, 2027),
    (SemesterKind::Fall, 2027),
    (SemesterKind::Spring, 2028),
];

/// Whether the (kind, year) pair is one of the program semesters.
#[must_use]
pub fn is_mandatory(kind: SemesterKind, year: i32) -> bool {
    MANDATORY_SEMESTERS.contains(&(kind, year))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemesterId(String);

impl SemesterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id of a program semester, e.g. `semester_2024_fall`.
    #[must_use]
    pub fn mandatory(kind: SemesterKind, year: i32) -> Self {
        Self(format!("semester_{year}_{}", kind.slug()))
    }

    /// Fresh id for a user-created semester.
    #[must_use]
    pub fn fresh(kind: SemesterKind, year: i32) -> Self {
        Self(format!(
            "semester_{year}_{}_{}",
            kind.slug(),
            uuid::Uuid::new_v4().simple()
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SemesterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SemesterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SemesterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A named, typed, year-scoped ordered list of course ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub name: String,
    pub kind: SemesterKind,
    pub year: i32,
    #[serde(default)]
    pub courses: Vec<CourseId>,
}

impl Semester {
    /// An empty semester with the default `"{kind} {year}"` name.
    pub fn new(id: impl Into<SemesterId>, kind: SemesterKind, year: i32) -> Self {
        Self {
            id: id.into(),
            name: default_name(kind, year),
            kind,
            year,
            courses: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        is_mandatory(self.kind, self.year)
    }

    /// Sort key: academic year, then kind rank.
    #[must_use]
    pub const fn sort_key(&self) -> (i32, u8) {
        (self.kind.academic_year(self.year), self.kind.rank())
    }

    #[must_use]
    pub fn position(&self, course: &str) -> Option<usize> {
        self.courses.iter().position(|c| c.as_str() == course)
    }

    #[must_use]
    pub fn contains(&self, course: &str) -> bool {
        self.position(course).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[must_use]
pub fn default_name(kind: SemesterKind, year: i32) -> String {
    format!("{kind} {year}")
}
