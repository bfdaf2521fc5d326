use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

use crate::error::ValidationError;

/// Upper bound on credits accepted by the edit boundary unless configured.
pub const DEFAULT_MAX_CREDITS: u32 = 20;

/// Stable, opaque identity of a catalog course.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a course created by the user, e.g. `course_3f2a...`.
    #[must_use]
    pub fn fresh() -> Self {
        Self(format!("course_{}", uuid::Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CourseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Catalog bucket a course belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "Prerequisites")]
    Prerequisite,
    #[default]
    #[serde(rename = "Major Requirements")]
    MajorRequirement,
    #[serde(rename = "Electives")]
    Elective,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Self; 4] = [
        Self::Prerequisite,
        Self::MajorRequirement,
        Self::Elective,
        Self::Other,
    ];

    /// Persisted tag for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prerequisite => "Prerequisites",
            Self::MajorRequirement => "Major Requirements",
            Self::Elective => "Electives",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}' (expected prerequisite, major, elective, or other)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prerequisites" | "prerequisite" | "prereq" => Ok(Self::Prerequisite),
            "major requirements" | "major requirement" | "major-requirement" | "major" => {
                Ok(Self::MajorRequirement)
            }
            "electives" | "elective" => Ok(Self::Elective),
            "other" => Ok(Self::Other),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// A catalog course. Semesters reference courses by [`CourseId`]; the pool
/// owns the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Category,
    /// Requirement-group ids this course counts toward.
    #[serde(default)]
    pub requirements: BTreeSet<String>,
}

impl Course {
    pub fn new(
        id: impl Into<CourseId>,
        code: impl Into<String>,
        name: impl Into<String>,
        credits: u32,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            credits,
            completed: false,
            category: Category::default(),
            requirements: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Whether this course counts toward the given requirement group.
    #[must_use]
    pub fn counts_toward(&self, group_id: &str) -> bool {
        self.requirements.contains(group_id)
    }

    /// Trim the free-text fields the way the edit boundary stores them.
    pub fn normalize(&mut self) {
        self.code = self.code.trim().to_string();
        self.name = self.name.trim().to_string();
    }
}

/// Field-level update for a course. `None` leaves the field untouched; the
/// identity is not part of the patch and can never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoursePatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub credits: Option<u32>,
    pub completed: Option<bool>,
    pub category: Option<Category>,
    pub requirements: Option<BTreeSet<String>>,
}

impl CoursePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.name.is_none()
            && self.credits.is_none()
            && self.completed.is_none()
            && self.category.is_none()
            && self.requirements.is_none()
    }

    /// Merge the patch into `course`. Returns `true` if any field changed.
    pub fn apply_to(&self, course: &mut Course) -> bool {
        let before = course.clone();
        if let Some(code) = &self.code {
            course.code.clone_from(code);
        }
        if let Some(name) = &self.name {
            course.name.clone_from(name);
        }
        if let Some(credits) = self.credits {
            course.credits = credits;
        }
        if let Some(completed) = self.completed {
            course.completed = completed;
        }
        if let Some(category) = self.category {
            course.category = category;
        }
        if let Some(requirements) = &self.requirements {
            course.requirements.clone_from(requirements);
        }
        *course != before
    }
}

pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::new("code", code, "must not be empty"));
    }
    if code.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "code",
            code,
            "must not contain control characters",
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", name, "must not be empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "name",
            name,
            "must not contain control characters",
        ));
    }
    Ok(())
}

pub fn validate_credits(credits: u32, max_credits: u32) -> Result<(), ValidationError> {
    if credits > max_credits {
        return Err(ValidationError::new(
            "credits",
            credits.to_string(),
            format!("must be between 0 and {max_credits}"),
        ));
    }
    Ok(())
}

/// Validate every user-editable field of a course.
///
/// # Errors
///
/// Returns the first field that fails validation.
pub fn validate_course(course: &Course, max_credits: u32) -> Result<(), ValidationError> {
    if course.id.as_str().trim().is_empty() {
        return Err(ValidationError::new("id", course.id.as_str(), "must not be empty"));
    }
    validate_code(&course.code)?;
    validate_name(&course.name)?;
    validate_credits(course.credits, max_credits)
}
