use crate::output::CliError;
use slate_core::model::{Category, SemesterKind};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;
pub const MAX_GROUP_ID_LEN: usize = 16;

/// A command-line argument that failed validation before reaching the plan.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            self.suggestion.clone(),
            self.code,
        )
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} '{}': {}", self.field, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

pub fn parse_kind(s: &str) -> Result<SemesterKind, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "kind",
            s,
            "must be one of fall, winter, spring, summer",
            "use a semester kind like `fall` or `Spring`",
            "invalid_kind",
        )
    })
}

pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::new(
            "year",
            year.to_string(),
            format!("must be between {MIN_YEAR} and {MAX_YEAR}"),
            "use a four-digit calendar year",
            "invalid_year",
        ));
    }
    Ok(())
}

pub fn parse_category(s: &str) -> Result<Category, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "category",
            s,
            "must be one of prerequisite, major, elective, other",
            "use e.g. `--category elective`",
            "invalid_category",
        )
    })
}

/// Colors are stored as `#rrggbb`.
pub fn validate_color(s: &str) -> Result<(), ValidationError> {
    let ok = s
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !ok {
        return Err(ValidationError::new(
            "color",
            s,
            "must be a #rrggbb hex color",
            "use a color like #2563eb",
            "invalid_color",
        ));
    }
    Ok(())
}

pub fn validate_group_id(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::new(
            "group_id",
            s,
            "must not be empty",
            "use a short id like DSCT",
            "invalid_group_id",
        ));
    }
    if s.chars().count() > MAX_GROUP_ID_LEN {
        return Err(ValidationError::new(
            "group_id",
            s,
            format!("must be <= {MAX_GROUP_ID_LEN} characters"),
            "shorten the group id",
            "invalid_group_id",
        ));
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ValidationError::new(
            "group_id",
            s,
            "must contain only letters, digits, '_' or '-'",
            "use a short id like DSCT",
            "invalid_group_id",
        ));
    }
    Ok(())
}
