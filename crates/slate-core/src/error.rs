use std::fmt;

/// Machine-readable error codes shared by the engine and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    CourseNotFound,
    SemesterNotFound,
    InvalidField,
    DuplicateSemester,
    MandatorySemester,
    CorruptStore,
    FlushFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::CourseNotFound => "E2001",
            Self::SemesterNotFound => "E2002",
            Self::InvalidField => "E2003",
            Self::DuplicateSemester => "E2004",
            Self::MandatorySemester => "E2005",
            Self::CorruptStore => "E3001",
            Self::FlushFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Plan not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::CourseNotFound => "Course not found",
            Self::SemesterNotFound => "Semester not found",
            Self::InvalidField => "Invalid course field",
            Self::DuplicateSemester => "Semester already exists",
            Self::MandatorySemester => "Semester is mandatory",
            Self::CorruptStore => "Corrupt SQLite store",
            Self::FlushFailed => "Plan flush failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `slate init` to create a plan in this directory."),
            Self::ConfigParseError => Some("Fix syntax in .slate/config.toml and retry."),
            Self::CourseNotFound => Some("Use `slate course list` to see course ids."),
            Self::SemesterNotFound => Some("Use `slate semester list` to see semester ids."),
            Self::InvalidField => {
                Some("Code and name must be non-empty; credits must be within the configured range.")
            }
            Self::DuplicateSemester => Some("Each (kind, year) pair can exist only once."),
            Self::MandatorySemester => Some("Program semesters cannot be removed."),
            Self::CorruptStore => Some("Move .slate/slate.db aside and run `slate init`."),
            Self::FlushFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A direct field edit that failed validation at the edit boundary.
///
/// Returned synchronously; the plan is never mutated when one of these is
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}': {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Error code associated with every validation failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidField
    }
}

/// Errors surfaced by [`crate::session::Session`] and the CLI on top of it.
///
/// Rejected mutations are not errors; they come back as an
/// [`crate::outcome::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum SlateError {
    #[error("no plan found under {}", root.display())]
    NotInitialized { root: std::path::PathBuf },

    #[error("course '{id}' not found")]
    CourseNotFound { id: String },

    #[error("semester '{id}' not found")]
    SemesterNotFound { id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl SlateError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized { .. } => ErrorCode::NotInitialized,
            Self::CourseNotFound { .. } => ErrorCode::CourseNotFound,
            Self::SemesterNotFound { .. } => ErrorCode::SemesterNotFound,
            Self::Validation(err) => err.code(),
            Self::Config(err) => err.code(),
        }
    }

    /// Remediation text for the error, or the generic code message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, SlateError, ValidationError};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::NotInitialized,
            ErrorCode::ConfigParseError,
            ErrorCode::CourseNotFound,
            ErrorCode::SemesterNotFound,
            ErrorCode::InvalidField,
            ErrorCode::DuplicateSemester,
            ErrorCode::MandatorySemester,
            ErrorCode::CorruptStore,
            ErrorCode::FlushFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::MandatorySemester.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn validation_error_display_names_field_and_reason() {
        let err = ValidationError::new("code", "  ", "must not be empty");
        assert_eq!(err.to_string(), "invalid code '  ': must not be empty");
        assert_eq!(err.code(), ErrorCode::InvalidField);
    }

    #[test]
    fn slate_error_maps_to_codes() {
        let err = SlateError::CourseNotFound { id: "x".into() };
        assert_eq!(err.code().code(), "E2001");
        assert!(err.suggestion().contains("slate course list"));

        let err = SlateError::from(ValidationError::new("name", "", "must not be empty"));
        assert_eq!(err.code(), ErrorCode::InvalidField);
        assert_eq!(err.to_string(), "invalid name '': must not be empty");
    }
}
