//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or
//! stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `SLATE_FORMAT`, then `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use slate_core::error::SlateError;
use slate_core::plan::{Outcome, Rejection};
use slate_core::sync::SyncStats;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, aligned columns).
    Pretty,
    /// Token-efficient plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn is_pretty(self) -> bool {
        matches!(self, Self::Pretty)
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some(Self::Pretty),
            "text" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
///
/// `format_flag`: explicit `--format` value if provided.
/// `json_flag`: `--json` alias.
/// `format_env`: `SLATE_FORMAT` or `FORMAT` if set.
/// `user_default`: `output` from the user config file.
/// `is_tty`: true if stdout is a TTY.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    user_default: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }
    if let Some(mode) = format_env.and_then(OutputMode::parse) {
        return mode;
    }
    if let Some(mode) = user_default.and_then(OutputMode::parse) {
        return mode;
    }
    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from flags, environment, user config, and TTY.
///
/// A malformed user config is ignored here; commands that need config
/// report it themselves.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    project_root: &Path,
) -> OutputMode {
    if format_flag.is_none() && !json_flag {
        if let Ok(effective) = slate_core::config::resolve_config(project_root, false) {
            if let Some(mode) = OutputMode::parse(&effective.resolved_output) {
                return mode;
            }
        }
    }
    let env_val = std::env::var("SLATE_FORMAT")
        .or_else(|_| std::env::var("FORMAT"))
        .ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), None, is_tty)
}

/// Trait implemented by any CLI row type that can be rendered in all modes.
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a self-contained JSON object.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single text row, fields in [`Renderable::table_headers`]
    /// order.
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column headers for text mode.
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Render a list of [`Renderable`] items into `out`.
///
/// - In JSON mode, wraps items in a JSON array.
/// - In pretty/text mode, renders items sequentially.
pub fn write_list<R: Renderable>(out: &mut dyn Write, items: &[R], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = if items.is_empty() {
                &[] as &[&str]
            } else {
                R::table_headers()
            };
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("  "))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                writeln!(out)?;
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                out.write_all(&buf)?;
            }
            writeln!(out, "\n]")?;
        }
    }
    Ok(())
}

/// Render a list of [`Renderable`] items to stdout.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_list(&mut out, items, mode)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a serializable value; pretty and text share `human_fn`.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. `E2001`, `invalid_color`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }

    /// Build from any error, using the typed code when one is attached.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(slate) = err.downcast_ref::<SlateError>() {
            return Self::from(slate);
        }
        if let Some(invalid) = err.downcast_ref::<slate_core::error::ValidationError>() {
            return Self::from(&SlateError::Validation(invalid.clone()));
        }
        if let Some(invalid) = err.downcast_ref::<crate::validate::ValidationError>() {
            return invalid.to_cli_error();
        }
        Self::new(format!("{err:#}"))
    }
}

impl From<&SlateError> for CliError {
    fn from(err: &SlateError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: Some(err.suggestion()),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
            Ok(())
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)?;
    Ok(())
}

/// Result of one mutating command.
#[derive(Debug, Serialize)]
pub struct MutationReport {
    pub command: &'static str,
    /// Id of the course or semester the command created, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub applied: bool,
    pub affected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
    /// Whether every flush triggered by the command was written.
    pub flushed: bool,
}

impl MutationReport {
    #[must_use]
    pub fn new(command: &'static str, outcome: Outcome, stats: SyncStats) -> Self {
        Self {
            command,
            id: None,
            applied: outcome.is_applied(),
            affected: outcome.affected(),
            reason: outcome.rejection(),
            flushed: stats.failures == 0,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn write_human(&self, w: &mut dyn Write) -> io::Result<()> {
        match (self.reason, &self.id) {
            (None, Some(id)) => {
                writeln!(w, "✓ {}: applied ({} affected) {id}", self.command, self.affected)?;
            }
            (None, None) => writeln!(w, "✓ {}: applied ({} affected)", self.command, self.affected)?,
            (Some(reason), _) => {
                writeln!(w, "· {}: unchanged ({})", self.command, reason.describe())?;
            }
        }
        if !self.flushed {
            writeln!(w, "! changes could not be written to the store; see logs")?;
        }
        Ok(())
    }
}

/// Render the outcome of a mutating command to stdout.
pub fn render_outcome(mode: OutputMode, report: &MutationReport) -> anyhow::Result<()> {
    render(mode, report, |r, w| r.write_human(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_predicates() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Pretty.is_json());
        assert!(OutputMode::Pretty.is_pretty());
        assert!(!OutputMode::Text.is_pretty());
    }

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode =
            resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), None, true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), None, true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_env_beats_user_default() {
        let mode = resolve_output_mode_inner(None, false, Some("TEXT"), Some("json"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_user_default_beats_tty() {
        let mode = resolve_output_mode_inner(None, false, None, Some("json"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_unknown_env_falls_through_to_tty() {
        let tty = resolve_output_mode_inner(None, false, Some("fancy"), None, true);
        assert_eq!(tty, OutputMode::Pretty);
        let pipe = resolve_output_mode_inner(None, false, Some("fancy"), None, false);
        assert_eq!(pipe, OutputMode::Text);
    }

    struct Row {
        name: &'static str,
        credits: u32,
    }

    impl Renderable for Row {
        fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{} ({} cr)", self.name, self.credits)
        }

        fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
            write!(w, "{{\"name\":\"{}\",\"credits\":{}}}", self.name, self.credits)
        }

        fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{}  {}", self.name, self.credits)
        }

        fn table_headers() -> &'static [&'static str] {
            &["NAME", "CREDITS"]
        }
    }

    fn list_as(mode: OutputMode, rows: &[Row]) -> String {
        let mut buf = Vec::new();
        write_list(&mut buf, rows, mode).expect("write list");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn text_list_has_header_only_when_nonempty() {
        let rows = [Row { name: "a", credits: 3 }];
        assert_eq!(list_as(OutputMode::Text, &rows), "NAME  CREDITS\na  3\n");
        assert_eq!(list_as(OutputMode::Text, &[]), "");
    }

    #[test]
    fn json_list_is_a_valid_array() {
        let rows = [Row { name: "a", credits: 3 }, Row { name: "b", credits: 4 }];
        let parsed: serde_json::Value =
            serde_json::from_str(&list_as(OutputMode::Json, &rows)).expect("valid json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
        assert_eq!(parsed[1]["credits"], 4);
    }

    #[test]
    fn error_text_includes_code_and_suggestion() {
        let err = CliError::from(&SlateError::SemesterNotFound { id: "x".into() });
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Text, &err).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error[E2002]: semester 'x' not found"));
        assert!(text.contains("suggestion: Use `slate semester list`"));
    }

    #[test]
    fn error_json_is_wrapped() {
        let err = CliError::with_details("bad color", "use #rrggbb", "invalid_color");
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Json, &err).expect("write");
        let parsed: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(parsed["error"]["error_code"], "invalid_color");
    }

    #[test]
    fn cli_error_from_validation_failure_carries_invalid_field_code() {
        let err = anyhow::Error::new(slate_core::error::ValidationError::new(
            "code",
            "",
            "must not be empty",
        ));
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2003"));
    }

    #[test]
    fn mutation_report_human_lines() {
        let applied = MutationReport::new("place", Outcome::applied(2), SyncStats::default());
        let mut buf = Vec::new();
        applied.write_human(&mut buf).expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "✓ place: applied (2 affected)\n");

        let stats = SyncStats {
            failures: 1,
            ..SyncStats::default()
        };
        let rejected = MutationReport::new("move", Outcome::Unchanged(Rejection::AlreadyPlaced), stats);
        let json = serde_json::to_value(&rejected).expect("json");
        assert_eq!(json["applied"], false);
        assert_eq!(json["reason"], "already_placed");
        assert_eq!(json["flushed"], false);
    }
}
