//! Command handlers. Each mutating command opens a session, applies one
//! intent, closes the session (which flushes synchronously), and reports
//! the outcome.

pub mod completions;
pub mod course;
pub mod groups;
pub mod init;
pub mod move_cmd;
pub mod place;
pub mod reorder;
pub mod semester;
pub mod status;
pub mod unplace;

use std::path::Path;

use anyhow::Context;
use slate_core::Session;
use slate_core::error::SlateError;
use slate_core::model::{CourseId, SemesterId, SemesterKind};
use slate_core::plan::{Outcome, Plan};

use crate::output::{MutationReport, OutputMode, render_outcome};

/// Open the plan under `root`.
pub fn open_session(root: &Path) -> anyhow::Result<Session> {
    Session::open(root).with_context(|| format!("open plan under {}", root.display()))
}

/// Close the session and render the outcome of the command it ran.
pub fn finish(
    session: Session,
    command: &'static str,
    outcome: Outcome,
    id: Option<String>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let stats = session.close();
    let mut report = MutationReport::new(command, outcome, stats);
    if let Some(id) = id {
        report = report.with_id(id);
    }
    render_outcome(output, &report)
}

/// Resolve a semester argument: an id, a name, or a term such as
/// `fall-2024`, `2025_spring`, or `"Fall 2024"`.
pub fn resolve_semester(plan: &Plan, arg: &str) -> Result<SemesterId, SlateError> {
    let arg = arg.trim();
    if let Some(semester) = plan.semester(arg) {
        return Ok(semester.id.clone());
    }
    if let Some((kind, year)) = parse_term(arg) {
        if let Some(semester) = plan.find_term(kind, year) {
            return Ok(semester.id.clone());
        }
    }
    plan.semesters()
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(arg))
        .map(|s| s.id.clone())
        .ok_or_else(|| SlateError::SemesterNotFound { id: arg.to_string() })
}

fn parse_term(arg: &str) -> Option<(SemesterKind, i32)> {
    let mut parts = arg
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let (a, b) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    if let (Ok(kind), Ok(year)) = (a.parse::<SemesterKind>(), b.parse::<i32>()) {
        return Some((kind, year));
    }
    if let (Ok(year), Ok(kind)) = (a.parse::<i32>(), b.parse::<SemesterKind>()) {
        return Some((kind, year));
    }
    None
}

/// Resolve a course argument: an id, or a course code that names exactly
/// one pool course.
pub fn resolve_course(plan: &Plan, arg: &str) -> Result<CourseId, SlateError> {
    let arg = arg.trim();
    if let Some(course) = plan.course(arg) {
        return Ok(course.id.clone());
    }
    let mut by_code = plan
        .courses()
        .iter()
        .filter(|c| c.code.eq_ignore_ascii_case(arg));
    match (by_code.next(), by_code.next()) {
        (Some(course), None) => Ok(course.id.clone()),
        _ => Err(SlateError::CourseNotFound { id: arg.to_string() }),
    }
}

/// Resolve every course argument, failing on the first unknown one.
pub fn resolve_courses(plan: &Plan, args: &[String]) -> Result<Vec<CourseId>, SlateError> {
    args.iter().map(|arg| resolve_course(plan, arg)).collect()
}

/// Replace the session selection with `ids`.
pub fn select_only(session: &mut Session, ids: Vec<CourseId>) {
    let selection = session.selection_mut();
    selection.clear();
    for id in ids {
        selection.add(id);
    }
}
