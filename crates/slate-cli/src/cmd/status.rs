//! `slate status`: where the plan stands.
//!
//! Overall credits, graduation progress against the configured target, and
//! one tally per requirement group. Every course in the pool counts once,
//! placed or not.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use slate_core::Session;
use slate_core::plan::aggregate::{GraduationProgress, Totals, graduation_progress, plan_totals};
use slate_core::snapshot::MigrationReport;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `slate status`.
#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
struct StatusOutput {
    courses: usize,
    placed: usize,
    semesters: usize,
    #[serde(flatten)]
    totals: Totals,
    graduation: GraduationProgress,
    /// Repairs made while loading the store, if any.
    #[serde(skip_serializing_if = "MigrationReport::is_clean")]
    repairs: MigrationReport,
}

fn collect(session: &Session) -> StatusOutput {
    let plan = session.plan();
    StatusOutput {
        courses: plan.courses().len(),
        placed: plan.placed_ids().len(),
        semesters: plan.semesters().len(),
        totals: plan_totals(plan, session.requirements()),
        graduation: graduation_progress(plan, session.config().plan.graduation_credits),
        repairs: session.migration_report().clone(),
    }
}

fn write_text(s: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "credits {}/{}  graduation {:.1}% of {}  courses {} placed {} semesters {}",
        s.totals.credits.completed,
        s.totals.credits.total,
        s.graduation.percent,
        s.graduation.target,
        s.courses,
        s.placed,
        s.semesters
    )?;
    for group in &s.totals.groups {
        writeln!(
            w,
            "group {} {}/{}",
            group.id, group.credits.completed, group.credits.total
        )?;
    }
    Ok(())
}

fn write_pretty(s: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Plan")?;
    pretty_kv(w, "Courses", format!("{} ({} placed)", s.courses, s.placed))?;
    pretty_kv(w, "Semesters", s.semesters.to_string())?;
    pretty_kv(
        w,
        "Credits",
        format!(
            "{} completed / {} total",
            s.totals.credits.completed, s.totals.credits.total
        ),
    )?;
    pretty_kv(
        w,
        "Graduation",
        format!("{:.1}% of {} credits", s.graduation.percent, s.graduation.target),
    )?;

    writeln!(w)?;
    pretty_section(w, "Requirement groups")?;
    if s.totals.groups.is_empty() {
        writeln!(w, "(none)")?;
    }
    for group in &s.totals.groups {
        writeln!(
            w,
            "{:<6} {:<32} {:>3}/{:<3} {}",
            group.id, group.name, group.credits.completed, group.credits.total, group.color
        )?;
    }

    if !s.repairs.is_clean() {
        writeln!(w)?;
        writeln!(w, "note: the store was repaired while loading; see logs for details")?;
    }
    Ok(())
}

/// Execute `slate status`.
pub fn run_status(_args: &StatusArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let session = super::open_session(project_root)?;
    let status = collect(&session);
    let _ = session.close();
    render_mode(output, &status, write_text, write_pretty)
}
