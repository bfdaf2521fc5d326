//! `slate semester`: list and edit the semesters of the plan.

use std::io::{self, Write};
use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;
use slate_core::plan::Intent;
use slate_core::plan::aggregate::semester_totals;
use slate_core::Session;

use crate::output::{OutputMode, Renderable, render_list};
use crate::validate;

#[derive(Args, Debug)]
pub struct SemesterArgs {
    #[command(subcommand)]
    pub command: SemesterCommand,
}

#[derive(Subcommand, Debug)]
pub enum SemesterCommand {
    /// List semesters in display order with their credit totals.
    List,
    /// Add a semester of the given kind and year.
    Add {
        /// fall, winter, spring, or summer.
        kind: String,
        year: i32,
    },
    /// Remove a semester. Its courses stay in the pool.
    Remove {
        /// Semester id, name, or term such as `summer-2025`.
        semester: String,
    },
    /// Rename a semester.
    Rename { semester: String, name: String },
    /// Remove every course from a semester. The courses stay in the pool.
    Clear { semester: String },
}

#[derive(Debug, Serialize)]
struct SemesterRow {
    id: String,
    name: String,
    kind: String,
    year: i32,
    mandatory: bool,
    courses: Vec<String>,
    credits: u32,
    completed_credits: u32,
}

impl Renderable for SemesterRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let marker = if self.mandatory { "*" } else { " " };
        writeln!(
            w,
            "{marker} {:<24} {:>2} courses  {:>3} cr ({} done)  {}",
            self.name,
            self.courses.len(),
            self.credits,
            self.completed_credits,
            self.id
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        Ok(())
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            self.id,
            self.kind,
            self.year,
            self.courses.len(),
            self.credits,
            self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "KIND", "YEAR", "COURSES", "CREDITS", "NAME"]
    }
}

fn rows(session: &Session) -> Vec<SemesterRow> {
    let plan = session.plan();
    plan.semesters()
        .iter()
        .map(|semester| {
            let totals = semester_totals(plan, semester, session.requirements());
            SemesterRow {
                id: semester.id.to_string(),
                name: semester.name.clone(),
                kind: semester.kind.to_string(),
                year: semester.year,
                mandatory: semester.is_mandatory(),
                courses: semester.courses.iter().map(ToString::to_string).collect(),
                credits: totals.credits.total,
                completed_credits: totals.credits.completed,
            }
        })
        .collect()
}

/// Execute `slate semester <subcommand>`.
pub fn run_semester(args: &SemesterArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;

    let (name, intent) = match &args.command {
        SemesterCommand::List => {
            let rows = rows(&session);
            let _ = session.close();
            render_list(&rows, output)?;
            return Ok(());
        }
        SemesterCommand::Add { kind, year } => {
            let kind = validate::parse_kind(kind)?;
            validate::validate_year(*year)?;
            let outcome = session.apply(Intent::AddSemester { kind, year: *year });
            let id = session
                .plan()
                .find_term(kind, *year)
                .filter(|_| outcome.is_applied())
                .map(|s| s.id.to_string());
            return super::finish(session, "semester add", outcome, id, output);
        }
        SemesterCommand::Remove { semester } => {
            let semester = super::resolve_semester(session.plan(), semester)?;
            ("semester remove", Intent::RemoveSemester { semester })
        }
        SemesterCommand::Rename { semester, name } => {
            let semester = super::resolve_semester(session.plan(), semester)?;
            (
                "semester rename",
                Intent::RenameSemester {
                    semester,
                    name: name.clone(),
                },
            )
        }
        SemesterCommand::Clear { semester } => {
            let semester = super::resolve_semester(session.plan(), semester)?;
            ("semester clear", Intent::ClearSemester { semester })
        }
    };

    let outcome = session.apply(intent);
    super::finish(session, name, outcome, None, output)
}
