//! `slate course`: manage the course pool. List, inspect, add, edit, remove, and
//! mark courses completed.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;
use slate_core::Session;
use slate_core::error::SlateError;
use slate_core::model::{Course, CourseId, CoursePatch};
use slate_core::plan::query::{self, UNPLACED};
use slate_core::plan::{CourseFilter, Intent};

use crate::output::{OutputMode, Renderable, pretty_kv, render, render_list};
use crate::validate;

#[derive(Args, Debug)]
pub struct CourseArgs {
    #[command(subcommand)]
    pub command: CourseCommand,
}

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// List pool courses, optionally filtered.
    List(ListArgs),
    /// Show one course and where it is placed.
    Show {
        /// Course id or unique course code.
        course: String,
    },
    /// Add a course to the pool, optionally placing it right away.
    Add(AddArgs),
    /// Edit fields of a course. Its id never changes.
    Edit(EditArgs),
    /// Remove courses from the pool and from every semester.
    Remove {
        #[arg(required = true)]
        courses: Vec<String>,
    },
    /// Mark courses completed (or not completed with `--undo`).
    Done {
        #[arg(required = true)]
        courses: Vec<String>,
        #[arg(long)]
        undo: bool,
    },
    /// Search placed courses by code or name.
    Search { text: String },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive substring of code or name.
    #[arg(long)]
    pub search: Option<String>,

    /// Only completed courses.
    #[arg(long, conflicts_with = "incomplete")]
    pub completed: bool,

    /// Only courses not yet completed.
    #[arg(long)]
    pub incomplete: bool,

    /// Category filter (repeatable): prerequisite, major, elective, other.
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Requirement-group filter (repeatable). `OTHER` matches untagged courses.
    #[arg(long = "req")]
    pub requirements: Vec<String>,

    /// Semester filter (repeatable). `CREDIT_ONLY` matches unplaced courses.
    #[arg(long = "semester")]
    pub semesters: Vec<String>,

    /// Order by requirement group, then code, instead of pool order.
    #[arg(long)]
    pub by_group: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Course code, e.g. COMP2011.
    #[arg(long)]
    pub code: String,

    /// Course name.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub credits: u32,

    /// prerequisite, major, elective, or other.
    #[arg(long)]
    pub category: Option<String>,

    /// Requirement group this course counts toward (repeatable).
    #[arg(long = "req")]
    pub requirements: Vec<String>,

    #[arg(long)]
    pub completed: bool,

    /// Explicit id. A fresh id is generated when omitted.
    #[arg(long)]
    pub id: Option<String>,

    /// Also place the new course in this semester.
    #[arg(long)]
    pub into: Option<String>,

    /// Position inside `--into` (end when omitted).
    #[arg(long, requires = "into")]
    pub at: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Course id or unique course code.
    pub course: String,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub credits: Option<u32>,

    #[arg(long)]
    pub category: Option<String>,

    /// Replace the requirement groups (repeatable).
    #[arg(long = "req", conflicts_with = "clear_reqs")]
    pub requirements: Vec<String>,

    /// Remove every requirement group tag.
    #[arg(long)]
    pub clear_reqs: bool,
}

#[derive(Debug, Serialize)]
struct CourseRow {
    id: String,
    code: String,
    name: String,
    credits: u32,
    completed: bool,
    category: String,
    requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    semester: Option<String>,
}

impl CourseRow {
    fn new(course: &Course, semester: Option<String>) -> Self {
        Self {
            id: course.id.to_string(),
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            completed: course.completed,
            category: course.category.to_string(),
            requirements: course.requirements.iter().cloned().collect(),
            semester,
        }
    }
}

impl Renderable for CourseRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let check = if self.completed { "✓" } else { " " };
        write!(
            w,
            "[{check}] {:<10} {:<40} {:>2} cr",
            self.code, self.name, self.credits
        )?;
        if !self.requirements.is_empty() {
            write!(w, "  {}", self.requirements.join(","))?;
        }
        if let Some(semester) = &self.semester {
            write!(w, "  @ {semester}")?;
        }
        writeln!(w)
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
            self.code,
            self.credits,
            u8::from(self.completed),
            self.semester.as_deref().unwrap_or("-"),
            self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "CODE", "CREDITS", "DONE", "SEMESTER", "NAME"]
    }
}

fn build_filter(session: &Session, args: &ListArgs) -> anyhow::Result<CourseFilter> {
    let mut filter = CourseFilter {
        text: args.search.clone(),
        show_completed: !args.incomplete,
        show_incomplete: !args.completed,
        ..CourseFilter::default()
    };
    for raw in &args.categories {
        filter.categories.insert(validate::parse_category(raw)?);
    }
    filter.requirements = args.requirements.iter().cloned().collect();
    for raw in &args.semesters {
        if raw == UNPLACED {
            filter.semesters.insert(UNPLACED.to_string());
        } else {
            let id = super::resolve_semester(session.plan(), raw)?;
            filter.semesters.insert(id.to_string());
        }
    }
    Ok(filter)
}

fn list_rows(session: &Session, args: &ListArgs) -> anyhow::Result<Vec<CourseRow>> {
    let filter = build_filter(session, args)?;
    let plan = session.plan();
    let mut courses = filter.apply(plan);
    if args.by_group {
        query::sort_for_library(&mut courses, session.requirements());
    }
    Ok(courses
        .into_iter()
        .map(|course| {
            let semester = plan
                .semester_of(course.id.as_str())
                .map(|s| s.name.clone());
            CourseRow::new(course, semester)
        })
        .collect())
}

fn build_course(args: &AddArgs) -> anyhow::Result<Course> {
    let id = args
        .id
        .as_deref()
        .map_or_else(CourseId::fresh, CourseId::from);
    let mut course = Course::new(id, args.code.as_str(), args.name.as_str(), args.credits)
        .with_requirements(args.requirements.iter().map(String::as_str))
        .completed(args.completed);
    if let Some(category) = &args.category {
        course = course.with_category(validate::parse_category(category)?);
    }
    Ok(course)
}

fn build_patch(args: &EditArgs) -> anyhow::Result<CoursePatch> {
    let requirements = if args.clear_reqs {
        Some(BTreeSet::new())
    } else if args.requirements.is_empty() {
        None
    } else {
        Some(args.requirements.iter().cloned().collect())
    };
    Ok(CoursePatch {
        code: args.code.clone(),
        name: args.name.clone(),
        credits: args.credits,
        completed: None,
        category: args
            .category
            .as_deref()
            .map(validate::parse_category)
            .transpose()?,
        requirements,
    })
}

fn show(session: &Session, arg: &str, output: OutputMode) -> anyhow::Result<()> {
    let plan = session.plan();
    let id = super::resolve_course(plan, arg)?;
    let course = plan
        .course(id.as_str())
        .ok_or_else(|| SlateError::CourseNotFound { id: id.to_string() })?;
    let row = CourseRow::new(course, plan.semester_of(id.as_str()).map(|s| s.id.to_string()));
    let requirements = session.requirements();
    render(output, &row, |r, w| {
        pretty_kv(w, "ID", &r.id)?;
        pretty_kv(w, "Code", &r.code)?;
        pretty_kv(w, "Name", &r.name)?;
        pretty_kv(w, "Credits", r.credits.to_string())?;
        pretty_kv(w, "Completed", if r.completed { "yes" } else { "no" })?;
        pretty_kv(w, "Category", &r.category)?;
        let groups: Vec<&str> = r
            .requirements
            .iter()
            .map(|g| requirements.name_of(g))
            .collect();
        pretty_kv(w, "Counts for", if groups.is_empty() { "-".to_string() } else { groups.join(", ") })?;
        pretty_kv(w, "Semester", r.semester.as_deref().unwrap_or("(not placed)"))
    })
}

fn search(session: &Session, text: &str, output: OutputMode) -> anyhow::Result<()> {
    let rows: Vec<CourseRow> = query::search_placed(session.plan(), text)
        .into_iter()
        .map(|(semester, course)| CourseRow::new(course, Some(semester.name.clone())))
        .collect();
    render_list(&rows, output)?;
    Ok(())
}

/// Execute `slate course <subcommand>`.
pub fn run_course(args: &CourseArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;

    match &args.command {
        CourseCommand::List(list) => {
            let rows = list_rows(&session, list);
            let _ = session.close();
            render_list(&rows?, output)?;
            Ok(())
        }
        CourseCommand::Show { course } => {
            let result = show(&session, course, output);
            let _ = session.close();
            result
        }
        CourseCommand::Search { text } => {
            let result = search(&session, text, output);
            let _ = session.close();
            result
        }
        CourseCommand::Add(add) => {
            let course = build_course(add)?;
            let id = course.id.to_string();
            let outcome = match &add.into {
                Some(semester) => {
                    let semester = super::resolve_semester(session.plan(), semester)?;
                    session.insert_new_course(semester.as_str(), course, add.at)?
                }
                None => session.add_course(course)?,
            };
            let id = outcome.is_applied().then_some(id);
            super::finish(session, "course add", outcome, id, output)
        }
        CourseCommand::Edit(edit) => {
            let id = super::resolve_course(session.plan(), &edit.course)?;
            let outcome = session.edit_course(id.as_str(), build_patch(edit)?)?;
            super::finish(session, "course edit", outcome, None, output)
        }
        CourseCommand::Remove { courses } => {
            let ids = super::resolve_courses(session.plan(), courses)?;
            let outcome = if let [only] = ids.as_slice() {
                session.apply(Intent::RemoveCourse {
                    course: only.clone(),
                })
            } else {
                super::select_only(&mut session, ids);
                session.apply(Intent::RemoveSelected)
            };
            super::finish(session, "course remove", outcome, None, output)
        }
        CourseCommand::Done { courses, undo } => {
            let ids = super::resolve_courses(session.plan(), courses)?;
            super::select_only(&mut session, ids);
            let outcome = session.apply(Intent::SetSelectedCompletion { completed: !undo });
            super::finish(session, "course done", outcome, None, output)
        }
    }
}
