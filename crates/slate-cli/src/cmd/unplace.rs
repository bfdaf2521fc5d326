//! `slate unplace`: take courses out of a semester. They stay in the pool.

use std::path::Path;

use clap::Args;
use slate_core::plan::Intent;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct UnplaceArgs {
    /// Semester to remove the courses from.
    pub semester: String,

    #[arg(required = true)]
    pub courses: Vec<String>,
}

/// Execute `slate unplace`.
pub fn run_unplace(args: &UnplaceArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;
    let semester = super::resolve_semester(session.plan(), &args.semester)?;
    let mut ids = super::resolve_courses(session.plan(), &args.courses)?;

    let intent = if ids.len() == 1 {
        Intent::RemoveFrom {
            semester,
            course: ids.remove(0),
        }
    } else {
        super::select_only(&mut session, ids);
        Intent::RemoveSelectedFrom { semester }
    };
    let outcome = session.apply(intent);
    super::finish(session, "unplace", outcome, None, output)
}
