//! `slate place`: put pool courses into a semester.

use std::path::Path;

use clap::Args;
use slate_core::plan::Intent;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct PlaceArgs {
    /// Target semester: id, name, or term such as `fall-2025`.
    pub semester: String,

    /// Courses to place (ids or unique codes). Courses already placed
    /// elsewhere are skipped.
    #[arg(required = true)]
    pub courses: Vec<String>,

    /// Insert position in the target (end when omitted; clamped).
    #[arg(long)]
    pub at: Option<usize>,
}

/// Execute `slate place`. Several courses are placed as one bulk insert, in
/// pool order.
pub fn run_place(args: &PlaceArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;
    let semester = super::resolve_semester(session.plan(), &args.semester)?;
    let mut ids = super::resolve_courses(session.plan(), &args.courses)?;

    let intent = if ids.len() == 1 {
        Intent::InsertAt {
            semester,
            course: ids.remove(0),
            position: args.at,
        }
    } else {
        super::select_only(&mut session, ids);
        Intent::InsertSelected {
            semester,
            position: args.at,
        }
    };
    let outcome = session.apply(intent);
    super::finish(session, "place", outcome, None, output)
}
