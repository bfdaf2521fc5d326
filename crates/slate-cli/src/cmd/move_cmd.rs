//! `slate move`: move placed courses from one semester to another.

use std::path::Path;

use clap::Args;
use slate_core::plan::Intent;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Source semester.
    pub from: String,

    /// Target semester.
    pub to: String,

    /// Courses to move. With several courses, those not in the source are
    /// skipped and the rest keep their source order.
    #[arg(required = true)]
    pub courses: Vec<String>,

    /// Insert position in the target (end when omitted; clamped).
    #[arg(long)]
    pub at: Option<usize>,
}

/// Execute `slate move`.
pub fn run_move(args: &MoveArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;
    let from = super::resolve_semester(session.plan(), &args.from)?;
    let to = super::resolve_semester(session.plan(), &args.to)?;
    let mut ids = super::resolve_courses(session.plan(), &args.courses)?;

    let intent = if ids.len() == 1 {
        Intent::MoveBetween {
            from,
            to,
            course: ids.remove(0),
            position: args.at,
        }
    } else {
        super::select_only(&mut session, ids);
        Intent::MoveSelected {
            from,
            to,
            position: args.at,
        }
    };
    let outcome = session.apply(intent);
    super::finish(session, "move", outcome, None, output)
}
