//! `slate reorder`: change the order of courses inside one semester.

use std::path::Path;

use clap::Args;
use slate_core::plan::Intent;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ReorderArgs {
    pub semester: String,

    /// Current index of the course to move.
    #[arg(required_unless_present = "courses", requires = "to")]
    pub from: Option<usize>,

    /// Index the course should end up at.
    pub to: Option<usize>,

    /// Lift these courses out together instead (repeatable) and drop them
    /// at `--drop`.
    #[arg(long = "course", conflicts_with_all = ["from", "to"], requires = "drop")]
    pub courses: Vec<String>,

    /// Drop position for `--course`, as an index into the sequence before
    /// the courses are lifted.
    #[arg(long)]
    pub drop: Option<usize>,
}

/// Execute `slate reorder`.
pub fn run_reorder(args: &ReorderArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;
    let semester = super::resolve_semester(session.plan(), &args.semester)?;

    let intent = match (args.from, args.to, args.drop) {
        (Some(from), Some(to), _) => Intent::Reorder { semester, from, to },
        (_, _, Some(drop)) => {
            let ids = super::resolve_courses(session.plan(), &args.courses)?;
            super::select_only(&mut session, ids);
            Intent::ReorderSelected { semester, drop }
        }
        _ => anyhow::bail!("pass <FROM> <TO>, or --course ... --drop <N>"),
    };
    let outcome = session.apply(intent);
    super::finish(session, "reorder", outcome, None, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ReorderArgs,
    }

    #[test]
    fn index_form_parses() {
        let w = Wrapper::parse_from(["test", "fall-2024", "0", "2"]);
        assert_eq!(w.args.from, Some(0));
        assert_eq!(w.args.to, Some(2));
        assert!(w.args.courses.is_empty());
    }

    #[test]
    fn bulk_form_parses() {
        let w = Wrapper::parse_from(["test", "fall-2024", "--course", "a", "--course", "b", "--drop", "3"]);
        assert_eq!(w.args.courses, ["a", "b"]);
        assert_eq!(w.args.drop, Some(3));
        assert!(w.args.from.is_none());
    }

    #[test]
    fn from_without_to_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "fall-2024", "1"]).is_err());
    }

    #[test]
    fn course_without_drop_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "fall-2024", "--course", "a"]).is_err());
    }

    #[test]
    fn nothing_to_reorder_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "fall-2024"]).is_err());
    }
}
