//! `slate groups`: requirement groups (majors) and their credit tallies.

use std::io::{self, Write};
use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;
use slate_core::Session;
use slate_core::model::GroupPatch;
use slate_core::model::requirement::FALLBACK_COLOR;
use slate_core::plan::aggregate::plan_totals;

use crate::output::{OutputMode, Renderable, render_list};
use crate::validate;

#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List groups in display order with completed/total credits.
    List,
    /// Append a new group.
    Add {
        /// Short id courses are tagged with, e.g. DSCT.
        id: String,
        name: String,
        /// `#rrggbb` display color.
        #[arg(long, default_value = FALLBACK_COLOR)]
        color: String,
    },
    /// Change a group's name or color.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a group. Courses keep their tags.
    Remove { id: String },
    /// Move the group at index FROM to index TO.
    Reorder { from: usize, to: usize },
}

#[derive(Debug, Serialize)]
struct GroupRow {
    id: String,
    name: String,
    color: String,
    display_order: u32,
    completed: u32,
    total: u32,
}

impl Renderable for GroupRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:>2}. {:<6} {:<32} {:>3}/{:<3} {}",
            self.display_order, self.id, self.name, self.completed, self.total, self.color
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
            self.display_order, self.id, self.color, self.completed, self.total, self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ORDER", "ID", "COLOR", "COMPLETED", "TOTAL", "NAME"]
    }
}

fn rows(session: &Session) -> Vec<GroupRow> {
    let totals = plan_totals(session.plan(), session.requirements());
    session
        .requirements()
        .groups()
        .iter()
        .map(|group| {
            let tally = totals.group(&group.id).unwrap_or_default();
            GroupRow {
                id: group.id.clone(),
                name: group.name.clone(),
                color: group.color.clone(),
                display_order: group.display_order,
                completed: tally.completed,
                total: tally.total,
            }
        })
        .collect()
}

/// Execute `slate groups <subcommand>`.
pub fn run_groups(args: &GroupsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = super::open_session(project_root)?;

    let (name, outcome) = match &args.command {
        GroupsCommand::List => {
            let rows = rows(&session);
            let _ = session.close();
            render_list(&rows, output)?;
            return Ok(());
        }
        GroupsCommand::Add { id, name, color } => {
            validate::validate_group_id(id)?;
            validate::validate_color(color)?;
            ("groups add", session.add_group(id, name, color))
        }
        GroupsCommand::Edit { id, name, color } => {
            if let Some(color) = color {
                validate::validate_color(color)?;
            }
            let patch = GroupPatch {
                name: name.clone(),
                color: color.clone(),
            };
            ("groups edit", session.update_group(id, &patch))
        }
        GroupsCommand::Remove { id } => ("groups remove", session.remove_group(id)),
        GroupsCommand::Reorder { from, to } => ("groups reorder", session.reorder_groups(*from, *to)),
    };
    super::finish(session, name, outcome, None, output)
}
