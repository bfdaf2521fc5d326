use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use slate_core::Session;
use slate_core::config::{self, ProjectConfig};

use crate::output::{OutputMode, pretty_kv, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `.slate/config.toml` with defaults even if `.slate/` exists.
    /// The store is kept.
    #[arg(long)]
    pub force: bool,

    /// Start with an empty course pool instead of the built-in catalog.
    #[arg(long)]
    pub no_seed: bool,
}

const GITIGNORE: &str = "slate.db-wal\nslate.db-shm\n";

#[derive(Debug, Serialize)]
struct InitReport {
    root: String,
    courses: usize,
    semesters: usize,
    groups: usize,
}

/// Execute `slate init`. Creates the project skeleton:
///
/// ```text
/// .slate/
///   config.toml   (default project config)
///   slate.db      (SQLite store, migrated to the latest schema)
///   .gitignore    (SQLite WAL side files)
/// ```
///
/// # Errors
///
/// Returns an error if `.slate/` already exists and `--force` is not set,
/// or if any filesystem or store operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let slate_dir = config::slate_dir(project_root);
    if slate_dir.exists() && !args.force {
        anyhow::bail!(".slate/ already exists. Use `slate init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&slate_dir)
        .with_context(|| format!("Failed to create {}", slate_dir.display()))?;

    let mut project = ProjectConfig::default();
    project.plan.seed_catalog = !args.no_seed;
    let rendered = config::render_project_config(&project).context("render default config")?;
    let config_path = config::config_path(project_root);
    std::fs::write(&config_path, rendered)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let gitignore = slate_dir.join(".gitignore");
    std::fs::write(&gitignore, GITIGNORE)
        .with_context(|| format!("Failed to write {}", gitignore.display()))?;

    let session = Session::init(project_root)?;
    let report = InitReport {
        root: project_root.display().to_string(),
        courses: session.plan().courses().len(),
        semesters: session.plan().semesters().len(),
        groups: session.requirements().groups().len(),
    };
    let stats = session.close();
    if stats.failures > 0 {
        anyhow::bail!("initial plan could not be written to {}", slate_dir.display());
    }

    render(output, &report, |r, w| {
        writeln!(w, "Initialized slate plan in {}", r.root)?;
        pretty_kv(w, "courses", r.courses.to_string())?;
        pretty_kv(w, "semesters", r.semesters.to_string())?;
        pretty_kv(w, "groups", r.groups.to_string())
    })
}
