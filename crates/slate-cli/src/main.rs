#![forbid(unsafe_code)]

mod cmd;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "slate: plan catalog courses into semesters",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding `.slate/` (defaults to the current directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn project_root(&self) -> anyhow::Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => Ok(env::current_dir()?),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a plan",
        long_about = "Create .slate/ with a default config and a SQLite store, seeded with the built-in catalog.",
        after_help = "EXAMPLES:\n    # Initialize a plan in the current directory\n    slate init\n\n    # Start from an empty course pool\n    slate init --no-seed"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show plan totals",
        long_about = "Show overall credits, graduation progress, and per-group tallies.",
        after_help = "EXAMPLES:\n    # Show progress\n    slate status\n\n    # Emit machine-readable output\n    slate status --json"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Plan",
        about = "List and edit semesters",
        long_about = "List semesters or add, remove, rename, and clear them. Program semesters cannot be removed.",
        after_help = "EXAMPLES:\n    # List semesters\n    slate semester list\n\n    # Add a summer term\n    slate semester add summer 2025\n\n    # Rename a semester\n    slate semester rename fall-2024 \"Year 1 Fall\""
    )]
    Semester(cmd::semester::SemesterArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Manage the course pool",
        long_about = "List, show, add, edit, remove, and complete pool courses.",
        after_help = "EXAMPLES:\n    # Unplaced electives\n    slate course list --category elective --semester CREDIT_ONLY\n\n    # Add a course and place it\n    slate course add --code COMP3111 --name \"Software Engineering\" --credits 4 --into fall-2025\n\n    # Mark courses completed\n    slate course done COMP2011 MATH1014"
    )]
    Course(cmd::course::CourseArgs),

    #[command(
        next_help_heading = "Placement",
        about = "Place courses into a semester",
        long_about = "Insert pool courses into a semester. A course can sit in at most one semester.",
        after_help = "EXAMPLES:\n    # Place one course at the end\n    slate place fall-2024 COMP2011\n\n    # Place several at the front\n    slate place spring-2025 MATH1014 MATH2011 --at 0"
    )]
    Place(cmd::place::PlaceArgs),

    #[command(
        next_help_heading = "Placement",
        about = "Move courses between semesters",
        long_about = "Move placed courses from one semester to another.",
        after_help = "EXAMPLES:\n    # Move a course to the next term\n    slate move fall-2024 spring-2025 COMP2011"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Placement",
        about = "Reorder courses inside a semester",
        long_about = "Move the course at one index to another, or lift several courses and drop them together.",
        after_help = "EXAMPLES:\n    # Move the first course to the third slot\n    slate reorder fall-2024 0 2\n\n    # Drop two courses before index 4\n    slate reorder fall-2024 --course a --course b --drop 4"
    )]
    Reorder(cmd::reorder::ReorderArgs),

    #[command(
        next_help_heading = "Placement",
        about = "Take courses out of a semester",
        long_about = "Remove courses from a semester. They stay in the pool.",
        after_help = "EXAMPLES:\n    # Unplace a course\n    slate unplace fall-2024 COMP2011"
    )]
    Unplace(cmd::unplace::UnplaceArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Manage requirement groups",
        long_about = "List, add, edit, remove, and reorder the requirement groups courses count toward.",
        after_help = "EXAMPLES:\n    # Show group tallies\n    slate groups list\n\n    # Add a minor\n    slate groups add MATH Mathematics --color #dc2626"
    )]
    Groups(cmd::groups::GroupsArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    slate completions bash > ~/.local/share/bash-completion/completions/slate"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SLATE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "slate=debug,info"
        } else {
            "slate=info,warn"
        })
    });

    let format = env::var("SLATE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode, project_root: &std::path::Path) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, project_root),
        Commands::Status(args) => cmd::status::run_status(args, output, project_root),
        Commands::Semester(args) => cmd::semester::run_semester(args, output, project_root),
        Commands::Course(args) => cmd::course::run_course(args, output, project_root),
        Commands::Place(args) => cmd::place::run_place(args, output, project_root),
        Commands::Move(args) => cmd::move_cmd::run_move(args, output, project_root),
        Commands::Reorder(args) => cmd::reorder::run_reorder(args, output, project_root),
        Commands::Unplace(args) => cmd::unplace::run_unplace(args, output, project_root),
        Commands::Groups(args) => cmd::groups::run_groups(args, output, project_root),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = match cli.project_root() {
        Ok(root) => root,
        Err(err) => {
            let _ = render_error(OutputMode::Text, &CliError::from_anyhow(&err));
            return ExitCode::FAILURE;
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, &project_root);

    match run(&cli, output, &project_root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !cli.quiet || output.is_json() {
                let _ = render_error(output, &CliError::from_anyhow(&err));
            }
            ExitCode::FAILURE
        }
    }
}
