use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rmz_runner::{load_plan, queue_order, RunOptions, Runner};

#[derive(Parser)]
#[command(name = "rmz", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create .rmz/rmz.toml and check the data directory
    Init {
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },

    /// Run the engine and print a summary
    Run {
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        max_steps: Option<usize>,
        /// YAML plan replacing the default initial tasks
        #[arg(long)]
        plan: Option<PathBuf>,
        /// Keep records in memory; the data directory is not touched
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the summary of the last run
    Status {
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },

    /// Validate a plan file and show its tasks in queue order
    Plan { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Init { project } => {
            let cfg = Runner::init_project(&project)?;
            println!("Initialized {} in {}", cfg.project.title, project.display());
        }
        Command::Run { project, title, description, max_steps, plan, dry_run } => {
            let r = Runner::open(project)?;
            let summary = r.run(&RunOptions { title, description, max_steps, plan, dry_run })?;
            print!("{}", summary.render());
        }
        Command::Status { project } => {
            let r = Runner::open(project)?;
            print!("{}", r.status()?.render());
        }
        Command::Plan { file } => {
            let tasks = queue_order(load_plan(&file)?);
            println!("{} tasks", tasks.len());
            for t in tasks {
                let deps: Vec<&str> = t.dependencies.iter().map(|d| d.as_str()).collect();
                if deps.is_empty() {
                    println!("- [{}] {} ({}, {})", t.priority, t.id, t.kind, t.role());
                } else {
                    println!("- [{}] {} ({}, {}) after {}", t.priority, t.id, t.kind, t.role(), deps.join(", "));
                }
            }
        }
    }

    Ok(())
}
