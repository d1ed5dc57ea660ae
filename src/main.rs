use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rotabak::cli::{handle_config, handle_init, handle_plan, handle_run, JobArgs};
use rotabak::config::RotabakPaths;

#[derive(Parser)]
#[command(
    name = "rotabak",
    version,
    about = "Rotating dated directory backups",
    long_about = "rotabak copies a set of directories into a folder named after \
                  today's date, then deletes the dated folder that has aged past \
                  the retention window."
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up every source into today's folder and prune the expired one
    Run(JobArgs),

    /// Show today's folder, destinations and prune target without changing anything
    #[command(alias = "dry-run")]
    Plan(JobArgs),

    /// Write a default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the settings path and effective settings
    Config(JobArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = RotabakPaths::new()?;

    match cli.command {
        Some(Commands::Run(args)) => handle_run(&paths, &args)?,
        Some(Commands::Plan(args)) => handle_plan(&paths, &args)?,
        Some(Commands::Init { force }) => handle_init(&paths, force)?,
        Some(Commands::Config(args)) => handle_config(&paths, &args)?,
        None => {
            println!("rotabak - rotating dated directory backups");
            println!();
            println!("Run 'rotabak --help' for usage information.");
            println!("Run 'rotabak init' to create a settings file.");
        }
    }

    Ok(())
}
