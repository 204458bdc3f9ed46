use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use version_gate::config::{Config, config_path, log_path};
use version_gate::logging;
use version_gate::version::{self, VersionError};

#[derive(Parser)]
#[command(name = "version-gate")]
#[command(version, about = "Validate, compare and range-check version strings")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to the data directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a version string is well-formed
    Valid { version: String },
    /// Evaluate `<V1> <OP> <V2>` where OP is one of <, <=, >, >=, ==, !=
    Compare {
        v1: String,
        #[arg(allow_hyphen_values = true)]
        operator: String,
        v2: String,
    },
    /// Print whether V1 is less than, equal to or greater than V2
    Order { v1: String, v2: String },
    /// Check whether a version lies between --min and --max
    Covered {
        version: String,
        #[arg(long)]
        min: String,
        #[arg(long)]
        max: String,
        /// Exclude both boundaries
        #[arg(long)]
        exclusive: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut config =
        Config::load(&path).with_context(|| format!("Failed to load config {:?}", path))?;
    if cli.verbose {
        config.log.level = "debug".to_string();
    }
    if cli.log_file {
        config.log.file.get_or_insert_with(log_path);
    }
    let _guard = logging::init(&config.log)?;
    debug!("Loaded config from {:?}", path);

    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            logging::report_error("Command failed", &e);
            Err(e.into())
        }
    }
}

fn run(command: Command) -> Result<String, VersionError> {
    let output = match command {
        Command::Valid { version } => version::is_valid(&version).to_string(),
        Command::Compare { v1, operator, v2 } => {
            version::evaluate(&v1, &operator, &v2)?.to_string()
        }
        Command::Order { v1, v2 } => match version::compare(&v1, &v2)? {
            Ordering::Less => "less",
            Ordering::Equal => "equal",
            Ordering::Greater => "greater",
        }
        .to_string(),
        Command::Covered {
            version,
            min,
            max,
            exclusive,
        } => version::is_covered(&version, &min, &max, !exclusive)?.to_string(),
    };
    Ok(output)
}
