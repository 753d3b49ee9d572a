//! dpwatch CLI - one observation per day, kept in a JSON time series

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dpwatch::cli::{commands, OutputFormat};
use dpwatch::config::{self, Config};
use dpwatch::fetch::Source;
use dpwatch::logging;

#[derive(Parser)]
#[command(name = "dpwatch")]
#[command(version)]
#[command(about = "Record one Daily Pennsylvanian observation per day into a JSON time series")]
#[command(after_help = r#"EXAMPLES:
  dpwatch                          # fetch the latest crossword byline and record it
  dpwatch run --source headline    # record today's front-page headline instead
  dpwatch show                     # print every recorded day
  dpwatch export -f csv -o out.csv # export the history as CSV

Running twice on the same day replaces that day's entry."#)]
struct Cli {
    /// Directory holding the store file
    #[arg(long, env = "DPWATCH_DATA_DIR", default_value = config::DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    /// Store file name inside the data directory
    #[arg(long = "store", env = "DPWATCH_STORE", default_value = config::DEFAULT_STORE_NAME, global = true)]
    store_name: String,

    /// Run log file, rotated daily as <name>.<YYYY-MM-DD>
    #[arg(long, env = "DPWATCH_LOG_FILE", default_value = config::DEFAULT_LOG_FILE, global = true)]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,

    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch today's value and record it (default)
    Run {
        /// Page to observe
        #[arg(long, value_enum, default_value = "crossword")]
        source: Source,

        /// Skip logging the directory tree and store contents
        #[arg(long)]
        no_tree: bool,

        /// HTTP timeout in seconds
        #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Print the recorded history, oldest day first
    Show {
        /// Output format: table, json, jsonl, csv
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Write the recorded history to stdout or a file
    Export {
        /// Output format: json, jsonl, csv, table
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Destination file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::new(cli.data_dir).with_store_name(cli.store_name);

    match cli.command {
        None => {
            init_run_logging(&cli.log_file, cli.no_log_file, cli.verbose)?;
            let config = config.with_tree_root(Some(std::env::current_dir()?));
            commands::run(&config, Source::default()).await?;
        }
        Some(Commands::Run {
            source,
            no_tree,
            timeout,
        }) => {
            init_run_logging(&cli.log_file, cli.no_log_file, cli.verbose)?;
            let tree_root = if no_tree {
                None
            } else {
                Some(std::env::current_dir()?)
            };
            let config = config
                .with_tree_root(tree_root)
                .with_timeout(Duration::from_secs(timeout));
            commands::run(&config, source).await?;
        }
        Some(Commands::Show { format }) => {
            logging::init(None, cli.verbose)?;
            commands::show(&config, format)?;
        }
        Some(Commands::Export { format, output }) => {
            logging::init(None, cli.verbose)?;
            commands::export(&config, format, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_run_logging(log_file: &Path, disabled: bool, verbose: bool) -> dpwatch::Result<()> {
    let log_file = if disabled { None } else { Some(log_file) };
    logging::init(log_file, verbose)
}
