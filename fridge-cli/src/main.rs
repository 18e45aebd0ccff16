//! FridgeAI CLI - scan a fridge photo into ingredients and recipes.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod capture;
mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const AFTER_HELP: &str = "\
Exit codes:
  0    Success
  1    General error
  66   Cannot read input file
  69   Inference service unavailable
  74   Cannot write history
  130  Cancelled (Ctrl-C)

Environment:
  OPENAI_API_KEY       API key for the inference endpoint
  OPENAI_API_URL       Chat-completions endpoint override
  FRIDGE_MODEL         Model identifier (default: gpt-4o-mini)
  FRIDGE_MAX_TOKENS    Output cap (default: 500)
  FRIDGE_TIMEOUT_SECS  Request timeout (default: 60)
  FRIDGE_DATA_DIR      History directory";

#[derive(Parser)]
#[command(name = "fridge")]
#[command(author, version, about = "Turn a photo of your fridge into recipes", long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the scan history
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an image and suggest recipes
    Scan {
        /// Image file, or a text file holding a data: URI
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Use a canned reply instead of the inference endpoint (for testing)
        #[arg(long)]
        mock: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not record the scan in history
        #[arg(long)]
        no_save: bool,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// List past scans, newest first
    History {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        /// Show at most N entries
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Show one past scan
    Show {
        /// Scan id (a unique prefix is enough)
        #[arg(value_name = "ID")]
        id: String,

        /// Show only recipe N (1-based) with numbered steps
        #[arg(short, long, value_name = "N")]
        recipe: Option<usize>,

        /// Print the entry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse saved model text without calling the endpoint
    Parse {
        /// File holding the raw reply, or - for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("fridge_core=debug,fridge_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let ansi = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stderr().is_terminal(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn apply_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
}

async fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Scan {
            image,
            mock,
            json,
            no_save,
            timeout,
        } => {
            commands::scan::execute(commands::scan::ScanArgs {
                image,
                mock,
                json,
                save: !no_save,
                timeout,
                data_dir: utils::resolve_data_dir(data_dir)?,
                quiet,
            })
            .await
        }
        Commands::History { json, limit } => {
            commands::history::execute(utils::resolve_data_dir(data_dir)?, json, limit, quiet)
        }
        Commands::Show { id, recipe, json } => {
            commands::show::execute(utils::resolve_data_dir(data_dir)?, &id, recipe, json, quiet)
        }
        Commands::Parse { file, json } => commands::parse::execute(&file, json, quiet),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    apply_color(cli.color);

    if let Err(err) = run(cli).await {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("Error: {message}");
        }
        std::process::exit(exit.code);
    }
}
