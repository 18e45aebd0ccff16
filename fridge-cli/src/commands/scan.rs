//! Scan command implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use fridge_core::{
    AnalysisPipeline, BackendConfig, BackendFactory, PipelineConfig, ScanResult, Scanner,
    StorageError,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::capture;
use crate::utils;

pub struct ScanArgs {
    pub image: PathBuf,
    pub mock: bool,
    pub json: bool,
    pub save: bool,
    pub timeout: Option<u64>,
    pub data_dir: PathBuf,
    pub quiet: bool,
}

/// What happened to the result after analysis.
enum Saved {
    As(String),
    Skipped,
    Failed(StorageError),
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs) -> Result<()> {
    let image = capture::load_image(&args.image)?;

    let backend = if args.mock {
        warn!("Using MOCK backend (reply does not depend on the image)");
        if !args.quiet && !args.json {
            eprintln!(
                "{}",
                "Using MOCK backend (reply does not depend on the image)".yellow()
            );
        }
        BackendFactory::create_mock()
    } else {
        BackendFactory::create(BackendConfig::Auto)
            .context("Inference backend not configured (set OPENAI_API_KEY or pass --mock)")?
    };

    let mut config = PipelineConfig::from_env();
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    let pipeline = AnalysisPipeline::new(backend, config);

    let cancel = CancellationToken::new();
    let watcher = spawn_ctrl_c_watcher(cancel.clone());

    if !args.quiet && !args.json {
        eprintln!("{}", "Analyzing image...".dimmed());
    }

    let outcome = if args.save {
        let history = utils::open_history(args.data_dir);
        let mut scanner = Scanner::new(pipeline, history);
        let scanned = scanner.scan(image, &cancel).await;
        let write_error = scanner.history_mut().take_write_error();
        scanned.map(|entry| {
            let saved = match write_error {
                Some(e) => Saved::Failed(e),
                None => Saved::As(entry.id.clone()),
            };
            (entry.result(), saved)
        })
    } else {
        pipeline
            .analyze_cancellable(image, &cancel)
            .await
            .map(|result| (result, Saved::Skipped))
    };
    watcher.abort();

    let (result, saved) = outcome.context("Scan failed")?;
    info!(
        ingredients = result.found_ingredients.len(),
        recipes = result.recipes.len(),
        saved = matches!(saved, Saved::As(_)),
        "Scan complete"
    );

    if args.json {
        print_json(&result, &saved)?;
    } else if !args.quiet {
        print_human(&result, &saved);
    }

    // Result already printed; the lost save still fails the command.
    match saved {
        Saved::Failed(e) => Err(anyhow::Error::new(e).context("Failed to write history")),
        Saved::As(_) | Saved::Skipped => Ok(()),
    }
}

/// Cancel `token` on the first Ctrl-C.
fn spawn_ctrl_c_watcher(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scan");
            token.cancel();
        }
    })
}

fn print_json(result: &ScanResult, saved: &Saved) -> Result<()> {
    let mut value = serde_json::to_value(result).context("Failed to serialize result")?;
    if let (Saved::As(id), Some(object)) = (saved, value.as_object_mut()) {
        object.insert("id".into(), id.as_str().into());
    }
    let json = serde_json::to_string_pretty(&value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn print_human(result: &ScanResult, saved: &Saved) {
    println!();
    super::print_result(result);
    println!();
    match saved {
        Saved::As(id) => println!("   {} {}", "Saved as:".dimmed(), utils::short_id(id)),
        Saved::Skipped => println!("   {}", "Not saved (--no-save)".dimmed()),
        Saved::Failed(_) => println!("   {}", "Not saved (history write failed)".yellow()),
    }
}
