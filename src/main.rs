use clap::Parser;
use env_logger::Env;
use lurescan::cli::Args;
use lurescan::reporter::{BatchEntry, Reporter};
use lurescan::ui::BatchProgress;
use lurescan::{LureError, UrlRiskEngine};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Exit status when `--fail-on` is reached
const EXIT_TIER_REACHED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    log::debug!("Lurescan starting with args: {:?}", args);

    let config = args.engine_config()?;
    let targets = args.targets()?;
    if targets.is_empty() {
        return Err("no URLs given: pass them as arguments or with --input".into());
    }

    let engine = Arc::new(UrlRiskEngine::new(&config)?);
    let entries = score_batch(engine, targets, args.concurrency, args.quiet).await?;

    let colored = args.output.is_none() && console::colors_enabled();
    let report = Reporter::new(args.format, colored).render(&entries)?;

    match &args.output {
        Some(path) => {
            log::info!("Writing {} report to: {:?}", args.format, path);
            std::fs::write(path, report).map_err(|e| LureError::io(e, path.clone()))?;
        }
        None => println!("{}", report),
    }

    if let Some(threshold) = args.fail_on {
        let reached = entries
            .iter()
            .filter_map(BatchEntry::verdict)
            .any(|v| v.tier() >= threshold);
        if reached {
            log::warn!("At least one URL reached the {} tier", threshold);
            return Ok(ExitCode::from(EXIT_TIER_REACHED));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Score every input with at most `concurrency` in flight, keeping input order.
async fn score_batch(
    engine: Arc<UrlRiskEngine>,
    targets: Vec<String>,
    concurrency: usize,
    quiet: bool,
) -> Result<Vec<BatchEntry>, LureError> {
    let progress = Arc::new(BatchProgress::new(targets.len() as u64, quiet));
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, input) in targets.into_iter().enumerate() {
        let engine = Arc::clone(&engine);
        let permits = Arc::clone(&permits);
        let progress = Arc::clone(&progress);

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            progress.started(&input);
            let outcome = engine.score_url(&input).await;
            if let Err(e) = &outcome {
                log::warn!("Rejected input '{}': {}", input, e);
            }
            progress.completed(&outcome);
            (index, BatchEntry { input, outcome })
        });
    }

    let mut scored = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        scored.push(joined?);
    }
    progress.finish();

    scored.sort_by_key(|(index, _)| *index);
    Ok(scored.into_iter().map(|(_, entry)| entry).collect())
}
