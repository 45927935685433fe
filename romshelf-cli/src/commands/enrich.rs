use std::path::Path;
use std::sync::Arc;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use romshelf_db::SqliteCatalog;
use romshelf_import::{
    EnrichEvent, EnrichOptions, EnrichRequest, EnrichSummary, JobQueue, JobStatus, QueueConfig,
};
use romshelf_lib::Settings;
use romshelf_scraper::{IgdbClient, IgdbCredentials};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::CliError;
use crate::spinner::Spinner;

use super::{open_store, print_json};

/// Queue an enrichment job and follow it to completion.
pub(crate) fn run_enrich(
    settings: &Settings,
    db_path: &Path,
    request: EnrichRequest,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let creds = IgdbCredentials::load().map_err(CliError::config)?;
    let client = IgdbClient::new(creds).map_err(CliError::config)?;
    let store = Arc::new(open_store(db_path)?);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(follow_job(settings, store, client, request, json, quiet))
}

async fn follow_job(
    settings: &Settings,
    store: Arc<SqliteCatalog>,
    client: IgdbClient,
    request: EnrichRequest,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<EnrichEvent>();
    let config = QueueConfig {
        capacity: settings.enrich.queue_capacity,
        retained_finished: romshelf_import::jobs::RETAINED_FINISHED_JOBS,
        defaults: EnrichOptions {
            batch_size: settings.enrich.batch_size,
            delay: Duration::from_secs(settings.enrich.delay_seconds),
        },
        events: Some(event_tx),
    };
    let queue = JobQueue::start(store, Arc::new(client), config);

    let accepted = queue.submit(&request)?;
    if json {
        print_json(&accepted)?;
    } else if accepted.total_games == 0 {
        log::info!("Nothing to enrich: every entry has a description and cover art.");
    } else {
        log::info!(
            "{}",
            format!(
                "Enriching {} entries (batches of {}, {}s apart)",
                accepted.total_games, accepted.batch_size, accepted.delay
            )
            .if_supports_color(Stdout, |t| t.bold()),
        );
    }

    let spinner = Spinner::new(quiet || json);
    let show = |event: EnrichEvent| {
        if !json {
            show_event(&spinner, event);
        }
    };

    let status = loop {
        tokio::select! {
            Some(event) = event_rx.recv() => show(event),
            status = queue.wait(accepted.job_id) => break status?,
        }
    };
    while let Ok(event) = event_rx.try_recv() {
        show(event);
    }
    spinner.finish();

    if json {
        return print_json(&status);
    }
    match status {
        JobStatus::Completed { summary } => {
            print_summary(&summary);
            Ok(())
        }
        JobStatus::Failed { error } => Err(CliError::runtime(error)),
        JobStatus::Queued | JobStatus::Running => Ok(()),
    }
}

fn show_event(spinner: &Spinner, event: EnrichEvent) {
    match event {
        EnrichEvent::BatchStarted {
            batch,
            total_batches,
            size,
        } => {
            spinner.set_message(format!(
                "Batch {}/{} ({} entries)",
                batch, total_batches, size
            ));
        }
        EnrichEvent::Enriched { title, fields, .. } => spinner.suspend(|| {
            log::info!(
                "  {} {} ({})",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                title.if_supports_color(Stdout, |t| t.bold()),
                if fields.is_empty() {
                    "nothing new".to_string()
                } else {
                    fields.join(", ")
                },
            );
        }),
        EnrichEvent::NotFound { title, .. } => spinner.suspend(|| {
            log::info!(
                "  {} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                title.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }),
        EnrichEvent::Failed { game_id, error } => spinner.suspend(|| {
            log::warn!(
                "  {} game {}: {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                game_id,
                error,
            );
        }),
        EnrichEvent::Pausing { delay } => {
            spinner.set_message(format!("Waiting {}s before the next batch", delay.as_secs()));
        }
        EnrichEvent::Aborted { error } => spinner.suspend(|| {
            log::error!("Stopping early: {}", error);
        }),
        EnrichEvent::Done { .. } => spinner.finish(),
    }
}

fn print_summary(summary: &EnrichSummary) {
    crate::log_blank();
    let heading = if summary.aborted {
        "Enrichment aborted"
    } else {
        "Enrichment complete"
    };
    log::info!("{}", heading.if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Entries:   {:>6}", summary.total);
    log::info!("  Enriched:  {:>6}", summary.enriched);
    log::info!("  Not found: {:>6}", summary.not_found);
    if summary.failed > 0 {
        log::info!("  Failed:    {:>6}", summary.failed);
    }
}
