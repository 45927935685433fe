//! Backfill missing metadata from a [`MetadataProvider`].
//!
//! Targets are processed in fixed-size batches, sequentially within a batch,
//! with a pause between batches. A failure on one entry is recorded and the
//! run moves on, except for authentication/configuration failures, which
//! would fail every remaining entry and so abort the run.

use std::collections::HashSet;

use romshelf_catalog::types::MetadataPatch;
use romshelf_db::{CatalogStore, OperationError};
use romshelf_scraper::{MetadataProvider, ProviderError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Duration;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Game {0} not found")]
    GameNotFound(i64),
}

impl EnrichError {
    /// True when continuing the run is pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_fatal())
    }
}

/// An enrichment trigger. Omitted fields fall back to configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichRequest {
    #[serde(default)]
    pub game_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub delay_seconds: Option<u64>,
}

/// Batch sizing for an enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    pub batch_size: usize,
    /// Pause between batches (never after the last one).
    pub delay: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_secs(2),
        }
    }
}

impl EnrichOptions {
    /// Apply a request's overrides on top of `defaults`. A zero batch size
    /// is treated as one.
    pub fn from_request(request: &EnrichRequest, defaults: &EnrichOptions) -> Self {
        Self {
            batch_size: request.batch_size.unwrap_or(defaults.batch_size).max(1),
            delay: request
                .delay_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.delay),
        }
    }
}

/// Counts and errors from one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichSummary {
    pub total: usize,
    pub enriched: usize,
    pub not_found: usize,
    pub failed: usize,
    pub batches: usize,
    /// Set when a fatal provider error stopped the run early.
    pub aborted: bool,
    pub errors: Vec<String>,
}

/// Events emitted during enrichment for real-time progress reporting.
#[derive(Debug, Clone)]
pub enum EnrichEvent {
    BatchStarted {
        batch: usize,
        total_batches: usize,
        size: usize,
    },
    Enriched {
        game_id: i64,
        title: String,
        fields: Vec<&'static str>,
    },
    NotFound {
        game_id: i64,
        title: String,
    },
    Failed {
        game_id: i64,
        error: String,
    },
    Pausing {
        delay: Duration,
    },
    Aborted {
        error: String,
    },
    Done {
        summary: EnrichSummary,
    },
}

enum EntryOutcome {
    Enriched {
        title: String,
        fields: Vec<&'static str>,
    },
    NotFound {
        title: String,
    },
}

/// Resolve which entries a run covers: the given ids (deduplicated, in
/// order), or every entry missing a description or cover art when no ids
/// are given.
pub fn select_targets(
    store: &dyn CatalogStore,
    game_ids: Option<&[i64]>,
) -> Result<Vec<i64>, OperationError> {
    match game_ids {
        Some(ids) if !ids.is_empty() => {
            let mut seen = HashSet::new();
            Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
        }
        _ => store.entries_missing_metadata(),
    }
}

/// Enrich `game_ids` in batches.
///
/// Events go to `events` if given; a closed receiver is ignored.
pub async fn run_enrichment(
    store: &dyn CatalogStore,
    provider: &dyn MetadataProvider,
    game_ids: &[i64],
    options: &EnrichOptions,
    events: Option<&UnboundedSender<EnrichEvent>>,
) -> EnrichSummary {
    let emit = |event: EnrichEvent| {
        if let Some(tx) = events {
            let _ = tx.send(event);
        }
    };

    let batch_size = options.batch_size.max(1);
    let batches: Vec<&[i64]> = game_ids.chunks(batch_size).collect();
    let mut summary = EnrichSummary {
        total: game_ids.len(),
        ..Default::default()
    };

    'batches: for (index, batch) in batches.iter().enumerate() {
        summary.batches += 1;
        emit(EnrichEvent::BatchStarted {
            batch: index + 1,
            total_batches: batches.len(),
            size: batch.len(),
        });

        for &game_id in batch.iter() {
            match enrich_one(store, provider, game_id).await {
                Ok(EntryOutcome::Enriched { title, fields }) => {
                    log::debug!("Enriched {} '{}': {}", game_id, title, fields.join(", "));
                    summary.enriched += 1;
                    emit(EnrichEvent::Enriched {
                        game_id,
                        title,
                        fields,
                    });
                }
                Ok(EntryOutcome::NotFound { title }) => {
                    log::debug!("No match for {} '{}'", game_id, title);
                    summary.not_found += 1;
                    summary
                        .errors
                        .push(format!("game {game_id} ({title}): no match"));
                    emit(EnrichEvent::NotFound { game_id, title });
                }
                Err(e) => {
                    let message = format!("game {game_id}: {e}");
                    summary.failed += 1;
                    summary.errors.push(message.clone());
                    if e.is_fatal() {
                        log::error!("Aborting enrichment: {}", e);
                        summary.aborted = true;
                        emit(EnrichEvent::Aborted { error: message });
                        break 'batches;
                    }
                    log::warn!("{}", message);
                    emit(EnrichEvent::Failed {
                        game_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if index + 1 < batches.len() {
            emit(EnrichEvent::Pausing {
                delay: options.delay,
            });
            tokio::time::sleep(options.delay).await;
        }
    }

    log::info!(
        "Enrichment {} via {}: {} enriched, {} not found, {} failed of {}",
        if summary.aborted { "aborted" } else { "finished" },
        provider.name(),
        summary.enriched,
        summary.not_found,
        summary.failed,
        summary.total
    );
    emit(EnrichEvent::Done {
        summary: summary.clone(),
    });
    summary
}

async fn enrich_one(
    store: &dyn CatalogStore,
    provider: &dyn MetadataProvider,
    game_id: i64,
) -> Result<EntryOutcome, EnrichError> {
    let entry = store
        .entry(game_id)?
        .ok_or(EnrichError::GameNotFound(game_id))?;
    let platform_name = store
        .platform(&entry.platform_id)?
        .map(|p| p.name)
        .unwrap_or_else(|| entry.platform_id.clone());

    let results = provider.search(&entry.title, Some(&platform_name)).await?;
    let Some(best) = results.first() else {
        return Ok(EntryOutcome::NotFound { title: entry.title });
    };

    let patch = MetadataPatch::from_envelope(best);
    let fields = patch.field_names();
    if !patch.is_empty() {
        store.apply_metadata(game_id, &patch)?;
    }
    Ok(EntryOutcome::Enriched {
        title: entry.title,
        fields,
    })
}
