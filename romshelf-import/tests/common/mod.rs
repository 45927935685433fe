#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use romshelf_catalog::types::*;
use romshelf_db::{CatalogStore, OperationError, SqliteCatalog};
use romshelf_scraper::{MetadataProvider, ProviderError};
use tokio::sync::Notify;

pub enum Scripted {
    Hits(Vec<MetadataEnvelope>),
    AuthFailure,
    ServerFailure,
}

/// Provider answering from a title-keyed script. Unscripted titles get no results.
#[derive(Default)]
pub struct FakeProvider {
    script: HashMap<String, Scripted>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    gate: Option<std::sync::Arc<Notify>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, title: &str, response: Scripted) -> Self {
        self.script.insert(title.to_string(), response);
        self
    }

    /// Block every search until the gate is notified.
    pub fn gated(mut self, gate: std::sync::Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn search(
        &self,
        title: &str,
        platform: Option<&str>,
    ) -> Result<Vec<MetadataEnvelope>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), platform.map(str::to_string)));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.script.get(title) {
            Some(Scripted::Hits(hits)) => Ok(hits.clone()),
            Some(Scripted::AuthFailure) => Err(ProviderError::Auth("token rejected".to_string())),
            Some(Scripted::ServerFailure) => Err(ProviderError::ServerError {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub fn envelope(description: &str, cover: &str) -> MetadataEnvelope {
    MetadataEnvelope {
        description: Some(description.to_string()),
        cover_art_url: Some(cover.to_string()),
        rating: Some(8.0),
        ..Default::default()
    }
}

/// Wraps a real store but fails every metadata write.
pub struct ReadOnlyStore(pub SqliteCatalog);

impl CatalogStore for ReadOnlyStore {
    fn platform(&self, id: &str) -> Result<Option<Platform>, OperationError> {
        self.0.platform(id)
    }
    fn find_entry(
        &self,
        title: &str,
        platform_id: &str,
    ) -> Result<Option<CatalogEntry>, OperationError> {
        self.0.find_entry(title, platform_id)
    }
    fn create_entry(&self, title: &str, platform_id: &str) -> Result<CatalogEntry, OperationError> {
        self.0.create_entry(title, platform_id)
    }
    fn entry(&self, id: i64) -> Result<Option<CatalogEntry>, OperationError> {
        self.0.entry(id)
    }
    fn attach_file(
        &self,
        game_id: i64,
        file: &NewFileLocation,
    ) -> Result<FileLocation, OperationError> {
        self.0.attach_file(game_id, file)
    }
    fn file_location_exists(
        &self,
        file_path: &str,
        file_hash: &str,
    ) -> Result<bool, OperationError> {
        self.0.file_location_exists(file_path, file_hash)
    }
    fn hashed_file_locations(&self) -> Result<Vec<FileLocation>, OperationError> {
        self.0.hashed_file_locations()
    }
    fn entries_missing_metadata(&self) -> Result<Vec<i64>, OperationError> {
        self.0.entries_missing_metadata()
    }
    fn apply_metadata(&self, _id: i64, _patch: &MetadataPatch) -> Result<(), OperationError> {
        Err(OperationError::LockPoisoned)
    }
}
