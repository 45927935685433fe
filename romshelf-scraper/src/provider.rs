use async_trait::async_trait;
use romshelf_catalog::MetadataEnvelope;

use crate::error::ProviderError;

/// A source of descriptive metadata for catalog entries.
///
/// One implementation is selected per deployment; the enrichment job only
/// sees this trait.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search by title, optionally narrowed to a platform display name.
    ///
    /// Results are ordered by relevance. No match is an empty vector.
    async fn search(
        &self,
        title: &str,
        platform: Option<&str>,
    ) -> Result<Vec<MetadataEnvelope>, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
