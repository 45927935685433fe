//! The ingestion pipeline: scan directories into the catalog, report
//! duplicate files, and backfill missing metadata from a provider.
//!
//! Scanning and duplicate detection are synchronous. Enrichment runs as a
//! background job owned by a [`JobQueue`].

pub mod duplicates;
pub mod enrich;
pub mod jobs;
pub mod progress;
pub mod scan_import;

pub use duplicates::{DuplicateReport, find_duplicates, group_duplicates};
pub use enrich::{
    EnrichError, EnrichEvent, EnrichOptions, EnrichRequest, EnrichSummary, run_enrichment,
    select_targets,
};
pub use jobs::{EnrichAccepted, JobError, JobQueue, JobStatus, QueueConfig};
pub use progress::{LogScanProgress, ScanProgress, SilentScanProgress};
pub use scan_import::{
    MatchOutcome, RescanPolicy, ScanError, ScanOptions, ScanRequest, ScanResult, match_file,
    scan_directory,
};
