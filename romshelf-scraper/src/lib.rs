//! Metadata provider adapter for an IGDB-style search API.
//!
//! Authenticates with OAuth2 client credentials, builds Apicalypse search
//! bodies, and maps results into [`romshelf_catalog::MetadataEnvelope`]s.

pub mod client;
pub mod credentials;
pub mod error;
pub mod mapping;
pub mod provider;
pub mod query;
pub mod systems;
pub mod token;
pub mod types;

pub use client::IgdbClient;
pub use credentials::{
    CredentialSource, CredentialSources, IgdbCredentials, config_path, credential_sources,
    save_to_file,
};
pub use error::ProviderError;
pub use provider::MetadataProvider;
pub use systems::{igdb_platform_id, platform_matches};
pub use token::{CachedToken, TokenManager, TokenSource};
