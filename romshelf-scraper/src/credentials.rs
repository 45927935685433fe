use std::path::PathBuf;

use crate::error::ProviderError;

pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const DEFAULT_API_URL: &str = "https://api.igdb.com/v4";

const ENV_CLIENT_ID: &str = "IGDB_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "IGDB_CLIENT_SECRET";
const ENV_TOKEN_URL: &str = "IGDB_TOKEN_URL";
const ENV_API_URL: &str = "IGDB_API_URL";

/// OAuth client credentials plus the endpoints they are used against.
#[derive(Debug, Clone)]
pub struct IgdbCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_url: String,
}

/// Where a credential field's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Hard-coded default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each credential field.
#[derive(Debug, PartialEq, Eq)]
pub struct CredentialSources {
    pub client_id: CredentialSource,
    pub client_secret: CredentialSource,
    pub token_url: CredentialSource,
    pub api_url: CredentialSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    igdb: Option<IgdbConfig>,
}

#[derive(Debug, Default, Clone, serde::Deserialize, serde::Serialize)]
struct IgdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
}

impl IgdbCredentials {
    /// Load credentials. Priority: env vars > config file > defaults.
    /// `client_id` and `client_secret` have no default.
    pub fn load() -> Result<Self, ProviderError> {
        Self::resolve(&env_var, load_config_file().as_ref())
    }

    fn resolve(
        env: &dyn Fn(&str) -> Option<String>,
        config: Option<&IgdbConfig>,
    ) -> Result<Self, ProviderError> {
        let client_id = env(ENV_CLIENT_ID)
            .or_else(|| config_field(config, |c| c.client_id.as_deref()))
            .ok_or_else(|| {
                ProviderError::Config(format!(
                    "Missing client_id. Set {ENV_CLIENT_ID} or add it to {}",
                    config_path().display()
                ))
            })?;

        let client_secret = env(ENV_CLIENT_SECRET)
            .or_else(|| config_field(config, |c| c.client_secret.as_deref()))
            .ok_or_else(|| {
                ProviderError::Config(format!(
                    "Missing client_secret. Set {ENV_CLIENT_SECRET} or add it to {}",
                    config_path().display()
                ))
            })?;

        let token_url = env(ENV_TOKEN_URL)
            .or_else(|| config_field(config, |c| c.token_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());

        let api_url = env(ENV_API_URL)
            .or_else(|| config_field(config, |c| c.api_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            client_id,
            client_secret,
            token_url,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> PathBuf {
    romshelf_lib::settings::config_dir().join("credentials.toml")
}

/// Save credentials to the config file, creating parent directories as needed.
///
/// Endpoints equal to the defaults are omitted. Returns the path written.
pub fn save_to_file(creds: &IgdbCredentials) -> Result<PathBuf, ProviderError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = ConfigFile {
        igdb: Some(IgdbConfig {
            client_id: Some(creds.client_id.clone()),
            client_secret: Some(creds.client_secret.clone()),
            token_url: (creds.token_url != DEFAULT_TOKEN_URL).then(|| creds.token_url.clone()),
            api_url: (creds.api_url != DEFAULT_API_URL).then(|| creds.api_url.clone()),
        }),
    };

    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| ProviderError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(&path, toml_str)?;
    Ok(path)
}

/// Determine where each credential field is coming from.
pub fn credential_sources() -> CredentialSources {
    sources_from(&env_var, load_config_file().as_ref())
}

fn sources_from(
    env: &dyn Fn(&str) -> Option<String>,
    config: Option<&IgdbConfig>,
) -> CredentialSources {
    let pick = |var: &'static str, in_config: bool, fallback: CredentialSource| {
        if env(var).is_some() {
            CredentialSource::EnvVar(var)
        } else if in_config {
            CredentialSource::ConfigFile
        } else {
            fallback
        }
    };

    let id = config_field(config, |c| c.client_id.as_deref()).is_some();
    let secret = config_field(config, |c| c.client_secret.as_deref()).is_some();
    let token = config_field(config, |c| c.token_url.as_deref()).is_some();
    let api = config_field(config, |c| c.api_url.as_deref()).is_some();

    CredentialSources {
        client_id: pick(ENV_CLIENT_ID, id, CredentialSource::Missing),
        client_secret: pick(ENV_CLIENT_SECRET, secret, CredentialSource::Missing),
        token_url: pick(ENV_TOKEN_URL, token, CredentialSource::Default),
        api_url: pick(ENV_API_URL, api, CredentialSource::Default),
    }
}

fn config_field(
    config: Option<&IgdbConfig>,
    field: impl Fn(&IgdbConfig) -> Option<&str>,
) -> Option<String> {
    config.and_then(|c| non_empty(field(c)))
}

fn env_var(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok().as_deref())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn load_config_file() -> Option<IgdbConfig> {
    let content = std::fs::read_to_string(config_path()).ok()?;
    match toml::from_str::<ConfigFile>(&content) {
        Ok(config) => config.igdb,
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", config_path().display(), e);
            None
        }
    }
}
