use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use romshelf_lib::Settings;
use romshelf_lib::settings::settings_path;
use romshelf_scraper::{CredentialSource, IgdbCredentials};

use crate::CliError;

fn mask_value(s: &str) -> String {
    match s.get(..2) {
        Some(prefix) if s.len() > 2 => format!("{}****", prefix),
        _ => "****".to_string(),
    }
}

fn describe_file(path: &Path) -> String {
    let state = if path.exists() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found)"
            .if_supports_color(Stdout, |t| t.dimmed())
            .to_string()
    };
    format!(
        "{} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        state
    )
}

/// Show effective settings and where each IGDB credential comes from.
pub(crate) fn run_config_show(settings: &Settings, db_path: &Path) -> Result<(), CliError> {
    log::info!("{}", "Settings".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Settings file: {}", describe_file(&settings_path()));
    log::info!("  Database:      {}", db_path.display());
    log::info!("  Server label:  {}", settings.scan.server_location);
    log::info!("  Extensions:    {}", settings.scan.extensions.join(" "));
    log::info!(
        "  Enrichment:    batches of {}, {}s apart, queue of {}",
        settings.enrich.batch_size,
        settings.enrich.delay_seconds,
        settings.enrich.queue_capacity
    );
    crate::log_blank();

    log::info!("{}", "IGDB credentials".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  Credentials file: {}",
        describe_file(&romshelf_scraper::config_path())
    );

    let sources = romshelf_scraper::credential_sources();
    // IgdbCredentials::load fails when a required field is missing; show what we can.
    let creds = IgdbCredentials::load().ok();
    let fields = [
        (
            "client_id",
            &sources.client_id,
            creds.as_ref().map(|c| c.client_id.clone()),
            false,
        ),
        (
            "client_secret",
            &sources.client_secret,
            creds.as_ref().map(|c| c.client_secret.clone()),
            true,
        ),
        (
            "token_url",
            &sources.token_url,
            creds.as_ref().map(|c| c.token_url.clone()),
            false,
        ),
        (
            "api_url",
            &sources.api_url,
            creds.as_ref().map(|c| c.api_url.clone()),
            false,
        ),
    ];

    for (name, source, value, secret) in fields {
        let source_str = format!("({})", source);
        match (source, value) {
            (CredentialSource::Missing, _) | (_, None) => {
                log::info!(
                    "  {:<14} {} {}",
                    name,
                    "-".if_supports_color(Stdout, |t| t.red()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            (_, Some(v)) => {
                let shown = if secret { mask_value(&v) } else { v };
                log::info!(
                    "  {:<14} {} {}",
                    name,
                    shown,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
    println!("{}", romshelf_scraper::config_path().display());
}

/// Write the default settings so they can be edited by hand.
pub(crate) fn run_config_init(force: bool) -> Result<(), CliError> {
    let path = settings_path();
    if path.exists() && !force {
        log::warn!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    Settings::default().save()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Save IGDB client credentials, keeping any custom endpoints already configured.
pub(crate) fn run_config_credentials(
    client_id: String,
    client_secret: String,
) -> Result<(), CliError> {
    let existing = IgdbCredentials::load().ok();
    let creds = IgdbCredentials {
        client_id,
        client_secret,
        token_url: existing
            .as_ref()
            .map(|c| c.token_url.clone())
            .unwrap_or_else(|| romshelf_scraper::credentials::DEFAULT_TOKEN_URL.to_string()),
        api_url: existing
            .map(|c| c.api_url)
            .unwrap_or_else(|| romshelf_scraper::credentials::DEFAULT_API_URL.to_string()),
    };
    let path = romshelf_scraper::save_to_file(&creds).map_err(CliError::config)?;
    log::info!(
        "Saved credentials to {}",
        path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}
