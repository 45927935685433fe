//! Converting provider records into [`MetadataEnvelope`]s.

use chrono::{DateTime, Datelike};
use romshelf_catalog::MetadataEnvelope;

use crate::types::IgdbGame;

const COVER_SIZE: &str = "t_cover_big";
const BOX_ART_SIZE: &str = "t_1080p";

pub fn to_envelope(game: &IgdbGame) -> MetadataEnvelope {
    let cover = game.cover.as_ref().map(|c| c.url.as_str()).filter(|u| !u.is_empty());
    MetadataEnvelope {
        title: game.name.clone(),
        description: game.summary.clone(),
        rating: game.total_rating.or(game.rating).and_then(scale_rating),
        genre: game
            .genres
            .first()
            .map(|g| g.name.clone())
            .filter(|g| !g.is_empty()),
        year: game.first_release_date.and_then(release_year),
        cover_art_url: cover.map(|u| image_url(u, COVER_SIZE)),
        box_art_url: cover.map(|u| image_url(u, BOX_ART_SIZE)),
        provider_id: (game.id > 0).then(|| game.id.to_string()),
    }
}

/// Rescale a 0-100 rating to 0-10 with one decimal place.
pub fn scale_rating(rating: f64) -> Option<f64> {
    if !rating.is_finite() || rating <= 0.0 {
        return None;
    }
    Some((rating.min(100.0)).round() / 10.0)
}

/// Calendar year (UTC) of a unix timestamp in seconds.
pub fn release_year(timestamp: i64) -> Option<i32> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.year())
}

/// Make an image URL absolute HTTPS and swap the thumbnail size token.
pub fn image_url(url: &str, size: &str) -> String {
    let absolute = if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else {
        url.to_string()
    };
    absolute.replace("t_thumb", size)
}

#[cfg(test)]
#[path = "tests/mapping_tests.rs"]
mod tests;
