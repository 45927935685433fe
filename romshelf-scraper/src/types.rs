use serde::Deserialize;

/// OAuth2 token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

/// One game from the `/games` endpoint, limited to the fields we request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IgdbGame {
    pub id: u64,
    pub name: Option<String>,
    pub summary: Option<String>,
    /// Critic + user aggregate, 0-100.
    pub total_rating: Option<f64>,
    /// User rating, 0-100.
    pub rating: Option<f64>,
    /// Unix seconds.
    pub first_release_date: Option<i64>,
    pub genres: Vec<NamedRef>,
    pub platforms: Vec<NamedRef>,
    pub cover: Option<ImageRef>,
}

/// An expanded reference such as `genres.name`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub id: u64,
    /// Protocol-relative thumbnail URL, e.g. `//images.igdb.com/.../t_thumb/co1abc.jpg`.
    pub url: String,
}
