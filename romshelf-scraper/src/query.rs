//! Apicalypse request bodies for the `/games` endpoint.

/// Fields projected from every search.
pub const GAME_FIELDS: &str =
    "name,summary,total_rating,rating,first_release_date,genres.name,platforms.name,cover.url";

/// Result limit when the platform is filtered server-side.
pub const SCOPED_LIMIT: u32 = 10;
/// Result limit when filtering happens client-side.
pub const UNSCOPED_LIMIT: u32 = 50;

/// Build a search body, optionally scoped to one IGDB platform id.
///
/// ```
/// use romshelf_scraper::query::build_search_query;
///
/// assert_eq!(
///     build_search_query("Zelda", Some(18)),
///     "search \"Zelda\"; fields name,summary,total_rating,rating,first_release_date,\
///      genres.name,platforms.name,cover.url; where platforms = (18); limit 10;"
/// );
/// ```
pub fn build_search_query(title: &str, platform_id: Option<u32>) -> String {
    let mut body = format!("search \"{}\"; fields {};", escape_search(title), GAME_FIELDS);
    match platform_id {
        Some(id) => body.push_str(&format!(" where platforms = ({id}); limit {SCOPED_LIMIT};")),
        None => body.push_str(&format!(" limit {UNSCOPED_LIMIT};")),
    }
    body
}

/// Escape a title for use inside a double-quoted Apicalypse string.
pub fn escape_search(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' | '\t' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}
