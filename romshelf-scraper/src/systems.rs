//! Platform name → IGDB platform id mapping, plus the loose name matching
//! used when a platform can't be scoped server-side.

/// Names and aliases (lowercase) for each IGDB platform id.
const PLATFORM_IDS: &[(&[&str], u32)] = &[
    // Nintendo
    (&["nes", "nintendo entertainment system", "famicom"], 18),
    (
        &["snes", "super nintendo entertainment system", "super nintendo", "super famicom"],
        19,
    ),
    (&["n64", "nintendo 64"], 4),
    (&["gc", "ngc", "gamecube", "nintendo gamecube"], 21),
    (&["wii", "nintendo wii"], 5),
    (&["gb", "game boy"], 33),
    (&["gbc", "game boy color"], 22),
    (&["gba", "game boy advance"], 24),
    (&["nds", "ds", "nintendo ds"], 20),
    (&["3ds", "nintendo 3ds"], 37),
    // Sony
    (&["ps1", "psx", "playstation", "sony playstation"], 7),
    (&["ps2", "playstation 2"], 8),
    (&["psp", "playstation portable"], 38),
    // Sega
    (&["sms", "master system", "sega master system"], 64),
    (
        &["genesis", "sega genesis", "mega drive", "sega mega drive", "sega mega drive/genesis"],
        29,
    ),
    (&["segacd", "sega cd", "mega-cd", "sega mega-cd"], 78),
    (&["32x", "sega 32x"], 30),
    (&["saturn", "sega saturn"], 32),
    (&["dreamcast", "sega dreamcast"], 23),
    (&["gg", "game gear", "sega game gear"], 35),
    // Microsoft
    (&["xbox", "microsoft xbox"], 11),
];

/// Look up the IGDB platform id for a platform name or alias (case-insensitive).
pub fn igdb_platform_id(name: &str) -> Option<u32> {
    let needle = name.trim().to_lowercase();
    PLATFORM_IDS
        .iter()
        .find(|(names, _)| names.contains(&needle.as_str()))
        .map(|(_, id)| *id)
}

/// Whether a platform name reported by the provider satisfies the
/// requested one: substring containment either way, or a family alias.
pub fn platform_matches(requested: &str, candidate: &str) -> bool {
    let requested = requested.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();
    if requested.is_empty() {
        return true;
    }
    if candidate.is_empty() {
        return false;
    }
    if candidate.contains(&requested) || requested.contains(&candidate) {
        return true;
    }

    match requested.as_str() {
        "nes" => {
            candidate.contains("nintendo")
                && candidate.contains("entertainment")
                && !candidate.contains("super")
        }
        "snes" => candidate.contains("super nintendo"),
        "genesis" => candidate.contains("mega drive"),
        "ps1" | "psx" => candidate.trim_start_matches("sony ") == "playstation",
        "gb" => candidate.contains("game boy"),
        _ => false,
    }
}
