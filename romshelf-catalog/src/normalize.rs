//! Canonical titles from noisy ROM filenames.
//!
//! Dump filenames carry tags that are not part of the game's title:
//! ```text
//! Super_Mario_World (USA) [!].sfc
//! ```
//! The normalizer strips the extension, turns `_` and `-` into spaces, removes
//! every `(...)` and `[...]` group (nested groups included), and collapses
//! whitespace. The result is used as the catalog identity together with the
//! platform, so it must be stable: normalizing a normalized title returns it
//! unchanged.
//!
//! Only suffixes that are known ROM or container extensions are stripped.
//! `Super.Mario.World.sfc` keeps its dotted words.

/// ROM, disc image and archive extensions recognized without a scan allow-list.
pub const ROM_EXTENSIONS: &[&str] = &[
    "rom", "bin", "iso", "cue", "img", "zip", "7z", "rar", "gz", "nes", "fds", "unf", "smc",
    "sfc", "fig", "swc", "gb", "gbc", "gba", "nds", "n64", "z64", "v64", "gen", "md", "smd",
    "sms", "gg", "32x", "pce", "ngp", "ngc", "ws", "wsc", "lnx", "a26", "a78", "col", "vb",
    "psx", "ps2", "pbp", "cso", "chd", "gdi", "cdi", "mdf", "nrg", "gcm", "rvz", "wbfs", "wad",
    "cia", "3ds", "xci", "nsp",
];

/// Whether `ext` (without the dot, any case) is in [`ROM_EXTENSIONS`].
pub fn is_rom_extension(ext: &str) -> bool {
    ROM_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Normalize a filename into a catalog title.
///
/// # Examples
///
/// ```
/// use romshelf_catalog::normalize::normalize_title;
///
/// assert_eq!(normalize_title("Super Mario World (USA) [!].sfc"), "Super Mario World");
/// assert_eq!(normalize_title("Game [Multi][v1.1](Proto).bin"), "Game");
/// assert_eq!(normalize_title("Mega_Man-X (Rev 1).smc"), "Mega Man X");
/// assert_eq!(normalize_title("Super.Mario.World.sfc"), "Super.Mario.World");
/// ```
pub fn normalize_title(filename: &str) -> String {
    normalize_title_with(filename, is_rom_extension)
}

/// Like [`normalize_title`], but `is_extension` decides which suffixes count
/// as file extensions. The scanner passes its allow-list here so custom
/// extensions are stripped too.
pub fn normalize_title_with(filename: &str, is_extension: impl Fn(&str) -> bool) -> String {
    let mut current = normalize_once(filename, &is_extension);
    // Each pass either shortens the string or leaves it unchanged, so this
    // converges in a handful of iterations.
    loop {
        let next = normalize_once(&current, &is_extension);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(name: &str, is_extension: &impl Fn(&str) -> bool) -> String {
    let stem = strip_extension(name, is_extension);
    let spaced: String = stem
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let stripped = strip_bracketed(&spaced);
    collapse_whitespace(&stripped)
}

/// Remove a trailing `.ext` when `is_extension(ext)` accepts it.
///
/// `Super Mario Bros.` and `Dr. Mario` are left alone.
fn strip_extension<'a>(name: &'a str, is_extension: &impl Fn(&str) -> bool) -> &'a str {
    let Some(dot) = name.rfind('.') else {
        return name;
    };
    if dot == 0 {
        return name;
    }
    let ext = &name[dot + 1..];
    if !ext.is_empty() && is_extension(ext) {
        &name[..dot]
    } else {
        name
    }
}

/// Drop everything inside `()` and `[]`, tracking each family's depth
/// separately. Unbalanced closers are discarded without underflowing.
fn strip_bracketed(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut paren_depth = 0u32;
    let mut bracket_depth = 0u32;

    for c in s.chars() {
        match c {
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            _ if paren_depth == 0 && bracket_depth == 0 => out.push(c),
            _ => {}
        }
    }

    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
