use std::sync::OnceLock;

use regex::Regex;

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]").expect("static pattern"))
}

fn extension() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[A-Za-z0-9]{1,5}$").expect("static pattern"))
}

/// Turn a file name into a search query.
///
/// Drops `[...]` tokens (download sites like to embed video ids there) and the
/// extension, then trims and collapses whitespace.
pub fn clean_song_name(file_name: &str) -> String {
    let without_ext = extension().replace(file_name.trim(), "");
    let without_tags = bracketed().replace_all(&without_ext, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}
