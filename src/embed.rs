//! Rewrites talk page URLs into embeddable player URLs.

use std::sync::LazyLock;

use regex::Regex;

/// `https://www.ted.com/talks/<slug>` with optional scheme/host variations
/// and an optional trailing slash, query string or fragment.
static TALK_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?ted\.com/talks/([A-Za-z0-9_\-]+)/?(?:[?#].*)?$")
        .expect("talk page pattern is valid")
});

/// Embeddable player URL for a talk.
///
/// Talk pages become `https://embed.ted.com/talks/<slug>?subtitle=<lang>`;
/// any other URL is returned unchanged. A missing or blank URL yields an
/// empty string.
pub fn embed_url_for(url: Option<&str>, subtitle: &str) -> String {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return String::new();
    };

    match TALK_PAGE.captures(url) {
        Some(caps) => format!(
            "https://embed.ted.com/talks/{}?subtitle={subtitle}",
            &caps[1]
        ),
        None => url.to_string(),
    }
}
