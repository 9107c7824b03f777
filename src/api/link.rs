//! `Link` response header parsing.
//!
//! Zotero paginates list endpoints with RFC 8288 style headers:
//!
//! ```text
//! Link: <https://api.zotero.org/users/1/items?start=25>; rel="next", <...>; rel="last"
//! ```
//!
//! Segments are extracted by repeated matching rather than splitting on
//! commas, since the URLs are opaque and may themselves contain commas.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Relation name of the continuation link.
pub const REL_NEXT: &str = "next";

fn link_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    LINK_RE.get_or_init(|| {
        // Negated classes keep a malformed segment from swallowing its neighbour.
        Regex::new(r#"<([^>]*)>;\s*rel="([^"]*)""#).expect("link header regex is valid")
    })
}

/// Parse a `Link` header value into a map from relation name to URL.
///
/// Absent, empty or whitespace-only values produce an empty map. Segments
/// that do not match `<URL>; rel="REL"` are skipped. When a relation appears
/// more than once the last occurrence wins.
pub fn parse_link_header(value: Option<&str>) -> HashMap<String, String> {
    let mut links = HashMap::new();

    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return links,
    };

    for caps in link_regex().captures_iter(value) {
        links.insert(caps[2].to_string(), caps[1].to_string());
    }

    links
}
