//! Compact `data:image/svg+xml` URIs.
//!
//! SVG is text, so base64 would only make it bigger. Instead whitespace is
//! collapsed, double quotes become single quotes (so the URI can sit inside
//! `url("...")`), and only characters that are unsafe in a URL get escaped.
//! Space, `=`, `:` and `/` stay readable. Escapes use lowercase hex, which
//! gzips better next to SVG markup.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::sync::LazyLock;

/// Characters escaped in the URI body. Mirrors `encodeURIComponent`, minus
/// the readable extras.
const SVG_URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b' ')
    .remove(b'=')
    .remove(b':')
    .remove(b'/');

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const PREFIX: &str = "data:image/svg+xml,";

/// Encode SVG markup as a data URI.
pub fn svg_to_data_uri(svg: &str) -> String {
    let collapsed = WHITESPACE.replace_all(svg.trim(), " ");
    let quoted = collapsed.replace('"', "'");
    let encoded = utf8_percent_encode(&quoted, SVG_URI).to_string();
    let mut out = String::with_capacity(PREFIX.len() + encoded.len());
    out.push_str(PREFIX);
    let mut chars = encoded.chars();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '%' {
            out.extend(chars.by_ref().take(2).map(|h| h.to_ascii_lowercase()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_characters_survive() {
        let uri = svg_to_data_uri(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
        assert_eq!(
            uri,
            "data:image/svg+xml,%3csvg xmlns='http://www.w3.org/2000/svg'/%3e"
        );
    }

    #[test]
    fn whitespace_collapsed_and_trimmed() {
        let uri = svg_to_data_uri("\n  <svg>\n\t<g/>  </svg>\n");
        assert_eq!(uri, "data:image/svg+xml,%3csvg%3e %3cg/%3e %3c/svg%3e");
    }

    #[test]
    fn hash_and_percent_escaped_lowercase() {
        let uri = svg_to_data_uri(r##"<path fill="#ABC" d="M0 0%"/>"##);
        assert!(uri.contains("fill='%23ABC'"));
        assert!(uri.contains("0%25"));
    }

    #[test]
    fn placeholder_tokens_not_escaped() {
        let uri = svg_to_data_uri(r#"<path fill="___color___"/>"#);
        assert!(uri.contains("fill='___color___'"));
    }

    #[test]
    fn non_ascii_is_utf8_encoded() {
        assert!(svg_to_data_uri("<text>é</text>").contains("%c3%a9"));
    }
}
