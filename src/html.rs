//! Low-level HTML string helpers.
//!
//! Naive string-level helpers sized for the WordPress markup of the scenario
//! site. No DOM is built.
//! Tag and attribute names are matched case-insensitively; ASCII lowercasing
//! keeps byte offsets stable so slices of the lowered copy map back onto the
//! original string.

use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_TAG_WITH_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<(?P<tag>[a-z][a-z0-9]*)\b[^>]*?\sclass\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s>]+))[^>]*>"#,
    )
    .expect("Failed to compile class tag regex")
});

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<a\b(?P<attrs>[^>]*)>(?P<inner>.*?)</a\s*>")
        .expect("Failed to compile anchor regex")
});

static HREF_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s>]+))"#)
        .expect("Failed to compile href regex")
});

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?P<body>#[xX][0-9a-fA-F]+|#\d+|[a-zA-Z]+);")
        .expect("Failed to compile entity regex")
});

/// An `<a>` element: raw `href` and its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Inner HTML of the first element whose `class` attribute contains `class`
/// as a whole token, up to its matching closing tag (nesting-aware).
pub fn inner_html_by_class<'a>(html: &'a str, class: &str) -> Option<&'a str> {
    let lc = html.to_ascii_lowercase();

    for caps in OPEN_TAG_WITH_CLASS.captures_iter(html) {
        let classes = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("bare"))
            .map(|m| m.as_str())
            .unwrap_or("");
        if !classes.split_whitespace().any(|c| c == class) {
            continue;
        }

        let tag = caps["tag"].to_ascii_lowercase();
        let open_end = caps.get(0)?.end();
        let close_start = matching_close(&lc, &tag, open_end)?;
        return Some(&html[open_end..close_start]);
    }

    None
}

/// Byte offset of the `</tag` closing the element whose content starts at `from`.
fn matching_close(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let next_close = find_tag(lc, &close, pos)?;
        match find_tag(lc, &open, pos) {
            Some(o) if o < next_close => {
                depth += 1;
                pos = o + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                pos = next_close + close.len();
            }
        }
    }
}

/// Next `prefix` (`<div`, `</div`) at or after `from` that ends the tag
/// name, so `</div` does not match `</divider>`.
fn find_tag(lc: &str, prefix: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let at = lc[pos..].find(prefix)? + pos;
        if is_tag_name_end(lc.as_bytes().get(at + prefix.len()).copied()) {
            return Some(at);
        }
        pos = at + prefix.len();
    }
}

fn is_tag_name_end(b: Option<u8>) -> bool {
    matches!(b, Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r'))
}

/// All anchors in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    ANCHOR
        .captures_iter(html)
        .map(|caps| {
            let href = HREF_ATTR
                .captures(&caps["attrs"])
                .and_then(|h| {
                    h.name("dq")
                        .or_else(|| h.name("sq"))
                        .or_else(|| h.name("bare"))
                })
                .map(|m| decode_entities(m.as_str().trim()))
                .unwrap_or_default();
            Anchor {
                href,
                text: visible_text(&caps["inner"]),
            }
        })
        .collect()
}

/// Tags removed, entities decoded, whitespace collapsed.
pub fn visible_text(fragment: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(fragment)))
}

/// Remove all `<...>` tags.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode numeric entities and the handful of named ones WordPress emits.
pub fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let body = &caps["body"];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('–'),
                    "mdash" => Some('—'),
                    "rsquo" => Some('’'),
                    "lsquo" => Some('‘'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Collapse runs of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last non-empty path segment of a URL, ignoring query and fragment.
///
/// `https://site/index.php/the-blob/` → `the-blob`
pub fn slug_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment.contains(':') {
        None
    } else {
        Some(segment.to_string())
    }
}
