//! Extraction of holiday names from the holiday page markup.
//!
//! Holiday names are the text content of elements carrying
//! `itemprop="text"`. Elements of that kind never nest on the page, so the
//! content runs up to the first closing tag with the same name.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn open_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*?\sitemprop\s*=\s*(?:"text"|'text')[^>]*>"#)
            .expect("valid itemprop regex")
    })
}

fn inner_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"))
}

/// Extract distinct holiday names in page order
pub fn parse_holidays(html: &str) -> Vec<String> {
    let lower = html.to_ascii_lowercase();
    let mut seen = HashSet::new();
    let mut holidays = Vec::new();

    for caps in open_tag_re().captures_iter(html) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let start = whole.end();
        let closing = format!("</{}", tag.as_str().to_ascii_lowercase());
        let end = lower[start..]
            .find(&closing)
            .map(|offset| start + offset)
            .unwrap_or(html.len());

        let text = element_text(&html[start..end]);
        if text.is_empty() {
            continue;
        }
        if seen.insert(text.clone()) {
            holidays.push(text);
        }
    }

    holidays
}

/// Inner markup to plain text: tags stripped, entities decoded, whitespace collapsed
fn element_text(markup: &str) -> String {
    let stripped = inner_tag_re().replace_all(markup, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "laquo" => Some('«'),
        "raquo" => Some('»'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
