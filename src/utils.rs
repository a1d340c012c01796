use scraper::{Html, Selector};
use serde::{Deserialize, Deserializer};

use crate::constants::{
    HTML5PLAYER_REGEX, SHORT_LINK_DOMAINS, VALID_QUERY_DOMAINS, VIDEO_ID_REGEX,
};

/// Excavate video id from `/watch?v=ID`, `/embed/ID` and `youtu.be/ID` urls or a bare id
pub fn get_video_id(url: &str) -> Option<String> {
    let url = url.trim();

    if validate_id(url) {
        Some(url.to_string())
    } else if url.starts_with("https://") || url.starts_with("http://") {
        get_url_video_id(url)
    } else {
        None
    }
}

pub fn validate_id(id: &str) -> bool {
    VIDEO_ID_REGEX.is_match(id.trim())
}

fn get_url_video_id(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let id = if VALID_QUERY_DOMAINS.contains(&host) {
        if parsed.path() == "/watch" {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.to_string())
        } else {
            parsed
                .path()
                .strip_prefix("/embed/")
                .map(|x| x.trim_end_matches('/').to_string())
        }
    } else if SHORT_LINK_DOMAINS.contains(&host) {
        parsed
            .path()
            .strip_prefix('/')
            .filter(|x| !x.is_empty())
            .map(|x| x.to_string())
    } else {
        None
    };

    id.filter(|x| validate_id(x))
}

/// Player script location from the watch page, if it exposes one
pub fn get_html5player(body: &str) -> Option<String> {
    let caps = HTML5PLAYER_REGEX.captures(body)?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|x| x.as_str().replace("\\/", "/"))
        .filter(|x| !x.is_empty())
}

/// Locate `<marker>{...}` inside the page scripts and return the JSON object text
pub fn find_embedded_json(page: &str, markers: &[&str]) -> Option<String> {
    let document = Html::parse_document(page);
    let scripts_selector = Selector::parse("script").ok()?;

    document.select(&scripts_selector).find_map(|script| {
        let text = script.text().collect::<String>();
        markers.iter().find_map(|marker| {
            let start = text.find(marker)? + marker.len();
            cut_after_js(text[start..].trim_start())
        })
    })
}

/// Cut the first balanced JSON object or array off the start of `mixed_json`,
/// ignoring brackets inside string constants
pub fn cut_after_js(mixed_json: &str) -> Option<String> {
    let (open, close) = match mixed_json.chars().next()? {
        '[' => ('[', ']'),
        '{' => ('{', '}'),
        _ => {
            return None;
        }
    };

    // Quote character of the string constant we are in
    let mut quote: Option<char> = None;

    // States if the current character is escaped or not
    let mut is_escaped = false;

    // Current open brackets to be closed
    let mut counter = 0usize;

    for (i, value) in mixed_json.char_indices() {
        if let Some(quote_char) = quote {
            if is_escaped {
                is_escaped = false;
            } else if value == '\\' {
                is_escaped = true;
            } else if value == quote_char {
                quote = None;
            }
            continue;
        }

        match value {
            '"' | '\'' | '`' => quote = Some(value),
            x if x == open => counter += 1,
            x if x == close => {
                counter -= 1;
                if counter == 0 {
                    return Some(mixed_json[..i + value.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Text of a `{"simpleText": ..}` or `{"runs": [{"text": ..}, ..]}` node
pub fn get_text(obj: &serde_json::Value) -> Option<String> {
    if let Some(simple_text) = obj.get("simpleText").and_then(|x| x.as_str()) {
        return Some(simple_text.to_string());
    }

    let runs = obj.get("runs")?.as_array()?;
    Some(
        runs.iter()
            .filter_map(|x| x.get("text").and_then(|x| x.as_str()))
            .collect(),
    )
}

/// Every value stored under `key`, at any depth, in document order
pub fn find_key_all<'a>(value: &'a serde_json::Value, key: &str) -> Vec<&'a serde_json::Value> {
    let mut found = vec![];
    collect_key(value, key, &mut found);
    found
}

fn collect_key<'a>(value: &'a serde_json::Value, key: &str, found: &mut Vec<&'a serde_json::Value>) {
    match value {
        serde_json::Value::Object(map) => {
            for (name, child) in map {
                if name == key {
                    found.push(child);
                }
                collect_key(child, key, found);
            }
        }
        serde_json::Value::Array(items) => {
            for child in items {
                collect_key(child, key, found);
            }
        }
        _ => {}
    }
}

/// Accept `"100"`, `100` or `null` for string fields of the legacy player config
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(x)) => Some(x),
            Some(serde_json::Value::Number(x)) => Some(x.to_string()),
            Some(serde_json::Value::Bool(x)) => Some(x.to_string()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        },
    )
}
