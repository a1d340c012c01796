use crate::constants::INITIAL_DATA_MARKERS;
use crate::structs::{ExtractionIssue, Partial};
use crate::utils::{find_embedded_json, find_key_all, get_text};

/// Description and music metadata rows read from `ytInitialData`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub description: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub writers: Option<String>,
}

/// Best-effort scan of the page for the description block and metadata rows.
/// Never fails, anything missing is reported as an issue.
pub fn extract_page_metadata(page: &str) -> Partial<PageMetadata> {
    let mut partial = Partial::new(PageMetadata::default());

    let Some(raw) = find_embedded_json(page, INITIAL_DATA_MARKERS) else {
        partial.note(ExtractionIssue::MetadataUnavailable(
            "ytInitialData not found".to_string(),
        ));
        return partial;
    };

    let initial_data: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(x) => x,
        Err(err) => {
            partial.note(ExtractionIssue::MetadataUnavailable(format!(
                "unable to parse ytInitialData: {err}"
            )));
            return partial;
        }
    };

    match get_description(&initial_data) {
        Some(description) => partial.value.description = Some(description),
        None => partial.note(ExtractionIssue::MissingDescription),
    }

    let rows = get_metadata_rows(&initial_data);
    if rows.is_empty() {
        partial.note(ExtractionIssue::MissingMetadataRows);
    }

    for (title, value) in rows {
        let field = match title.as_str() {
            "Artist" => &mut partial.value.artist,
            "Song" => &mut partial.value.song,
            "Album" => &mut partial.value.album,
            "Writers" => &mut partial.value.writers,
            _ => continue,
        };
        *field = Some(value);
    }

    partial
}

/// Concatenated `text` runs below `videoSecondaryInfoRenderer.description`
fn get_description(initial_data: &serde_json::Value) -> Option<String> {
    let renderer = find_key_all(initial_data, "videoSecondaryInfoRenderer")
        .into_iter()
        .next()?;

    if let Some(description) = renderer.get("description") {
        let text: String = find_key_all(description, "text")
            .into_iter()
            .filter_map(|x| x.as_str())
            .collect();
        if !text.is_empty() {
            return Some(text);
        }
        return get_text(description);
    }

    renderer
        .get("attributedDescription")
        .and_then(|x| x.get("content"))
        .and_then(|x| x.as_str())
        .map(|x| x.to_string())
}

/// `(title, value)` of every `metadataRowContainer.*.rows[*].metadataRowRenderer`
fn get_metadata_rows(initial_data: &serde_json::Value) -> Vec<(String, String)> {
    find_key_all(initial_data, "metadataRowContainer")
        .into_iter()
        .filter_map(|x| x.as_object())
        .flat_map(|container| container.values())
        .filter_map(|x| x.get("rows").and_then(|x| x.as_array()))
        .flatten()
        .filter_map(|row| row.get("metadataRowRenderer"))
        .filter_map(|renderer| {
            let title = renderer.get("title").and_then(get_text)?;
            let value = renderer
                .get("contents")
                .and_then(|x| x.as_array())
                .and_then(|x| x.first())
                .and_then(get_text)?;
            Some((title, value))
        })
        .collect()
}
