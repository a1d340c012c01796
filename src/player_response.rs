use chrono::NaiveDate;
use std::time::Duration;

use crate::constants::{PLAYABILITY_OK, PUBLISH_DATE_FORMAT};
use crate::structs::{ExtractionIssue, Partial, PlayerResponse, VideoError};

/// Fields of [`crate::VideoInfo`] supplied by a player response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDetails {
    pub title: String,
    pub uploader: String,
    pub duration: Option<Duration>,
    pub publish_date: Option<NaiveDate>,
    pub keywords: Vec<String>,
    pub short_description: Option<String>,
    pub dash_manifest_url: Option<String>,
    pub hls_manifest_url: Option<String>,
}

/// Decode a player response JSON string. A present but undecodable payload is fatal.
pub fn parse_player_response(raw: &str) -> Result<PlayerResponse, VideoError> {
    serde_json::from_str(raw).map_err(|source| VideoError::MalformedResponse {
        what: "player response",
        source,
    })
}

impl PlayerResponse {
    /// Fails unless `playabilityStatus.status` is `OK`. A missing status counts as a failure.
    pub fn check_playability(&self) -> Result<(), VideoError> {
        let status = self.playability_status.as_ref();

        if status.and_then(|x| x.status.as_deref()) == Some(PLAYABILITY_OK) {
            return Ok(());
        }

        Err(VideoError::VideoUnavailable {
            code: None,
            reason: status
                .and_then(|x| x.reason.clone())
                .unwrap_or_else(|| "playability status not OK".to_string()),
        })
    }

    /// Muxed then adaptive format objects, undecoded
    pub fn format_values(&self) -> (&[serde_json::Value], &[serde_json::Value]) {
        match self.streaming_data.as_ref() {
            Some(data) => (data.formats.as_slice(), data.adaptive_formats.as_slice()),
            None => (&[], &[]),
        }
    }
}

/// Read title, uploader, duration, publish date and manifests.
///
/// A non-numeric `lengthSeconds` or a publish date not in `YYYY-MM-DD` form
/// leaves the field unset and is reported as an issue.
pub fn player_details(response: &PlayerResponse) -> Partial<PlayerDetails> {
    let mut partial = Partial::new(PlayerDetails::default());

    if let Some(details) = response.video_details.as_ref() {
        partial.value.title = details.title.clone().unwrap_or_default();
        partial.value.uploader = details.author.clone().unwrap_or_default();
        partial.value.keywords = details.keywords.clone().unwrap_or_default();
        partial.value.short_description =
            details.short_description.clone().filter(|x| !x.is_empty());

        if let Some(length) = details.length_seconds.as_deref() {
            match length.trim().parse::<u64>() {
                Ok(seconds) => partial.value.duration = Some(Duration::from_secs(seconds)),
                Err(_) => partial.note(ExtractionIssue::InvalidDuration(length.to_string())),
            }
        }
    }

    if let Some(data) = response.streaming_data.as_ref() {
        partial.value.dash_manifest_url = data.dash_manifest_url.clone();
        partial.value.hls_manifest_url = data.hls_manifest_url.clone();
    }

    let publish_date = response
        .micro_format
        .as_ref()
        .and_then(|x| x.player_micro_format_renderer.as_ref())
        .and_then(|x| x.publish_date.as_deref().or(x.upload_date.as_deref()));

    match publish_date {
        Some(date) => match parse_publish_date(date) {
            Some(date) => partial.value.publish_date = Some(date),
            None => partial.note(ExtractionIssue::InvalidPublishDate(date.to_string())),
        },
        None => partial.note(ExtractionIssue::MissingPublishDate),
    }

    partial
}

/// Only the exact `YYYY-MM-DD` layout is accepted
fn parse_publish_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, PUBLISH_DATE_FORMAT).ok()
}
