#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use rusty_ytinfo::{FetchError, Fetcher};
use serde_json::{json, Value};

pub const VIDEO_ID: &str = "dQw4w9WgXcQ";
pub const VIDEO_INFO_URL: &str = "https://www.youtube.com/get_video_info";
pub const WATCH_URL: &str = "https://www.youtube.com/watch";
pub const PLAYER_JS: &str = "/yts/jsbin/player_ias-vflRCamp0/en_US/base.js";

enum Reply {
    Body(Bytes),
    Status(StatusCode),
}

/// In-memory [`Fetcher`] answering by url prefix and recording every request
#[derive(Default)]
pub struct MockFetcher {
    routes: Vec<(String, Reply)>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, body: impl Into<Bytes>) -> Self {
        self.routes.push((prefix.to_string(), Reply::Body(body.into())));
        self
    }

    pub fn route_status(mut self, prefix: &str, status: StatusCode) -> Self {
        self.routes.push((prefix.to_string(), Reply::Status(status)));
        self
    }

    /// Every request sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|x| x.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.routes.iter().find(|(prefix, _)| url.starts_with(prefix)) {
            Some((_, Reply::Body(body))) => Ok(body.clone()),
            Some((_, Reply::Status(status))) => Err(FetchError::Status(*status)),
            None => Err(FetchError::Status(StatusCode::NOT_FOUND)),
        }
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// One URL-query-encoded stream map segment
pub fn stream_entry(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn muxed_entry(itag: u64, quality: &str) -> String {
    stream_entry(&[
        ("itag", &itag.to_string()),
        (
            "url",
            &format!("https://r4.googlevideo.com/videoplayback?itag={itag}&id=o-legacy"),
        ),
        ("type", r#"video/mp4; codecs="avc1.42001E, mp4a.40.2""#),
        ("quality", quality),
    ])
}

pub fn adaptive_entry(itag: u64) -> String {
    stream_entry(&[
        ("itag", &itag.to_string()),
        (
            "url",
            &format!("https://r4.googlevideo.com/videoplayback?itag={itag}&id=o-legacy"),
        ),
        ("type", r#"audio/mp4; codecs="mp4a.40.2""#),
        ("clen", "3433514"),
        ("init", "0-591"),
        ("index", "592-1027"),
    ])
}

/// Watch page embedding a legacy `ytplayer.config` with the given args
pub fn legacy_page(args: Value) -> String {
    let config = json!({"args": args, "assets": {"js": PLAYER_JS}});

    format!(
        r#"<!DOCTYPE html><html><head><script>var ytplayer = ytplayer || {{}};ytplayer.config = {config};ytplayer.web_player_context_config = {{}};</script></head><body></body></html>"#
    )
}

/// Watch page in the current shape, no legacy config
pub fn modern_page(initial_data: Option<&Value>, player_response: Option<&Value>) -> String {
    let mut scripts = String::new();

    if let Some(player_response) = player_response {
        scripts += &format!(
            r#"<script nonce="a1">var ytInitialPlayerResponse = {player_response};var meta = document.createElement('meta');</script>"#
        );
    }
    if let Some(initial_data) = initial_data {
        scripts += &format!(r#"<script nonce="a2">var ytInitialData = {initial_data};</script>"#);
    }
    scripts += r#"<script>ytcfg.set({"jsUrl":"\/s\/player\/9f4e2a6c\/player_ias.vflset\/en_US\/base.js"});</script>"#;

    format!("<!DOCTYPE html><html><body>{scripts}</body></html>")
}

/// URL-query-encoded video info endpoint body
pub fn video_info_body(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

pub fn player_response(length_seconds: &str, publish_date: &str) -> Value {
    json!({
        "playabilityStatus": {"status": "OK", "playableInEmbed": true},
        "streamingData": {
            "expiresInSeconds": "21540",
            "hlsManifestUrl": "https://manifest.googlevideo.com/api/manifest/hls_variant/id/1",
            "formats": [{
                "itag": 22,
                "url": "https://r4.googlevideo.com/videoplayback?itag=22&id=o-modern",
                "mimeType": "video/mp4; codecs=\"avc1.64001F, mp4a.40.2\"",
                "bitrate": 1_500_000,
                "width": 1280,
                "height": 720,
                "lastModified": "1569054813011249",
                "quality": "hd720",
                "qualityLabel": "720p",
                "fps": 25,
                "audioQuality": "AUDIO_QUALITY_MEDIUM",
                "audioSampleRate": "44100",
                "audioChannels": 2,
                "approxDurationMs": "212091"
            }],
            "adaptiveFormats": [{
                "itag": 251,
                "signatureCipher": "s=AOq0QJ8wRgIhAJ&sp=sig&url=https%3A%2F%2Fr4.googlevideo.com%2Fvideoplayback%3Fitag%3D251",
                "mimeType": "audio/webm; codecs=\"opus\"",
                "bitrate": 160_000,
                "averageBitrate": 129_003,
                "initRange": {"start": "0", "end": "265"},
                "indexRange": {"start": "266", "end": "617"},
                "contentLength": "3437753",
                "audioQuality": "AUDIO_QUALITY_MEDIUM",
                "audioSampleRate": "48000",
                "audioChannels": 2,
                "approxDurationMs": "212061"
            }]
        },
        "videoDetails": {
            "videoId": VIDEO_ID,
            "title": "Rick Astley - Never Gonna Give You Up (Official Music Video)",
            "lengthSeconds": length_seconds,
            "keywords": ["rick astley", "Never Gonna Give You Up"],
            "author": "Rick Astley",
            "shortDescription": "The official video for “Never Gonna Give You Up” by Rick Astley"
        },
        "microformat": {"playerMicroformatRenderer": {
            "publishDate": publish_date,
            "uploadDate": publish_date
        }}
    })
}

fn metadata_row(title: &str, value: &str) -> Value {
    json!({
        "metadataRowRenderer": {
            "title": {"simpleText": title},
            "contents": [{"runs": [{"text": value}]}]
        }
    })
}

pub fn initial_data(description: Option<&str>) -> Value {
    let mut renderer = json!({
        "metadataRowContainer": {"metadataRowContainerRenderer": {"rows": [
            metadata_row("Song", "Never Gonna Give You Up"),
            metadata_row("Artist", "Rick Astley"),
            metadata_row("Album", "Whenever You Need Somebody"),
            metadata_row("Writers", "Mike Stock, Matt Aitken, Pete Waterman"),
            metadata_row("Licensed to YouTube by", "SME"),
        ]}}
    });

    if let Some(description) = description {
        renderer["description"] = json!({"runs": [{"text": description}]});
    }

    json!({
        "contents": {"twoColumnWatchNextResults": {"results": {"results": {"contents": [
            {"videoPrimaryInfoRenderer": {"title": {"runs": [{"text": "Never Gonna Give You Up"}]}}},
            {"videoSecondaryInfoRenderer": renderer}
        ]}}}}
    })
}
