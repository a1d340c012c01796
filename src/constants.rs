use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

pub const BASE_URL: &str = "https://www.youtube.com/watch?v=";

/// Legacy metadata endpoint queried when the watch page carries no player config
pub const VIDEO_INFO_URL: &str = "https://www.youtube.com/get_video_info";

/// Referrer passed as `eurl` to [`VIDEO_INFO_URL`], the video id is appended
pub const VIDEO_EURL: &str = "https://youtube.googleapis.com/v/";

pub const THUMBNAIL_BASE_URL: &str = "http://img.youtube.com/vi/";

/// Calendar layout of `microformat.playerMicroformatRenderer.publishDate`
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d";

/// `status` value of the legacy argument bag marking an unavailable video
pub const STATUS_FAIL: &str = "fail";

/// `playabilityStatus.status` value of a playable video
pub const PLAYABILITY_OK: &str = "OK";

/// Query parameters appended to the watch page request
pub const WATCH_PAGE_PARAMS: &[(&str, &str)] = &[
    ("gl", "US"),
    ("hl", "en"),
    ("has_verified", "1"),
    ("bpctr", "9999999999"),
];

pub const VALID_QUERY_DOMAINS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

pub const SHORT_LINK_DOMAINS: &[&str] = &["youtu.be", "www.youtu.be"];

/// Assignment markers of the page-embedded `ytInitialData` object
pub const INITIAL_DATA_MARKERS: &[&str] = &[
    "window[\"ytInitialData\"] = ",
    "var ytInitialData = ",
    "ytInitialData = ",
];

/// Assignment markers of the page-embedded `ytInitialPlayerResponse` object
pub const INITIAL_PLAYER_RESPONSE_MARKERS: &[&str] = &[
    "window[\"ytInitialPlayerResponse\"] = ",
    "var ytInitialPlayerResponse = ",
    "ytInitialPlayerResponse = ",
];

pub(crate) static DEFAULT_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.101 Safari/537.36"));

    headers
});

/// Legacy `ytplayer.config = {...};ytplayer.` assignment
pub(crate) static PLAYER_CONFIG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ytplayer\.config = (.*?);ytplayer\.").expect("IMPOSSIBLE: player config regex")
});

pub(crate) static HTML5PLAYER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script\s+src="([^"]+)"(?:\s+type="text/javascript")?\s+name="player_ias/base"\s*>|"jsUrl":"([^"]+)""#)
        .expect("IMPOSSIBLE: html5player regex")
});

pub(crate) static VIDEO_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9-_]{11}$").expect("IMPOSSIBLE: video id regex"));

pub(crate) static IS_LIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bsource[/=]yt_live_broadcast\b").expect("IMPOSSIBLE: live regex")
});

pub(crate) static IS_HLS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/manifest/hls_(variant|playlist)/").expect("IMPOSSIBLE: hls regex")
});

pub(crate) static IS_DASH_MPD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/manifest/dash/").expect("IMPOSSIBLE: dash regex"));

/// Default max number of retries for a web reqwest.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_config_regex_is_lazy() {
        let html = r#"<script>var ytplayer = ytplayer || {};ytplayer.config = {"args":{"status":"ok"}};ytplayer.web_player_context_config = {};ytplayer.load();</script>"#;
        let caps = PLAYER_CONFIG_REGEX.captures(html).unwrap();

        assert_eq!(&caps[1], r#"{"args":{"status":"ok"}}"#);
    }

    #[test]
    fn html5player_regex_matches_both_shapes() {
        let json_shape = r#""jsUrl":"/s/player/abc123/player_ias.vflset/en_US/base.js""#;
        let caps = HTML5PLAYER_REGEX.captures(json_shape).unwrap();
        assert_eq!(
            caps.get(2).map(|x| x.as_str()),
            Some("/s/player/abc123/player_ias.vflset/en_US/base.js")
        );

        let tag_shape = r#"<script src="/s/player/def/base.js" name="player_ias/base">"#;
        let caps = HTML5PLAYER_REGEX.captures(tag_shape).unwrap();
        assert_eq!(caps.get(1).map(|x| x.as_str()), Some("/s/player/def/base.js"));
    }
}
