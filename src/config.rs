use serde::Deserialize;
use std::collections::HashSet;

use crate::constants::{PLAYER_CONFIG_REGEX, STATUS_FAIL, VIDEO_EURL, VIDEO_INFO_URL};
use crate::fetch::Fetcher;
use crate::structs::{ExtractionContext, VideoError};
use crate::utils::string_or_number;

/// Argument bag of the player, read from the legacy page config or from the
/// video info endpoint. Built once and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerConfiguration {
    error_code: Option<String>,
    reason: Option<String>,
    status: Option<String>,
    player_response: Option<String>,
    url_encoded_fmt_stream_map: Option<String>,
    adaptive_fmts: Option<String>,
    dashmpd: Option<String>,
    html5player: Option<String>,
}

impl PlayerConfiguration {
    pub fn builder() -> PlayerConfigurationBuilder {
        PlayerConfigurationBuilder::default()
    }

    /// Decode the `ytplayer.config` JSON object
    pub fn from_json(raw: &str) -> Result<Self, VideoError> {
        let config: EmbeddedPlayerConfig =
            serde_json::from_str(raw).map_err(|source| VideoError::MalformedResponse {
                what: "player config",
                source,
            })?;

        let args = config.args;
        let player_response = args
            .player_response
            .or_else(|| args.raw_player_response.map(|x| x.to_string()));

        Ok(Self::builder()
            .error_code(args.errorcode)
            .reason(args.reason)
            .status(args.status)
            .player_response(player_response)
            .url_encoded_fmt_stream_map(args.url_encoded_fmt_stream_map)
            .adaptive_fmts(args.adaptive_fmts)
            .dashmpd(args.dashmpd)
            .html5player(config.assets.js)
            .build())
    }

    /// Decode a URL-query-encoded video info body. The first value of a key wins,
    /// even when it is empty. Unknown keys are ignored.
    pub fn from_query(body: &[u8]) -> Self {
        let mut seen = HashSet::new();
        let mut builder = Self::builder();

        for (key, value) in url::form_urlencoded::parse(body) {
            if !seen.insert(key.clone()) {
                continue;
            }

            let value = Some(value.into_owned());
            builder = match key.as_ref() {
                "errorcode" => builder.error_code(value),
                "reason" => builder.reason(value),
                "status" => builder.status(value),
                "player_response" => builder.player_response(value),
                "url_encoded_fmt_stream_map" => builder.url_encoded_fmt_stream_map(value),
                "adaptive_fmts" => builder.adaptive_fmts(value),
                "dashmpd" => builder.dashmpd(value),
                _ => builder,
            };
        }

        builder.build()
    }

    /// Abort when the argument bag reports the video as failed
    pub fn check_status(&self) -> Result<(), VideoError> {
        if self.status.as_deref() == Some(STATUS_FAIL) {
            return Err(VideoError::VideoUnavailable {
                code: self.error_code.clone(),
                reason: self.reason.clone().unwrap_or_default(),
            });
        }

        Ok(())
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn player_response(&self) -> Option<&str> {
        self.player_response.as_deref()
    }

    pub fn url_encoded_fmt_stream_map(&self) -> Option<&str> {
        self.url_encoded_fmt_stream_map.as_deref()
    }

    pub fn adaptive_fmts(&self) -> Option<&str> {
        self.adaptive_fmts.as_deref()
    }

    pub fn dashmpd(&self) -> Option<&str> {
        self.dashmpd.as_deref()
    }

    pub fn html5player(&self) -> Option<&str> {
        self.html5player.as_deref()
    }
}

#[derive(Debug, Default)]
pub struct PlayerConfigurationBuilder {
    inner: PlayerConfiguration,
}

macro_rules! builder_fields {
    ($($field:ident),* $(,)?) => {
        impl PlayerConfigurationBuilder {
            $(
                pub fn $field(mut self, value: Option<String>) -> Self {
                    self.inner.$field = value.filter(|x| !x.is_empty());
                    self
                }
            )*
        }
    };
}

builder_fields!(
    error_code,
    reason,
    status,
    player_response,
    url_encoded_fmt_stream_map,
    adaptive_fmts,
    dashmpd,
    html5player,
);

impl PlayerConfigurationBuilder {
    pub fn build(self) -> PlayerConfiguration {
        self.inner
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddedPlayerConfig {
    #[serde(default)]
    args: EmbeddedPlayerArgs,
    #[serde(default)]
    assets: EmbeddedPlayerAssets,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddedPlayerArgs {
    #[serde(default, deserialize_with = "string_or_number")]
    errorcode: Option<String>,
    reason: Option<String>,
    status: Option<String>,
    player_response: Option<String>,
    raw_player_response: Option<serde_json::Value>,
    url_encoded_fmt_stream_map: Option<String>,
    adaptive_fmts: Option<String>,
    dashmpd: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddedPlayerAssets {
    js: Option<String>,
}

/// Find and decode the page-embedded `ytplayer.config` object.
///
/// `Ok(None)` when the page has no such object, an error when it has one that
/// cannot be decoded.
pub fn extract_legacy_config(page: &str) -> Result<Option<PlayerConfiguration>, VideoError> {
    let Some(caps) = PLAYER_CONFIG_REGEX.captures(page) else {
        return Ok(None);
    };

    PlayerConfiguration::from_json(&caps[1]).map(Some)
}

/// Url of the video info endpoint for `id`
pub fn video_info_url(id: &str) -> Result<url::Url, VideoError> {
    Ok(url::Url::parse_with_params(
        VIDEO_INFO_URL,
        &[("video_id", id), ("eurl", &format!("{VIDEO_EURL}{id}"))],
    )?)
}

/// Query the video info endpoint once and decode its body
pub async fn fetch_fallback_config(
    fetcher: &dyn Fetcher,
    id: &str,
    ctx: &ExtractionContext,
) -> Result<PlayerConfiguration, VideoError> {
    let url = video_info_url(id)?;

    let body = ctx
        .guard(fetcher.fetch(url.as_str()))
        .await
        .map_err(VideoError::ConfigUnavailable)?;

    Ok(PlayerConfiguration::from_query(&body))
}
