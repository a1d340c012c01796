use chrono::NaiveDate;
use mime::Mime;
use serde::{
    de::{Error, Unexpected},
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{future::Future, str::FromStr, time::Duration};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::constants::THUMBNAIL_BASE_URL;

/// Canonical record produced by one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Video id supplied by the caller
    pub id: String,
    pub title: String,
    pub description: String,
    pub uploader: String,
    #[serde(rename = "publishDate")]
    pub publish_date: Option<NaiveDate>,
    pub duration: Option<Duration>,
    pub keywords: Vec<String>,
    /// Only set when the page carried a matching metadata row
    pub song: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub writers: Option<String>,
    pub formats: Vec<StreamFormat>,
    #[serde(rename = "dashManifestUrl")]
    pub dash_manifest_url: Option<String>,
    #[serde(rename = "hlsManifestUrl")]
    pub hls_manifest_url: Option<String>,
    /// Location of the player script needed to resolve ciphered format urls.
    /// Empty when neither the player config nor the page exposed one
    pub html5player: String,
}

impl VideoInfo {
    /// Formats carrying both audio and video
    pub fn muxed_formats(&self) -> impl Iterator<Item = &StreamFormat> {
        self.formats.iter().filter(|x| !x.adaptive)
    }

    /// Audio-only or video-only formats
    pub fn adaptive_formats(&self) -> impl Iterator<Item = &StreamFormat> {
        self.formats.iter().filter(|x| x.adaptive)
    }

    pub fn format_by_itag(&self, itag: u64) -> Option<&StreamFormat> {
        self.formats.iter().find(|x| x.itag == itag)
    }

    /// Thumbnail image url with the given quality
    pub fn thumbnail_url(&self, quality: ThumbnailQuality) -> String {
        format!("{THUMBNAIL_BASE_URL}{}/{quality}.jpg", self.id)
    }

    /// Hand the format and the player script location to a [`UrlResolver`]
    pub fn download_url(
        &self,
        format: &StreamFormat,
        resolver: &dyn UrlResolver,
    ) -> Result<url::Url, VideoError> {
        resolver.resolve(format, &self.html5player)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ThumbnailQuality {
    #[display("default")]
    Default,
    #[display("mqdefault")]
    Medium,
    #[display("hqdefault")]
    High,
    #[display("sddefault")]
    Standard,
    #[display("maxresdefault")]
    MaxRes,
}

/// Result of a successful extraction together with everything that was
/// missing or skipped along the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub info: VideoInfo,
    pub issues: Vec<ExtractionIssue>,
}

impl Extraction {
    /// `true` when some optional data was absent or dropped
    pub fn is_degraded(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Best-effort outcome of a single step: the value plus the non-fatal issues met
/// while producing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial<T> {
    pub value: T,
    pub issues: Vec<ExtractionIssue>,
}

impl<T> Partial<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            issues: vec![],
        }
    }

    /// Record and log an issue
    pub fn note(&mut self, issue: ExtractionIssue) {
        issue.log();
        self.issues.push(issue);
    }
}

/// Absent or unusable optional data. Never aborts an extraction
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ExtractionIssue {
    #[display("page metadata unavailable: {_0}")]
    MetadataUnavailable(String),
    #[display("description not found")]
    MissingDescription,
    #[display("metadata rows not found")]
    MissingMetadataRows,
    #[display("dropped {source} format: {reason}")]
    DroppedFormat { source: FormatSource, reason: String },
    #[display("duplicate itag {itag} from {source} ignored")]
    DuplicateFormat { itag: u64, source: FormatSource },
    #[display("player response not found")]
    MissingPlayerResponse,
    #[display("length seconds {_0:?} is not a number")]
    InvalidDuration(String),
    #[display("publish date not found")]
    MissingPublishDate,
    #[display("unable to parse date published {_0:?}")]
    InvalidPublishDate(String),
    #[display("player script location not found")]
    MissingPlayerScript,
    #[display("no formats found")]
    NoFormats,
}

impl ExtractionIssue {
    pub(crate) fn log(&self) {
        match self {
            ExtractionIssue::NoFormats => log::warn!("{self}"),
            _ => log::debug!("{self}"),
        }
    }
}

/// Encoding a [`StreamFormat`] was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum FormatSource {
    /// `url_encoded_fmt_stream_map`
    #[display("legacy muxed")]
    LegacyMuxed,
    /// `adaptive_fmts`
    #[display("legacy adaptive")]
    LegacyAdaptive,
    /// `streamingData.formats`
    #[display("structured muxed")]
    StructuredMuxed,
    /// `streamingData.adaptiveFormats`
    #[display("structured adaptive")]
    StructuredAdaptive,
}

impl FormatSource {
    pub fn is_adaptive(self) -> bool {
        matches!(
            self,
            FormatSource::LegacyAdaptive | FormatSource::StructuredAdaptive
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Video format itag number
    pub itag: u64,
    /// `true` for audio-only or video-only streams
    pub adaptive: bool,
    /// Video format mime type
    #[serde(rename = "mimeType")]
    pub mime_type: Option<MimeType>,
    pub bitrate: Option<u64>,
    #[serde(rename = "averageBitrate")]
    pub average_bitrate: Option<u64>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub fps: Option<u64>,
    pub quality: Option<String>,
    #[serde(rename = "qualityLabel")]
    pub quality_label: Option<String>,
    #[serde(rename = "audioQuality")]
    pub audio_quality: Option<String>,
    #[serde(rename = "audioSampleRate")]
    pub audio_sample_rate: Option<String>,
    #[serde(rename = "audioChannels")]
    pub audio_channels: Option<u8>,
    #[serde(rename = "contentLength")]
    pub content_length: Option<u64>,
    #[serde(rename = "approxDurationMs")]
    pub approx_duration_ms: Option<u64>,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
    #[serde(rename = "initRange")]
    pub init_range: Option<RangeObject>,
    #[serde(rename = "indexRange")]
    pub index_range: Option<RangeObject>,
    /// Direct url or the ciphered placeholder, `None` when the source had neither
    pub url: Option<StreamUrl>,
    /// Video format has video or not
    #[serde(rename = "hasVideo")]
    pub has_video: bool,
    /// Video format has audio or not
    #[serde(rename = "hasAudio")]
    pub has_audio: bool,
    #[serde(rename = "isLive")]
    pub is_live: bool,
    #[serde(rename = "isHLS")]
    pub is_hls: bool,
    #[serde(rename = "isDashMPD")]
    pub is_dash_mpd: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StreamUrl {
    Direct {
        url: String,
    },
    /// The signature must be descrambled with the player script before use
    Ciphered {
        url: String,
        signature: String,
        #[serde(rename = "signatureParam")]
        signature_param: String,
    },
}

impl StreamUrl {
    pub fn base_url(&self) -> &str {
        match self {
            StreamUrl::Direct { url } | StreamUrl::Ciphered { url, .. } => url,
        }
    }

    pub fn is_ciphered(&self) -> bool {
        matches!(self, StreamUrl::Ciphered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeObject {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Resolves a playable url for a format, given the player script location
pub trait UrlResolver {
    fn resolve(&self, format: &StreamFormat, html5player: &str) -> Result<url::Url, VideoError>;
}

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum FetchError {
    /// Response status was not 2xx
    #[error("Request returned status {0}")]
    Status(reqwest::StatusCode),
    /// Reqwest error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// ReqwestMiddleware error
    #[error(transparent)]
    ReqwestMiddleware(#[from] reqwest_middleware::Error),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

#[derive(thiserror::Error, Debug)]
pub enum VideoError {
    /// No video id could be read from the given url
    #[error("Invalid youtube URL, no video id")]
    IdentifierMissing,
    /// Neither the page nor the video info endpoint produced a player config
    #[error("Unable to read video info: {0}")]
    ConfigUnavailable(#[source] FetchError),
    /// The provider reported the video as not playable
    #[error(
        "Video unavailable{}: {reason}",
        .code.as_ref().map(|x| format!(" (error {x})")).unwrap_or_default()
    )]
    VideoUnavailable {
        code: Option<String>,
        reason: String,
    },
    /// A structured payload was present but could not be decoded
    #[error("Couldn't parse {what}: {source}")]
    MalformedResponse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// Watch page could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// URL cannot parsed
    #[error(transparent)]
    URLParseError(#[from] url::ParseError),
    /// Format has no url a resolver can use
    #[error("Unresolvable format url: {0}")]
    UnresolvableUrl(String),
}

/// Reason a single format record was dropped
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("missing itag")]
    MissingItag,
    #[error(transparent)]
    Query(#[from] serde_qs::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid {field} {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Video search and download options
#[derive(Clone, Default, derive_more::Display, derivative::Derivative)]
#[display("VideoOptions(request_options: {request_options})")]
#[derivative(Debug, PartialEq, Eq)]
pub struct VideoOptions {
    #[derivative(PartialEq = "ignore")]
    pub request_options: RequestOptions,
}

#[derive(Clone, Debug, Default, derive_more::Display)]
#[display("RequestOptions()")]
pub struct RequestOptions {
    /// [`reqwest::Client`] to on use request. If provided in the request options `proxy` and `cookies` will be ignored
    ///
    /// # Example
    ///
    /// ```ignore
    ///     let video_options = VideoOptions {
    ///         request_options: RequestOptions {
    ///              client: Some(
    ///                  reqwest::Client::builder()
    ///                  .build()
    ///                  .unwrap(),
    ///              ),
    ///              ..Default::default()
    ///         },
    ///     };
    /// ```
    pub client: Option<reqwest::Client>,
    /// [`reqwest::Proxy`] to on use request
    pub proxy: Option<reqwest::Proxy>,
    /// Cookies String
    ///
    /// # Example
    /// ```ignore
    /// Some("key1=value1; key2=value2; key3=value3".to_string())
    /// ```
    pub cookies: Option<String>,
    /// Override the default number of retries the transport makes per request.
    /// Default is [`crate::constants::DEFAULT_MAX_RETRIES`].
    pub max_retries: Option<u32>,
    /// Deadline applied to every extraction started from [`crate::Video`]
    pub timeout: Option<Duration>,
}

/// Cancellation and deadline of one extraction, honoured at every network call
#[derive(Clone, Debug, Default)]
pub struct ExtractionContext {
    pub cancellation: CancellationToken,
    pub deadline: Option<Instant>,
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Run a request unless the context is cancelled or past its deadline
    pub(crate) async fn guard<T, F>(&self, request: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        if self.cancellation.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        if self.deadline.is_some_and(|x| x <= Instant::now()) {
            return Err(FetchError::DeadlineExceeded);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, request)
                    .await
                    .map_err(|_| FetchError::DeadlineExceeded)?,
                None => request.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(FetchError::Cancelled),
            result = bounded => result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeType {
    pub mime: Mime,
    /// Mime container
    pub container: String,
    /**
     * Mime codec parameters

     **Mime type:** [`mime::AUDIO`] or [`mime::VIDEO`] => contains 1 element and its audio/video codec

     **Mime type:** [`mime::VIDEO`] => if contains 2 element, first is video and second is audio codec
    */
    pub codecs: Vec<String>,
    /// Video codec parameter
    pub video_codec: Option<String>,
    /// Audio codec parameter
    pub audio_codec: Option<String>,
}

impl FromStr for MimeType {
    type Err = mime::FromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mime: Mime = Mime::from_str(s.trim())?;

        let codecs: Vec<String> = mime
            .get_param("codecs")
            .map(|x| {
                x.as_str()
                    .split(',')
                    .map(|x| x.trim().trim_matches('"').to_string())
                    .filter(|x| !x.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let container = mime.subtype().to_string();

        let video_codec = if mime.type_() == mime::VIDEO {
            codecs.first().cloned()
        } else {
            None
        };

        let audio_codec = if mime.type_() == mime::AUDIO {
            codecs.first().cloned()
        } else {
            codecs.get(1).cloned()
        };

        Ok(MimeType {
            mime,
            container,
            codecs,
            video_codec,
            audio_codec,
        })
    }
}

impl Serialize for MimeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = format!(
            r#"{}/{}; codecs="{}""#,
            self.mime.type_(),
            self.mime.subtype(),
            self.codecs.join(", "),
        );

        s.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MimeType {
    fn deserialize<D>(deserializer: D) -> Result<MimeType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        MimeType::from_str(&s).map_err(|_| {
            D::Error::invalid_value(
                Unexpected::Str(&s),
                &r#"valid mime type format must be `(\w+/\w+);\scodecs="([a-zA-Z-0-9.,\s]*)"`"#,
            )
        })
    }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(rename = "streamingData")]
    pub streaming_data: Option<StreamingData>,
    #[serde(rename = "videoDetails")]
    pub video_details: Option<PlayerResponseVideoDetails>,
    #[serde(rename = "microformat")]
    pub micro_format: Option<MicroFormat>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayabilityStatus {
    pub status: Option<String>,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StreamingData {
    #[serde(rename = "dashManifestUrl")]
    pub dash_manifest_url: Option<String>,
    #[serde(rename = "hlsManifestUrl")]
    pub hls_manifest_url: Option<String>,
    /// Kept undecoded so one broken entry only drops itself
    #[serde(default)]
    pub formats: Vec<serde_json::Value>,
    #[serde(rename = "adaptiveFormats", default)]
    pub adaptive_formats: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerResponseVideoDetails {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "lengthSeconds")]
    pub length_seconds: Option<String>,
    pub keywords: Option<Vec<String>>,
    #[serde(rename = "shortDescription")]
    pub short_description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MicroFormat {
    #[serde(rename = "playerMicroformatRenderer")]
    pub player_micro_format_renderer: Option<PlayerMicroFormatRenderer>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerMicroFormatRenderer {
    #[serde(rename = "publishDate")]
    pub publish_date: Option<String>,
    #[serde(rename = "uploadDate")]
    pub upload_date: Option<String>,
}

/// One entry of `streamingData.formats` / `streamingData.adaptiveFormats`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StreamingDataFormat {
    pub itag: Option<u64>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    pub bitrate: Option<u64>,
    #[serde(rename = "averageBitrate")]
    pub average_bitrate: Option<u64>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub fps: Option<u64>,
    pub quality: Option<String>,
    #[serde(rename = "qualityLabel")]
    pub quality_label: Option<String>,
    #[serde(rename = "audioQuality")]
    pub audio_quality: Option<String>,
    #[serde(rename = "audioSampleRate")]
    pub audio_sample_rate: Option<String>,
    #[serde(rename = "audioChannels")]
    pub audio_channels: Option<u8>,
    #[serde(rename = "contentLength")]
    pub content_length: Option<String>,
    #[serde(rename = "approxDurationMs")]
    pub approx_duration_ms: Option<String>,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
    #[serde(rename = "initRange")]
    pub init_range: Option<RangeObject>,
    #[serde(rename = "indexRange")]
    pub index_range: Option<RangeObject>,
    pub url: Option<String>,
    #[serde(rename = "signatureCipher")]
    pub signature_cipher: Option<String>,
    pub cipher: Option<String>,
}

/// Query string carried by `signatureCipher`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CipherParams {
    pub url: String,
    pub s: String,
    pub sp: Option<String>,
}

pub struct CustomRetryableStrategy;

impl reqwest_retry::RetryableStrategy for CustomRetryableStrategy {
    fn handle(
        &self,
        res: &reqwest_middleware::Result<reqwest::Response>,
    ) -> Option<reqwest_retry::Retryable> {
        match res {
            Ok(success) => custom_on_request_success(success),
            Err(error) => reqwest_retry::default_on_request_failure(error),
        }
    }
}

/// Custom request success retry strategy.
///
/// Will only retry if:
/// * The status was 5XX (server error)
/// * The status was 429 (rate limited)
///
/// Other client errors are final, the page or endpoint will not appear on a retry.
fn custom_on_request_success(success: &reqwest::Response) -> Option<reqwest_retry::Retryable> {
    let status = success.status();
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Some(reqwest_retry::Retryable::Transient)
    } else if status.is_success() || status.is_client_error() {
        None
    } else {
        Some(reqwest_retry::Retryable::Fatal)
    }
}
