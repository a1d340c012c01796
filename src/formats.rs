use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;

use crate::constants::{IS_DASH_MPD_REGEX, IS_HLS_REGEX, IS_LIVE_REGEX};
use crate::structs::{
    CipherParams, ExtractionIssue, FormatError, FormatSource, MimeType, Partial, RangeObject,
    StreamFormat, StreamUrl, StreamingDataFormat, UrlResolver, VideoError,
};

/// One comma separated entry of `url_encoded_fmt_stream_map` / `adaptive_fmts`
#[derive(Debug, Deserialize)]
struct LegacyStreamEntry {
    itag: u64,
    url: Option<String>,
    /// Ciphered signature
    s: Option<String>,
    sp: Option<String>,
    /// Plain signature
    sig: Option<String>,
    #[serde(rename = "type")]
    mime_type: Option<String>,
    quality: Option<String>,
    quality_label: Option<String>,
    bitrate: Option<u64>,
    /// `<width>x<height>`
    size: Option<String>,
    fps: Option<u64>,
    clen: Option<u64>,
    lmt: Option<String>,
    init: Option<String>,
    index: Option<String>,
    audio_sample_rate: Option<String>,
    audio_channels: Option<u8>,
}

/// Decode a single URL-query-encoded stream map segment. A repeated key keeps its first value.
pub fn decode_query_string(segment: &str, adaptive: bool) -> Result<StreamFormat, FormatError> {
    let entry: LegacyStreamEntry = serde_qs::from_str(&first_values(segment))?;

    let mime_type = entry.mime_type.as_deref().map(parse_mime).transpose()?;

    let (width, height) = match entry.size.as_deref() {
        Some(size) => {
            let (width, height) = size
                .split_once('x')
                .and_then(|(w, h)| Some((w.parse::<u64>().ok()?, h.parse::<u64>().ok()?)))
                .ok_or_else(|| FormatError::InvalidField {
                    field: "size",
                    value: size.to_string(),
                })?;
            (Some(width), Some(height))
        }
        None => (None, None),
    };

    let init_range = entry.init.as_deref().map(|x| parse_range("init", x)).transpose()?;
    let index_range = entry.index.as_deref().map(|x| parse_range("index", x)).transpose()?;

    let url = entry.url.map(|url| match (entry.s, entry.sig) {
        (Some(signature), _) => StreamUrl::Ciphered {
            url,
            signature,
            signature_param: entry.sp.unwrap_or_else(|| "signature".to_string()),
        },
        (None, Some(sig)) => StreamUrl::Direct {
            url: append_signature(&url, &sig),
        },
        (None, None) => StreamUrl::Direct { url },
    });

    Ok(StreamFormat {
        itag: entry.itag,
        adaptive,
        mime_type,
        bitrate: entry.bitrate,
        average_bitrate: None,
        width,
        height,
        fps: entry.fps,
        quality: entry.quality,
        quality_label: entry.quality_label,
        audio_quality: None,
        audio_sample_rate: entry.audio_sample_rate,
        audio_channels: entry.audio_channels,
        content_length: entry.clen,
        approx_duration_ms: None,
        last_modified: entry.lmt,
        init_range,
        index_range,
        url,
        has_video: false,
        has_audio: false,
        is_live: false,
        is_hls: false,
        is_dash_mpd: false,
    }
    .with_format_meta())
}

/// Decode every segment of a comma delimited stream map, dropping the ones that fail
pub fn decode_stream_map(map: &str, source: FormatSource) -> Partial<Vec<StreamFormat>> {
    let mut partial = Partial::new(vec![]);

    for segment in map.split(',').map(str::trim).filter(|x| !x.is_empty()) {
        match decode_query_string(segment, source.is_adaptive()) {
            Ok(format) => partial.value.push(format),
            Err(err) => partial.note(ExtractionIssue::DroppedFormat {
                source,
                reason: err.to_string(),
            }),
        }
    }

    partial
}

impl TryFrom<StreamingDataFormat> for StreamFormat {
    type Error = FormatError;

    /// Adaptive flag is left unset, [`adapt_structured`] fills it from the list the entry came from
    fn try_from(value: StreamingDataFormat) -> Result<Self, Self::Error> {
        let itag = value.itag.ok_or(FormatError::MissingItag)?;

        let mime_type = value.mime_type.as_deref().map(parse_mime).transpose()?;
        let content_length = value
            .content_length
            .as_deref()
            .map(|x| parse_number("contentLength", x))
            .transpose()?;
        let approx_duration_ms = value
            .approx_duration_ms
            .as_deref()
            .map(|x| parse_number("approxDurationMs", x))
            .transpose()?;

        let cipher = value.signature_cipher.or(value.cipher);
        let url = match (value.url, cipher) {
            (Some(url), _) => Some(StreamUrl::Direct { url }),
            (None, Some(cipher)) => {
                let params: CipherParams = serde_qs::from_str(&cipher)?;
                Some(StreamUrl::Ciphered {
                    url: params.url,
                    signature: params.s,
                    signature_param: params.sp.unwrap_or_else(|| "signature".to_string()),
                })
            }
            (None, None) => None,
        };

        Ok(StreamFormat {
            itag,
            adaptive: false,
            mime_type,
            bitrate: value.bitrate,
            average_bitrate: value.average_bitrate,
            width: value.width,
            height: value.height,
            fps: value.fps,
            quality: value.quality,
            quality_label: value.quality_label,
            audio_quality: value.audio_quality,
            audio_sample_rate: value.audio_sample_rate,
            audio_channels: value.audio_channels,
            content_length,
            approx_duration_ms,
            last_modified: value.last_modified,
            init_range: value.init_range,
            index_range: value.index_range,
            url,
            has_video: false,
            has_audio: false,
            is_live: false,
            is_hls: false,
            is_dash_mpd: false,
        }
        .with_format_meta())
    }
}

/// Convert one structured JSON format object
pub fn adapt_structured_format(
    value: &serde_json::Value,
    adaptive: bool,
) -> Result<StreamFormat, FormatError> {
    let format = StreamingDataFormat::deserialize(value)?;
    let mut format = StreamFormat::try_from(format)?;
    format.adaptive = adaptive;
    Ok(format)
}

/// Convert a list of structured JSON format objects, dropping the ones that fail
pub fn adapt_structured(
    values: &[serde_json::Value],
    source: FormatSource,
) -> Partial<Vec<StreamFormat>> {
    let mut partial = Partial::new(vec![]);

    for value in values {
        match adapt_structured_format(value, source.is_adaptive()) {
            Ok(format) => partial.value.push(format),
            Err(err) => partial.note(ExtractionIssue::DroppedFormat {
                source,
                reason: err.to_string(),
            }),
        }
    }

    partial
}

impl StreamFormat {
    fn with_format_meta(mut self) -> Self {
        let mime = self.mime_type.as_ref();

        self.has_video = self.quality_label.is_some()
            || mime.is_some_and(|x| x.video_codec.is_some());
        self.has_audio = self.audio_quality.is_some()
            || self.audio_sample_rate.is_some()
            || mime.is_some_and(|x| x.audio_codec.is_some());

        let url = self.url.as_ref().map(|x| x.base_url()).unwrap_or("");
        self.is_live = IS_LIVE_REGEX.is_match(url);
        self.is_hls = IS_HLS_REGEX.is_match(url);
        self.is_dash_mpd = IS_DASH_MPD_REGEX.is_match(url);

        self
    }
}

/// Accumulates formats from every source, keeping the first record seen for an itag
#[derive(Debug, Default)]
pub struct FormatListBuilder {
    formats: Vec<StreamFormat>,
    seen: HashSet<u64>,
    issues: Vec<ExtractionIssue>,
}

impl FormatListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the itag was already present and the format was ignored
    pub fn push(&mut self, format: StreamFormat, source: FormatSource) -> bool {
        if !self.seen.insert(format.itag) {
            let issue = ExtractionIssue::DuplicateFormat {
                itag: format.itag,
                source,
            };
            issue.log();
            self.issues.push(issue);
            return false;
        }

        self.formats.push(format);
        true
    }

    fn absorb(&mut self, partial: Partial<Vec<StreamFormat>>, source: FormatSource) {
        self.issues.extend(partial.issues);
        for format in partial.value {
            self.push(format, source);
        }
    }

    pub fn extend_legacy(&mut self, map: &str, source: FormatSource) {
        self.absorb(decode_stream_map(map, source), source);
    }

    pub fn extend_structured(&mut self, values: &[serde_json::Value], source: FormatSource) {
        self.absorb(adapt_structured(values, source), source);
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn build(self) -> Partial<Vec<StreamFormat>> {
        Partial {
            value: self.formats,
            issues: self.issues,
        }
    }
}

/// Resolves only formats that already carry a usable url
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectUrlResolver;

impl UrlResolver for DirectUrlResolver {
    fn resolve(&self, format: &StreamFormat, _html5player: &str) -> Result<url::Url, VideoError> {
        match &format.url {
            Some(StreamUrl::Direct { url }) => Ok(url::Url::parse(url)?),
            Some(StreamUrl::Ciphered { .. }) => Err(VideoError::UnresolvableUrl(format!(
                "itag {} needs its signature descrambled",
                format.itag
            ))),
            None => Err(VideoError::UnresolvableUrl(format!(
                "itag {} has no url",
                format.itag
            ))),
        }
    }
}

/// Keep only the first `key=value` pair of each key, leaving its encoding untouched
fn first_values(query: &str) -> String {
    let mut seen = HashSet::new();

    query
        .split('&')
        .filter(|&pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);
            !key.is_empty() && seen.insert(key)
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn parse_mime(value: &str) -> Result<MimeType, FormatError> {
    MimeType::from_str(value).map_err(|_| FormatError::InvalidField {
        field: "mimeType",
        value: value.to_string(),
    })
}

fn parse_number(field: &'static str, value: &str) -> Result<u64, FormatError> {
    value.parse::<u64>().map_err(|_| FormatError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_range(field: &'static str, value: &str) -> Result<RangeObject, FormatError> {
    let (start, end) = value
        .split_once('-')
        .ok_or_else(|| FormatError::InvalidField {
            field,
            value: value.to_string(),
        })?;

    Ok(RangeObject {
        start: Some(start.to_string()),
        end: Some(end.to_string()),
    })
}

fn append_signature(url: &str, signature: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("signature", signature);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
