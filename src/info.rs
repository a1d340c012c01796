use std::sync::Arc;

use crate::config::{extract_legacy_config, fetch_fallback_config};
use crate::constants::{BASE_URL, INITIAL_PLAYER_RESPONSE_MARKERS, WATCH_PAGE_PARAMS};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::formats::FormatListBuilder;
use crate::metadata::extract_page_metadata;
use crate::player_response::{parse_player_response, player_details, PlayerDetails};
use crate::structs::{
    Extraction, ExtractionContext, ExtractionIssue, FormatSource, Partial, PlayerResponse,
    VideoError, VideoInfo, VideoOptions,
};
use crate::utils::{find_embedded_json, get_html5player, get_video_id};

/// Steps of one extraction, in the order they are passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub enum ExtractionState {
    Start,
    MetadataExtracted,
    ConfigResolved,
    PlayabilityChecked,
    FormatsBuilt,
    ResponseParsed,
    Done,
}

/// Per-call bookkeeping: current state and every non-fatal issue met so far
struct Pipeline<'a> {
    id: &'a str,
    state: ExtractionState,
    issues: Vec<ExtractionIssue>,
}

impl<'a> Pipeline<'a> {
    fn new(id: &'a str) -> Self {
        Self {
            id,
            state: ExtractionState::Start,
            issues: vec![],
        }
    }

    fn advance(&mut self, next: ExtractionState) {
        log::trace!("{}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }

    /// Take the value, keep the issues
    fn absorb<T>(&mut self, partial: Partial<T>) -> T {
        self.issues.extend(partial.issues);
        partial.value
    }

    fn note(&mut self, issue: ExtractionIssue) {
        issue.log();
        self.issues.push(issue);
    }

    fn finish(mut self, info: VideoInfo) -> Extraction {
        self.advance(ExtractionState::Done);
        Extraction {
            info,
            issues: self.issues,
        }
    }
}

/// Extract a [`VideoInfo`] from an already fetched watch page.
///
/// The page's `ytplayer.config` is used when present, otherwise the video info
/// endpoint is queried once through `fetcher`, honouring `ctx`. Any error aborts
/// the extraction, degraded data is reported in [`Extraction::issues`].
pub async fn extract_video_info(
    id: &str,
    page: &[u8],
    fetcher: &dyn Fetcher,
    ctx: &ExtractionContext,
) -> Result<Extraction, VideoError> {
    let page = String::from_utf8_lossy(page);
    let mut pipeline = Pipeline::new(id);

    let metadata = pipeline.absorb(extract_page_metadata(&page));
    pipeline.advance(ExtractionState::MetadataExtracted);

    let config = match extract_legacy_config(&page)? {
        Some(config) => config,
        None => {
            log::debug!("{id}: player config not found in page, querying video info endpoint");
            fetch_fallback_config(fetcher, id, ctx).await?
        }
    };
    pipeline.advance(ExtractionState::ConfigResolved);

    config.check_status()?;
    pipeline.advance(ExtractionState::PlayabilityChecked);

    let mut formats = FormatListBuilder::new();
    if let Some(map) = config.url_encoded_fmt_stream_map() {
        formats.extend_legacy(map, FormatSource::LegacyMuxed);
    }
    if let Some(map) = config.adaptive_fmts() {
        formats.extend_legacy(map, FormatSource::LegacyAdaptive);
    }
    pipeline.advance(ExtractionState::FormatsBuilt);

    let player_response = match config.player_response() {
        Some(raw) => Some(parse_player_response(raw)?),
        None => find_embedded_json(&page, INITIAL_PLAYER_RESPONSE_MARKERS)
            .map(|raw| parse_player_response(&raw))
            .transpose()?,
    };

    let details = match player_response {
        Some(response) => {
            response.check_playability()?;
            pipeline.absorb(apply_player_response(&response, &mut formats))
        }
        None => {
            pipeline.note(ExtractionIssue::MissingPlayerResponse);
            PlayerDetails::default()
        }
    };
    pipeline.advance(ExtractionState::ResponseParsed);

    let formats = pipeline.absorb(formats.build());
    if formats.is_empty() {
        pipeline.note(ExtractionIssue::NoFormats);
    }

    let html5player = match config
        .html5player()
        .map(|x| x.to_string())
        .or_else(|| get_html5player(&page))
    {
        Some(x) => x,
        None => {
            pipeline.note(ExtractionIssue::MissingPlayerScript);
            String::new()
        }
    };

    let info = VideoInfo {
        id: id.to_string(),
        title: details.title,
        description: metadata
            .description
            .or(details.short_description)
            .unwrap_or_default(),
        uploader: details.uploader,
        publish_date: details.publish_date,
        duration: details.duration,
        keywords: details.keywords,
        song: metadata.song,
        artist: metadata.artist,
        album: metadata.album,
        writers: metadata.writers,
        formats,
        dash_manifest_url: details
            .dash_manifest_url
            .or_else(|| config.dashmpd().map(|x| x.to_string())),
        hls_manifest_url: details.hls_manifest_url,
        html5player,
    };

    Ok(pipeline.finish(info))
}

/// Structured muxed then adaptive formats go to `formats`, the rest is returned
fn apply_player_response(
    response: &PlayerResponse,
    formats: &mut FormatListBuilder,
) -> Partial<PlayerDetails> {
    let (muxed, adaptive) = response.format_values();
    formats.extend_structured(muxed, FormatSource::StructuredMuxed);
    formats.extend_structured(adaptive, FormatSource::StructuredAdaptive);

    player_details(response)
}

#[derive(Clone, derive_more::Display, derivative::Derivative)]
#[display("Video({video_id})")]
#[derivative(Debug, PartialEq, Eq)]
pub struct Video {
    video_id: String,
    options: VideoOptions,
    #[derivative(PartialEq = "ignore", Debug = "ignore")]
    fetcher: Arc<dyn Fetcher>,
}

impl Video {
    /// Crate [`Video`] struct to get info with default [`VideoOptions`]
    pub fn new(url_or_id: impl Into<String>) -> Result<Self, VideoError> {
        Self::new_with_options(url_or_id, VideoOptions::default())
    }

    /// Crate [`Video`] struct to get info with custom [`VideoOptions`]
    pub fn new_with_options(
        url_or_id: impl Into<String>,
        options: VideoOptions,
    ) -> Result<Self, VideoError> {
        let fetcher = HttpFetcher::new(&options.request_options)?;

        Self::with_fetcher(url_or_id, options, Arc::new(fetcher))
    }

    /// Use a caller supplied transport for every request
    pub fn with_fetcher(
        url_or_id: impl Into<String>,
        options: VideoOptions,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, VideoError> {
        let video_id = get_video_id(&url_or_id.into()).ok_or(VideoError::IdentifierMissing)?;

        Ok(Self {
            video_id,
            options,
            fetcher,
        })
    }

    /// Try to get information about video, dropping the issue list
    pub async fn get_info(&self) -> Result<VideoInfo, VideoError> {
        Ok(self.extract().await?.info)
    }

    /// Fetch the watch page and run the extraction with the configured timeout
    pub async fn extract(&self) -> Result<Extraction, VideoError> {
        let mut ctx = ExtractionContext::new();
        if let Some(timeout) = self.options.request_options.timeout {
            ctx = ctx.with_timeout(timeout);
        }

        self.extract_with_context(&ctx).await
    }

    /// Fetch the watch page and run the extraction under a caller supplied context
    pub async fn extract_with_context(
        &self,
        ctx: &ExtractionContext,
    ) -> Result<Extraction, VideoError> {
        let url = url::Url::parse_with_params(&self.get_video_url(), WATCH_PAGE_PARAMS)?;

        let page = ctx.guard(self.fetcher.fetch(url.as_str())).await?;

        extract_video_info(&self.video_id, &page, self.fetcher.as_ref(), ctx).await
    }

    /// Get video URL
    pub fn get_video_url(&self) -> String {
        format!("{}{}", BASE_URL, self.video_id)
    }

    /// Get video id
    pub fn get_video_id(&self) -> String {
        self.video_id.clone()
    }

    pub fn get_options(&self) -> VideoOptions {
        self.options.clone()
    }
}
