use std::sync::Arc;

use crate::block_async;
use crate::fetch::Fetcher;
use crate::structs::{Extraction, ExtractionContext, VideoError, VideoInfo, VideoOptions};
use crate::Video as AsyncVideo;

#[derive(Clone, Debug, derive_more::Display, PartialEq, Eq)]
pub struct Video(AsyncVideo);

impl Video {
    /// Crate [`Video`] struct to get info with default [`VideoOptions`]
    pub fn new(url_or_id: impl Into<String>) -> Result<Self, VideoError> {
        Ok(Self(AsyncVideo::new(url_or_id)?))
    }

    /// Crate [`Video`] struct to get info with custom [`VideoOptions`]
    pub fn new_with_options(
        url_or_id: impl Into<String>,
        options: VideoOptions,
    ) -> Result<Self, VideoError> {
        Ok(Self(AsyncVideo::new_with_options(url_or_id, options)?))
    }

    pub fn with_fetcher(
        url_or_id: impl Into<String>,
        options: VideoOptions,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, VideoError> {
        Ok(Self(AsyncVideo::with_fetcher(url_or_id, options, fetcher)?))
    }

    /// Try to get information about video
    pub fn get_info(&self) -> Result<VideoInfo, VideoError> {
        block_async!(self.0.get_info())
    }

    /// Information about video together with everything that was missing on the page
    pub fn extract(&self) -> Result<Extraction, VideoError> {
        block_async!(self.0.extract())
    }

    pub fn extract_with_context(&self, ctx: &ExtractionContext) -> Result<Extraction, VideoError> {
        block_async!(self.0.extract_with_context(ctx))
    }

    /// Get video URL
    pub fn get_video_url(&self) -> String {
        self.0.get_video_url()
    }

    /// Get video id
    pub fn get_video_id(&self) -> String {
        self.0.get_video_id()
    }
}

impl std::ops::Deref for Video {
    type Target = AsyncVideo;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
