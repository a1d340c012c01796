pub mod config;
pub mod constants;
pub mod fetch;
pub mod formats;
pub mod info;
pub mod metadata;
pub mod player_response;
pub mod structs;
pub mod utils;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use fetch::{Fetcher, HttpFetcher};
pub use formats::{DirectUrlResolver, FormatListBuilder};
pub use info::{extract_video_info, ExtractionState, Video};
pub use structs::{
    Extraction, ExtractionContext, ExtractionIssue, FetchError, FormatSource, MimeType,
    RangeObject, RequestOptions, StreamFormat, StreamUrl, ThumbnailQuality, UrlResolver,
    VideoError, VideoInfo, VideoOptions,
};
pub use utils::get_video_id;
