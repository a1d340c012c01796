mod common;

use std::sync::Arc;
use std::time::Duration;

use rusty_ytinfo::{
    DirectUrlResolver, FetchError, RequestOptions, ThumbnailQuality, Video, VideoError,
    VideoOptions,
};
use serde_json::json;

use common::*;

fn watch_page() -> String {
    legacy_page(json!({
        "status": "ok",
        "url_encoded_fmt_stream_map": muxed_entry(18, "medium"),
        "player_response": player_response("212", "2009-10-25").to_string(),
    }))
}

#[tokio::test]
async fn get_info() {
    let fetcher = Arc::new(MockFetcher::new().route(WATCH_URL, watch_page()));

    let video = Video::with_fetcher(
        format!("https://www.youtube.com/watch?v={VIDEO_ID}"),
        VideoOptions::default(),
        fetcher.clone(),
    )
    .unwrap();

    let video_info = video.get_info().await.unwrap();

    assert_eq!(video_info.id, VIDEO_ID);
    assert_eq!(video_info.formats.len(), 3);
    assert_eq!(video_info.muxed_formats().count(), 2);
    assert_eq!(video_info.adaptive_formats().count(), 1);
    assert_eq!(
        video_info.thumbnail_url(ThumbnailQuality::High),
        format!("http://img.youtube.com/vi/{VIDEO_ID}/hqdefault.jpg")
    );

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    let url = url::Url::parse(&calls[0]).unwrap();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("v".to_string(), VIDEO_ID.to_string())));
    assert!(pairs.contains(&("hl".to_string(), "en".to_string())));
    assert!(pairs.contains(&("bpctr".to_string(), "9999999999".to_string())));
}

#[tokio::test]
async fn download_url_needs_plain_url() {
    let fetcher = Arc::new(MockFetcher::new().route(WATCH_URL, watch_page()));
    let video = Video::with_fetcher(VIDEO_ID, VideoOptions::default(), fetcher).unwrap();

    let info = video.get_info().await.unwrap();

    let muxed = info.format_by_itag(18).unwrap();
    let url = info.download_url(muxed, &DirectUrlResolver).unwrap();
    assert_eq!(url.host_str(), Some("r4.googlevideo.com"));

    let ciphered = info.format_by_itag(251).unwrap();
    assert!(matches!(
        info.download_url(ciphered, &DirectUrlResolver),
        Err(VideoError::UnresolvableUrl(_))
    ));
}

#[tokio::test]
async fn watch_page_failure_is_fatal() {
    let fetcher = Arc::new(MockFetcher::new());
    let video = Video::with_fetcher(VIDEO_ID, VideoOptions::default(), fetcher).unwrap();

    assert!(matches!(
        video.get_info().await,
        Err(VideoError::Fetch(FetchError::Status(_)))
    ));
}

#[tokio::test]
async fn options_timeout_bounds_extraction() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .route(WATCH_URL, watch_page())
            .with_delay(Duration::from_secs(30)),
    );
    let options = VideoOptions {
        request_options: RequestOptions {
            timeout: Some(Duration::from_millis(20)),
            ..Default::default()
        },
    };
    let video = Video::with_fetcher(VIDEO_ID, options, fetcher).unwrap();

    assert!(matches!(
        video.extract().await,
        Err(VideoError::Fetch(FetchError::DeadlineExceeded))
    ));
}

#[test]
fn rejects_unrecognized_url() {
    assert!(matches!(
        Video::new("https://vimeo.com/76979871"),
        Err(VideoError::IdentifierMissing)
    ));
    assert!(matches!(
        Video::new("https://www.youtube.com/feed/trending"),
        Err(VideoError::IdentifierMissing)
    ));
}
