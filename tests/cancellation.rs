mod common;

use std::time::Duration;

use reqwest::StatusCode;
use rusty_ytinfo::{extract_video_info, ExtractionContext, FetchError, VideoError};
use tokio_util::sync::CancellationToken;

use common::*;

const PAGE: &str = "<html><body><p>no player config here</p></body></html>";

#[tokio::test]
async fn cancelled_context_skips_fallback() {
    let fetcher = MockFetcher::new().route(VIDEO_INFO_URL, video_info_body(&[("status", "ok")]));
    let token = CancellationToken::new();
    token.cancel();
    let ctx = ExtractionContext::new().with_cancellation(token);

    let err = extract_video_info(VIDEO_ID, PAGE.as_bytes(), &fetcher, &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VideoError::ConfigUnavailable(FetchError::Cancelled)
    ));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn cancellation_interrupts_fallback() {
    let fetcher = MockFetcher::new()
        .route(VIDEO_INFO_URL, video_info_body(&[("status", "ok")]))
        .with_delay(Duration::from_secs(30));
    let token = CancellationToken::new();
    let ctx = ExtractionContext::new().with_cancellation(token.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = extract_video_info(VIDEO_ID, PAGE.as_bytes(), &fetcher, &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VideoError::ConfigUnavailable(FetchError::Cancelled)
    ));
    assert_eq!(fetcher.calls_to(VIDEO_INFO_URL), 1);
}

#[tokio::test]
async fn deadline_interrupts_fallback() {
    let fetcher = MockFetcher::new()
        .route(VIDEO_INFO_URL, video_info_body(&[("status", "ok")]))
        .with_delay(Duration::from_secs(30));
    let ctx = ExtractionContext::new().with_timeout(Duration::from_millis(20));

    let err = extract_video_info(VIDEO_ID, PAGE.as_bytes(), &fetcher, &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VideoError::ConfigUnavailable(FetchError::DeadlineExceeded)
    ));
}

#[tokio::test]
async fn fallback_error_status_is_fatal() {
    let fetcher = MockFetcher::new().route_status(VIDEO_INFO_URL, StatusCode::GONE);

    let err = extract_video_info(
        VIDEO_ID,
        PAGE.as_bytes(),
        &fetcher,
        &ExtractionContext::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        VideoError::ConfigUnavailable(FetchError::Status(status)) if status == StatusCode::GONE
    ));
    assert_eq!(err.to_string(), "Unable to read video info: Request returned status 410 Gone");
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn embedded_config_ignores_cancelled_context() {
    let page = legacy_page(serde_json::json!({
        "url_encoded_fmt_stream_map": muxed_entry(18, "medium"),
    }));
    let token = CancellationToken::new();
    token.cancel();
    let ctx = ExtractionContext::new().with_cancellation(token);

    let info = extract_video_info(VIDEO_ID, page.as_bytes(), &MockFetcher::new(), &ctx)
        .await
        .unwrap()
        .info;

    assert_eq!(info.formats.len(), 1);
}
