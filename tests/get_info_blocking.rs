#![cfg(feature = "blocking")]

mod common;

use std::sync::Arc;

use rusty_ytinfo::blocking::Video;
use rusty_ytinfo::VideoOptions;
use serde_json::json;

use common::*;

#[test]
fn get_info_blocking() {
    let page = legacy_page(json!({
        "status": "ok",
        "adaptive_fmts": ([adaptive_entry(140), adaptive_entry(249)].join(",")),
    }));
    let fetcher = Arc::new(MockFetcher::new().route(WATCH_URL, page));

    let video = Video::with_fetcher(VIDEO_ID, VideoOptions::default(), fetcher.clone()).unwrap();

    let extraction = video.extract().unwrap();

    assert_eq!(extraction.info.adaptive_formats().count(), 2);
    assert_eq!(video.get_video_id(), VIDEO_ID);
    assert_eq!(fetcher.calls_to(WATCH_URL), 1);
}
