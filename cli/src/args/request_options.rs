use std::time::Duration;

use clap::Parser;
use rusty_ytinfo::{RequestOptions, VideoOptions};

#[derive(Parser)]
pub struct RequestOptionsArgs {
    /// Cookies sent with every request
    ///
    /// e.g. "key1=value1; key2=value2"
    #[clap(long, num_args = 1)]
    pub cookies: Option<String>,

    /// How many times a transient failure is retried [default: 3]
    #[clap(long, num_args = 1)]
    pub retries: Option<u32>,

    /// Give up the whole extraction after this many seconds
    #[clap(long, num_args = 1)]
    pub timeout: Option<u64>,
}

impl From<&RequestOptionsArgs> for VideoOptions {
    fn from(value: &RequestOptionsArgs) -> Self {
        VideoOptions {
            request_options: RequestOptions {
                cookies: value.cookies.clone(),
                max_retries: value.retries,
                timeout: value.timeout.map(Duration::from_secs),
                ..Default::default()
            },
        }
    }
}
