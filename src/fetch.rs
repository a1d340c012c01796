use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::constants::{DEFAULT_HEADERS, DEFAULT_MAX_RETRIES};
use crate::structs::{CustomRetryableStrategy, FetchError, RequestOptions, VideoError};

/// Fetch a url and return the whole body. Non-2xx responses are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// [`Fetcher`] backed by [`reqwest`] with transient failures retried
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(options: &RequestOptions) -> Result<Self, VideoError> {
        let client = if let Some(client) = options.client.as_ref() {
            client.clone()
        } else {
            let mut client = reqwest::Client::builder();

            if let Some(proxy) = options.proxy.as_ref() {
                client = client.proxy(proxy.clone());
            }

            if let Some(cookie) = options.cookies.as_ref() {
                let host = url::Url::parse("https://youtube.com")?;

                let jar = reqwest::cookie::Jar::default();
                jar.add_cookie_str(cookie.as_str(), &host);

                client = client.cookie_provider(Arc::new(jar));
            }

            client.build().map_err(FetchError::from)?
        };

        Ok(Self::from_client(
            client,
            options.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        ))
    }

    pub fn from_client(client: reqwest::Client, max_retries: u32) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                CustomRetryableStrategy,
            ))
            .build();

        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .headers(DEFAULT_HEADERS.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.bytes().await?)
    }
}
