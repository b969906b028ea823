//! Blocking HTTP fetching for pages, stylesheets and favicons.

use std::time::Duration;

use url::Url;

use crate::error::FetchError;
use crate::retry::{retry_with_backoff, RetryConfig};

/// Mimics a common desktop browser to avoid basic bot detection.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Status and body of a completed request. Non-2xx statuses are not errors
/// at this level; callers decide what a status means for them.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub trait HttpFetcher: Send + Sync {
    fn get(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
    retry: RetryConfig,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, retry: RetryConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client, retry })
    }

    fn get_once(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| classify(url, e))?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| classify(url, e))?.to_vec();
        Ok(FetchResponse { status, body })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        log::debug!("GET {url}");
        retry_with_backoff(
            &self.retry,
            &format!("GET {url}"),
            FetchError::is_transient,
            || self.get_once(url),
        )
    }
}

pub(crate) fn classify(url: &Url, err: reqwest::Error) -> FetchError {
    let url = url.clone();
    if err.is_timeout() {
        FetchError::Timeout { url }
    } else if err.is_connect() {
        FetchError::Connect {
            url,
            message: err.to_string(),
        }
    } else {
        FetchError::Request {
            url,
            message: err.to_string(),
        }
    }
}
