use thiserror::Error;
use url::Url;

/// Failure of a single outbound HTTP request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request to {url} timed out")]
    Timeout { url: Url },
    #[error("could not connect to {url}: {message}")]
    Connect { url: Url, message: String },
    #[error("request to {url} failed: {message}")]
    Request { url: Url, message: String },
}

impl FetchError {
    /// Timeouts and connection failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout { .. } | FetchError::Connect { .. })
    }
}

/// Failure of a language model call. Malformed *content* is not an error
/// here; callers judge the text they get back.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model request failed: {0}")]
    Transport(#[from] FetchError),
    #[error("language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language model response had no message content")]
    EmptyResponse,
    #[error("could not decode language model response: {0}")]
    Decode(String),
}

impl LlmError {
    /// Transport hiccups, rate limiting and server errors are retried.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(e) => e.is_transient(),
            LlmError::Status { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            LlmError::EmptyResponse | LlmError::Decode(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is not a valid {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("could not load tokenizer: {0}")]
    Tokenizer(String),
    #[error(transparent)]
    Http(#[from] FetchError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[derive(Debug, Error)]
pub enum FaviconError {
    #[error("could not fetch {url}: {source}")]
    Fetch { url: Url, source: FetchError },
    #[error("{url} returned HTTP {status}")]
    Status { url: Url, status: u16 },
    #[error("no favicon found for {0}")]
    NotFound(Url),
    #[error("could not decode favicon {url}: {source}")]
    Decode {
        url: Url,
        source: image::ImageError,
    },
    #[error("favicon {0} has no opaque pixels")]
    Empty(Url),
}

/// Why a palette could not be produced for a URL.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{input:?} is not a valid URL: {source}")]
    InvalidUrl {
        input: String,
        source: url::ParseError,
    },
    #[error("failed to retrieve the webpage {url}: {source}")]
    Fetch { url: Url, source: FetchError },
    #[error("failed to retrieve the webpage {url}. Status code: {status}")]
    PageStatus { url: Url, status: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_and_server_errors_are_transient() {
        let status = |status| LlmError::Status {
            status,
            body: String::new(),
        };
        assert!(status(429).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(401).is_transient());
        assert!(!LlmError::EmptyResponse.is_transient());
    }
}
