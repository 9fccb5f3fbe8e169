//! error types
//!
//! structured errors for config, transport, json, and api responses.

use reqwest::header::HeaderMap;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// raw http response attached to api errors
///
/// carries enough of the failed exchange (status, headers, body) for the
/// caller to inspect details without re-issuing the request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// http status code
    pub status: u16,
    /// response headers
    pub headers: HeaderMap,
    /// raw response body
    pub body: String,
}

/// error type for the puppetdb client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// http 401 from the api
    #[error("unauthorized (http 401): {}", .0.body)]
    Unauthorized(ApiResponse),

    /// http 403 from the api
    #[error("forbidden (http 403): {}", .0.body)]
    Forbidden(ApiResponse),

    /// any other 4xx/5xx from the api
    #[error("api error (http {}): {}", .0.status, .0.body)]
    Api(ApiResponse),
}

impl Error {
    /// true for 401/403 responses, the two access-denied kinds
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::Unauthorized(_) | Error::Forbidden(_))
    }

    /// the raw response carried by an api error, if any
    pub fn api_response(&self) -> Option<&ApiResponse> {
        match self {
            Error::Unauthorized(response) | Error::Forbidden(response) | Error::Api(response) => {
                Some(response)
            }
            _ => None,
        }
    }
}
