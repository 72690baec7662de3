//! JSearch API client and the `PageSource` seam used by the fetch runner

use jobline_core::{http_client, HttpConfig, SHARED_RUNTIME};

use crate::config::Credentials;

/// Default search endpoint
pub const DEFAULT_BASE_URL: &str = "https://jsearch.p.rapidapi.com/search";

/// Raw HTTP result for one page: status code plus undecoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure before any HTTP status was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Connect(String),
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("request timed out"),
            Self::Connect(msg) => write!(f, "connection error: {msg}"),
            Self::Other(msg) => write!(f, "request error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    /// Classify a reqwest error. The URL is stripped so query text stays out of logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.without_url().to_string())
        } else {
            Self::Other(e.without_url().to_string())
        }
    }
}

/// Anything that can answer `fetch_page(query, page)`.
pub trait PageSource {
    fn fetch_page(&self, query: &str, page: u32) -> Result<PageResponse, TransportError>;
}

/// HTTP client for the JSearch `/search` endpoint
#[derive(Debug, Clone)]
pub struct JSearchClient {
    base_url: String,
    credentials: Credentials,
    http: HttpConfig,
}

impl JSearchClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, http: HttpConfig) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl PageSource for JSearchClient {
    fn fetch_page(&self, query: &str, page: u32) -> Result<PageResponse, TransportError> {
        let page = page.to_string();
        let params = [("query", query), ("page", page.as_str()), ("num_pages", "1")];
        SHARED_RUNTIME
            .handle()
            .block_on(async {
                let resp = http_client()
                    .get(&self.base_url)
                    .header("X-RapidAPI-Key", &self.credentials.key)
                    .header("X-RapidAPI-Host", &self.credentials.host)
                    .query(&params)
                    .timeout(self.http.request_timeout)
                    .send()
                    .await?;
                let status = resp.status().as_u16();
                let body = resp.text().await?;
                Ok::<_, reqwest::Error>(PageResponse { status, body })
            })
            .map_err(TransportError::from_reqwest)
    }
}
