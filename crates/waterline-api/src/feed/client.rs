// Feed HTTP client
//
// One GET per refresh against a fixed endpoint. Every request carries a
// fresh `nocache` query parameter so intermediate caches never serve a
// stale reading set.

use std::time::Duration;

use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::feed::payload::Payload;
use crate::transport::TransportConfig;

/// Query parameter appended to every request with the current epoch millis.
pub const CACHE_BUST_PARAM: &str = "nocache";

const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the sensor JSON feed.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl FeedClient {
    /// Create a feed client from a `TransportConfig`.
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            timeout: transport.timeout,
        })
    }

    /// Create a feed client from a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            timeout: TransportConfig::default().timeout,
        }
    }

    /// The configured endpoint, without the cache-busting parameter.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint URL for one request, tagged with `nonce` as the cache buster.
    ///
    /// Existing query parameters on the endpoint are preserved.
    pub fn request_url(&self, nonce: i64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &nonce.to_string());
        url
    }

    /// Fetch the feed and parse the body as JSON.
    pub async fn fetch_json(&self) -> Result<serde_json::Value, Error> {
        let url = self.request_url(chrono::Utc::now().timestamp_millis());
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                Error::Transport(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "feed body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    /// Fetch the feed and resolve its top-level shape.
    pub async fn fetch(&self) -> Result<Payload, Error> {
        let value = self.fetch_json().await?;
        let payload = Payload::resolve(value);
        debug!(shape = %payload.shape(), "feed payload resolved");
        Ok(payload)
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> FeedClient {
        FeedClient::with_client(reqwest::Client::new(), Url::parse(endpoint).unwrap())
    }

    #[test]
    fn request_url_appends_nonce() {
        let c = client("https://example.com/feed");
        assert_eq!(
            c.request_url(1_700_000_000_000).as_str(),
            "https://example.com/feed?nocache=1700000000000"
        );
    }

    #[test]
    fn request_url_keeps_existing_query() {
        let c = client("https://example.com/exec?id=abc");
        assert_eq!(
            c.request_url(42).as_str(),
            "https://example.com/exec?id=abc&nocache=42"
        );
        assert_eq!(c.endpoint().as_str(), "https://example.com/exec?id=abc");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(preview(&long).chars().count(), BODY_PREVIEW_LEN);
        assert_eq!(preview("short"), "short");
    }
}
