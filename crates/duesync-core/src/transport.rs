//! Cookie-holding HTTP sessions with a bounded request deadline.
//!
//! Each adapter opens its own [`SessionTransport`] per request: the cookie
//! jar is the session state, the transport is its sole owner, and nothing
//! is pooled or reused across requests. Configuration is an explicit
//! struct handed to adapter constructors — there is no process-wide
//! client singleton.

use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::domain::{AdapterError, Result};

/// Browser identity presented on every request of a session.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Transport configuration, set once per adapter and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User-agent sent on every request of the session.
    pub user_agent: String,
    /// Hard deadline for each request. A stalled upstream surfaces
    /// [`AdapterError::UpstreamTimeout`] instead of hanging.
    pub timeout: Duration,
    /// Skip TLS certificate verification. Required for one upstream whose
    /// chain does not validate; off everywhere else.
    pub accept_invalid_certs: bool,
    /// Extra headers attached to every request (client hints and the like).
    pub default_headers: HeaderMap,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
            accept_invalid_certs: false,
            default_headers: HeaderMap::new(),
        }
    }
}

impl TransportConfig {
    /// Override the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An authenticated-or-not HTTP session bound to one platform.
///
/// Cookies set by responses are replayed on subsequent requests of the
/// same transport, so the remote server sees one logical client.
#[derive(Debug)]
pub struct SessionTransport {
    client: reqwest::Client,
}

impl SessionTransport {
    /// Open a fresh session with an empty cookie jar.
    pub fn open(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(config.default_headers.clone())
            .cookie_store(true)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| AdapterError::UpstreamUnavailable(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url`, rejecting non-success statuses.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        Self::check_status(response)
    }

    /// GET `url` and return the response body as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    /// GET `url` with `Accept: application/json` and decode the body.
    ///
    /// A body that does not match `T` surfaces
    /// [`AdapterError::MalformedUpstreamData`].
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let response = Self::check_status(response)?;
        Ok(response.json::<T>().await?)
    }

    /// POST an urlencoded form, rejecting non-success statuses.
    ///
    /// Redirects are followed, so the returned response's URL is the final
    /// one — login flows inspect it to classify the outcome.
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Response> {
        let response = self.client.post(url).form(form).send().await?;
        Self::check_status(response)
    }

    /// Like [`post_form`](Self::post_form), with extra per-request headers.
    pub async fn post_form_with_headers(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .form(form)
            .send()
            .await?;
        Self::check_status(response)
    }

    /// Never swallow a failed fetch: a non-success status becomes a
    /// [`AdapterError::ResponseError`] carrying status and URL.
    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AdapterError::ResponseError {
                status: status.as_u16(),
                url: response.url().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_bounded_timeout() {
        let config = TransportConfig::default();
        assert!(config.timeout <= Duration::from_secs(30));
        assert!(config.timeout > Duration::ZERO);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_open_builds_session() {
        let config = TransportConfig::default().with_timeout(Duration::from_millis(250));
        assert!(SessionTransport::open(&config).is_ok());
    }
}
