//! Error taxonomy for the platform adapters.

/// Errors surfaced by adapters, the transport, and the normalizer.
///
/// Transient upstream conditions (`UpstreamTimeout`, `UpstreamUnavailable`)
/// are retryable by the caller; protocol-assumption violations
/// (`UnknownAuthState`, `TokenMissing`, `Cipher`) are not, since retrying
/// cannot change a markup or protocol mismatch. No automatic retries
/// happen inside the adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The platform rejected the supplied credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A fetch operation ran before a successful login.
    #[error("not authenticated; call authenticate first")]
    NotAuthenticated,

    /// Upstream answered with a non-success HTTP status.
    #[error("unexpected status {status} from {url}")]
    ResponseError { status: u16, url: String },

    /// The bounded request deadline elapsed.
    #[error("upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// Upstream could not be reached at all.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The post-login URL matched neither the accepted nor the rejected
    /// shape; the login protocol assumption no longer holds.
    #[error("unknown post-login state at {0}")]
    UnknownAuthState(String),

    /// A login-page field the flow depends on was absent.
    #[error("login page is missing the `{0}` field")]
    TokenMissing(&'static str),

    /// The SSO password scheme could not run (bad salt).
    #[error("credential cipher: {0}")]
    Cipher(String),

    /// Extraction found fewer fields than the platform contract promises.
    #[error("malformed upstream data: {0}")]
    MalformedUpstreamData(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown url>".to_string());
        if err.is_timeout() {
            AdapterError::UpstreamTimeout(url)
        } else if err.is_decode() {
            AdapterError::MalformedUpstreamData(err.to_string())
        } else {
            AdapterError::UpstreamUnavailable(err.to_string())
        }
    }
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
