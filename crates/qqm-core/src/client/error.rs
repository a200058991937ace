//! Client error type and its coarse classification for logging.

use thiserror::Error;

/// Error talking to the download client (transport, HTTP status, auth, decoding).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Curl reported an error (timeout, connection refused, DNS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Non-2xx response from an API endpoint.
    #[error("{endpoint} returned HTTP {status}")]
    Http { endpoint: String, status: u32 },
    /// Login answered `Fails.`: wrong username or password.
    #[error("login rejected: bad username or password")]
    LoginRejected,
    /// Login answered 403: the client banned this IP after failed attempts.
    #[error("login refused: IP is banned by the client")]
    Banned,
    /// Response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// High-level classification of a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused, DNS, reset).
    Connection,
    /// Credentials rejected or IP banned.
    Auth,
    /// Server-side failure (5xx).
    Http5xx(u16),
    Other,
}

impl ErrorKind {
    /// Transient failures are expected to clear up by the next poll.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Http5xx(_)
        )
    }
}

/// Classify an HTTP status code.
pub fn classify_http_status(status: u32) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Auth,
        500..=599 => ErrorKind::Http5xx(status as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Curl(e) => classify_curl_error(e),
            ClientError::Http { status, .. } => classify_http_status(*status),
            ClientError::LoginRejected | ClientError::Banned => ErrorKind::Auth,
            ClientError::Decode(_) | ClientError::Url(_) => ErrorKind::Other,
        }
    }
}
