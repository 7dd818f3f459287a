use thiserror::Error;

/// Failure of a single backend round trip.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout or body-read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; the backend's payload is carried as-is
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// 2xx response whose body does not match the endpoint contract
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The request's cancellation token fired before it settled
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
