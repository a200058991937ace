use thiserror::Error;

use crate::client::ClientError;

/// Why a cycle was aborted. Tracked state is untouched in every case.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Could not connect or log in to the client.
    #[error("failed to connect to download client: {0}")]
    Connect(ClientError),
    /// Connected, but listing tasks failed.
    #[error("failed to list tasks: {0}")]
    Fetch(ClientError),
    /// The cycle panicked; caught at the loop boundary.
    #[error("cycle panicked: {0}")]
    Panicked(String),
}

impl CycleError {
    /// The underlying client error, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            CycleError::Connect(e) | CycleError::Fetch(e) => Some(e),
            CycleError::Panicked(_) => None,
        }
    }
}
