//! Download-client access.
//!
//! The engine only sees three small traits:
//! - [`Connector`]: opens an authenticated session at the start of each poll
//! - [`TaskSource`]: lists the current tasks
//! - [`QueueActions`]: moves tasks to the bottom of the queue
//!
//! [`QbitConnector`] implements them against the qBittorrent Web API v2 using
//! libcurl; [`DryRun`] wraps any connector so demotions are only logged.

mod dry_run;
mod error;
mod http;
mod parse;
mod qbittorrent;

pub use dry_run::DryRun;
pub use error::{classify_curl_error, classify_http_status, ClientError, ErrorKind};
pub use qbittorrent::{QbitConnector, QbitSession};

use crate::task::TaskSnapshot;

/// Lists every task the client currently knows about.
pub trait TaskSource {
    fn list_tasks(&mut self) -> Result<Vec<TaskSnapshot>, ClientError>;
}

/// Queue manipulation on the client.
pub trait QueueActions {
    /// Move the given tasks (by hash) to the lowest queue priority.
    fn move_to_bottom(&mut self, hashes: &[&str]) -> Result<(), ClientError>;
}

/// Opens a session against the client. Called once per poll cycle.
pub trait Connector {
    type Session: TaskSource + QueueActions;

    fn connect(&self) -> Result<Self::Session, ClientError>;

    /// Human-readable endpoint for logs.
    fn describe(&self) -> String;
}
