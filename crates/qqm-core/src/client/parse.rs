//! Parse qBittorrent Web API responses.

use serde::Deserialize;

use super::ClientError;
use crate::task::TaskSnapshot;

/// Subset of a `torrents/info` entry that the engine uses.
#[derive(Debug, Deserialize)]
struct TorrentInfo {
    hash: String,
    #[serde(default)]
    name: String,
    state: String,
    #[serde(default)]
    dlspeed: u64,
}

impl From<TorrentInfo> for TaskSnapshot {
    fn from(t: TorrentInfo) -> Self {
        TaskSnapshot {
            hash: t.hash,
            name: t.name,
            state: t.state,
            dlspeed: t.dlspeed,
        }
    }
}

/// Parse the JSON array returned by `torrents/info`.
pub(crate) fn parse_torrents(body: &[u8]) -> Result<Vec<TaskSnapshot>, ClientError> {
    let raw: Vec<TorrentInfo> = serde_json::from_slice(body)?;
    Ok(raw.into_iter().map(TaskSnapshot::from).collect())
}

/// Extract the `SID` session cookie from response header lines.
pub(crate) fn parse_sid_cookie(lines: &[String]) -> Option<String> {
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("set-cookie") {
            continue;
        }
        let first = value.trim().split(';').next().unwrap_or("");
        if let Some((k, v)) = first.split_once('=') {
            if k.trim() == "SID" && !v.trim().is_empty() {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}
