//! qBittorrent Web API v2 client.
//!
//! Login posts the credentials and keeps the `SID` cookie; later requests send
//! it back together with a `Referer` matching the base URL (qBittorrent's CSRF
//! check rejects requests without one).

use url::Url;

use super::http::{self, Response};
use super::parse::{parse_sid_cookie, parse_torrents};
use super::{ClientError, Connector, QueueActions, TaskSource};
use crate::task::TaskSnapshot;

const LOGIN: &str = "api/v2/auth/login";
const TORRENTS_INFO: &str = "api/v2/torrents/info";
const BOTTOM_PRIO: &str = "api/v2/torrents/bottomPrio";

/// Connection parameters for one qBittorrent instance.
#[derive(Debug, Clone)]
pub struct QbitConnector {
    base: Url,
    username: String,
    password: String,
}

impl QbitConnector {
    /// Build a connector. `base_url` may carry a path prefix (reverse proxy).
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn login(&self) -> Result<QbitSession, ClientError> {
        let url = self.base.join(LOGIN)?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .finish();
        let referer = referer_for(&self.base);
        let resp = http::send(url.as_str(), &[format!("Referer: {referer}")], Some(&form))?;

        if resp.status == 403 {
            return Err(ClientError::Banned);
        }
        if !resp.is_success() {
            return Err(ClientError::Http {
                endpoint: LOGIN.to_string(),
                status: resp.status,
            });
        }
        if resp.text().trim() != "Ok." {
            return Err(ClientError::LoginRejected);
        }

        let sid = parse_sid_cookie(&resp.headers);
        if sid.is_none() {
            tracing::debug!("login succeeded without a SID cookie (auth bypass?)");
        }
        Ok(QbitSession {
            base: self.base.clone(),
            referer,
            sid,
        })
    }
}

impl Connector for QbitConnector {
    type Session = QbitSession;

    fn connect(&self) -> Result<QbitSession, ClientError> {
        tracing::debug!(url = %self.base, "connecting to qBittorrent");
        let session = self.login()?;
        tracing::debug!("connected to qBittorrent");
        Ok(session)
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// An authenticated session (the SID cookie, if the client issued one).
#[derive(Debug, Clone)]
pub struct QbitSession {
    base: Url,
    referer: String,
    sid: Option<String>,
}

impl QbitSession {
    fn headers(&self) -> Vec<String> {
        let mut headers = vec![format!("Referer: {}", self.referer)];
        if let Some(sid) = &self.sid {
            headers.push(format!("Cookie: SID={sid}"));
        }
        headers
    }

    fn request(&self, endpoint: &str, form: Option<&str>) -> Result<Response, ClientError> {
        let url = self.base.join(endpoint)?;
        let resp = http::send(url.as_str(), &self.headers(), form)?;
        if !resp.is_success() {
            return Err(ClientError::Http {
                endpoint: endpoint.to_string(),
                status: resp.status,
            });
        }
        Ok(resp)
    }
}

impl TaskSource for QbitSession {
    fn list_tasks(&mut self) -> Result<Vec<TaskSnapshot>, ClientError> {
        let resp = self.request(TORRENTS_INFO, None)?;
        parse_torrents(&resp.body)
    }
}

impl QueueActions for QbitSession {
    fn move_to_bottom(&mut self, hashes: &[&str]) -> Result<(), ClientError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("hashes", &hashes.join("|"))
            .finish();
        self.request(BOTTOM_PRIO, Some(&form))?;
        Ok(())
    }
}

/// `scheme://host[:port]` of the base URL.
fn referer_for(base: &Url) -> String {
    base.origin().ascii_serialization()
}
