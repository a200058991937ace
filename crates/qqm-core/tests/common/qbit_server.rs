//! Minimal HTTP/1.1 server that imitates the qBittorrent Web API endpoints the
//! engine uses: `auth/login`, `torrents/info` and `torrents/bottomPrio`.
//!
//! One request per connection (`Connection: close`). Torrents and recorded
//! demotions live in shared state the test can inspect and mutate.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
const SID: &str = "test-session-id";

#[derive(Debug, Clone)]
pub struct FakeTorrent {
    pub hash: &'static str,
    pub name: &'static str,
    pub state: &'static str,
    pub dlspeed: u64,
}

#[derive(Debug, Default)]
pub struct ServerState {
    pub torrents: Vec<FakeTorrent>,
    /// Hashes received by `bottomPrio`, one entry per request.
    pub moved: Vec<Vec<String>>,
    pub logins: u32,
    /// When set, `torrents/info` answers with this HTTP status.
    pub info_status: Option<u16>,
    /// Requests to authenticated endpoints that lacked the SID cookie.
    pub unauthorized: u32,
}

#[derive(Clone)]
pub struct FakeQbit {
    pub url: String,
    pub state: Arc<Mutex<ServerState>>,
}

impl FakeQbit {
    pub fn set_torrents(&self, torrents: Vec<FakeTorrent>) {
        self.state.lock().unwrap().torrents = torrents;
    }

    pub fn moved(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().moved.clone()
    }
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start() -> FakeQbit {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(ServerState::default()));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state));
        }
    });
    FakeQbit {
        url: format!("http://127.0.0.1:{}", port),
        state,
    }
}

struct Request {
    method: String,
    path: String,
    cookie: Option<String>,
    body: String,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();

    let mut content_length = 0usize;
    let mut cookie = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("cookie") {
                cookie = Some(value.trim().to_string());
            }
        }
    }
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = String::from_utf8_lossy(&data[header_end..]).into_owned();
    Some(Request {
        method,
        path,
        cookie,
        body,
    })
}

fn form_value(body: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn respond(stream: &mut TcpStream, status: &str, extra: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        status,
        body.len(),
        extra,
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn handle(mut stream: TcpStream, state: &Mutex<ServerState>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    let authed = req
        .cookie
        .as_deref()
        .is_some_and(|c| c.contains(&format!("SID={SID}")));

    match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/api/v2/auth/login") => {
            let user = form_value(&req.body, "username");
            let pass = form_value(&req.body, "password");
            if user.as_deref() == Some(USERNAME) && pass.as_deref() == Some(PASSWORD) {
                state.lock().unwrap().logins += 1;
                let cookie = format!("Set-Cookie: SID={SID}; HttpOnly; path=/\r\n");
                respond(&mut stream, "200 OK", &cookie, "Ok.");
            } else {
                respond(&mut stream, "200 OK", "", "Fails.");
            }
        }
        ("GET", "/api/v2/torrents/info") => {
            let mut s = state.lock().unwrap();
            if !authed {
                s.unauthorized += 1;
                drop(s);
                respond(&mut stream, "403 Forbidden", "", "Forbidden");
                return;
            }
            if let Some(code) = s.info_status {
                drop(s);
                respond(&mut stream, &format!("{code} Error"), "", "");
                return;
            }
            let items: Vec<serde_json::Value> = s
                .torrents
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "hash": t.hash,
                        "name": t.name,
                        "state": t.state,
                        "dlspeed": t.dlspeed,
                        "progress": 0.42,
                    })
                })
                .collect();
            drop(s);
            let body = serde_json::Value::Array(items).to_string();
            respond(
                &mut stream,
                "200 OK",
                "Content-Type: application/json\r\n",
                &body,
            );
        }
        ("POST", "/api/v2/torrents/bottomPrio") => {
            let mut s = state.lock().unwrap();
            if !authed {
                s.unauthorized += 1;
                drop(s);
                respond(&mut stream, "403 Forbidden", "", "Forbidden");
                return;
            }
            let hashes = form_value(&req.body, "hashes").unwrap_or_default();
            s.moved
                .push(hashes.split('|').map(str::to_string).collect());
            drop(s);
            respond(&mut stream, "200 OK", "", "");
        }
        _ => respond(&mut stream, "404 Not Found", "", ""),
    }
}
