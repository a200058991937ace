//! Blocking HTTP requests over libcurl.
//!
//! One `Easy` handle per request. Runs in the current thread; call from
//! `spawn_blocking` if used from async code.

use std::str;
use std::time::Duration;

use super::ClientError;

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status, raw header lines and body of a completed request.
#[derive(Debug)]
pub(crate) struct Response {
    pub status: u32,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Perform a GET (when `form` is `None`) or a form-encoded POST.
pub(crate) fn send(
    url: &str,
    extra_headers: &[String],
    form: Option<&str>,
) -> Result<Response, ClientError> {
    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(REQUEST_TIMEOUT)?;

    let mut list = curl::easy::List::new();
    for h in extra_headers {
        list.append(h)?;
    }
    if !extra_headers.is_empty() {
        easy.http_headers(list)?;
    }

    if let Some(form) = form {
        easy.post(true)?;
        easy.post_fields_copy(form.as_bytes())?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(Response {
        status,
        headers,
        body,
    })
}
