//! Ambient data of the request a session is resumed in.

use std::collections::HashMap;
use std::net::IpAddr;

use http::header::COOKIE;
use http::HeaderMap;

/// What the manager and the validators know about the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Address of the caller, if the transport knows it.
    pub remote_addr: Option<IpAddr>,
    /// Cookies sent by the client, by name.
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(remote_addr: Option<IpAddr>) -> Self {
        Self {
            remote_addr,
            cookies: HashMap::new(),
        }
    }

    /// Builds a context from request headers, reading every `Cookie` header.
    ///
    /// Pairs without `=` are skipped; when a name repeats the first value wins.
    pub fn from_headers(headers: &HeaderMap, remote_addr: Option<IpAddr>) -> Self {
        let mut cookies = HashMap::new();

        for header in headers.get_all(COOKIE) {
            let Ok(header_str) = header.to_str() else {
                continue;
            };
            for pair in header_str.split(';') {
                if let Some((name, value)) = pair.split_once('=') {
                    let name = name.trim();
                    if !name.is_empty() {
                        cookies
                            .entry(name.to_string())
                            .or_insert_with(|| value.trim().to_string());
                    }
                }
            }
        }

        Self { remote_addr, cookies }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Caller address as used in fingerprints; `""` when unknown.
    pub fn remote_addr_string(&self) -> String {
        self.remote_addr.map(|a| a.to_string()).unwrap_or_default()
    }
}
