//! Response-layer contract and a simple in-memory implementation.
//!
//! The session manager schedules cookies on a [`CookieSink`]. Whatever sits
//! behind the sink (a web framework response, a test harness) is responsible
//! for actually emitting them.
//!
//! [`CookieJar`] is the reference implementation: it records every scheduled
//! cookie in order and lets callers simulate a response whose headers were
//! already sent.
//!
//! ## Notes & limitations
//! - No header rendering is done here.
//! - The jar is internally synchronized and can be shared behind a
//!   [`CookieSinkHandle`](crate::cookies::CookieSinkHandle).
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use anyhow::Result;

use crate::cookies::Cookie;
use crate::lock;

/// Receiver of the cookies a session manager wants sent to the client.
pub trait CookieSink: Send + Sync {
    /// Returns `true` once the response headers can no longer be changed.
    ///
    /// The manager checks this before scheduling and degrades to a warning.
    fn headers_sent(&self) -> bool;

    /// Schedules `cookie` for the response.
    fn schedule(&self, cookie: Cookie) -> Result<()>;
}

/// In-memory sink that records scheduled cookies.
#[derive(Debug, Default)]
pub struct CookieJar {
    scheduled: RwLock<Vec<Cookie>>,
    headers_sent: AtomicBool,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a response whose headers have (or have not) been flushed.
    pub fn set_headers_sent(&self, sent: bool) {
        self.headers_sent.store(sent, Ordering::SeqCst);
    }

    /// All cookies in scheduling order.
    pub fn scheduled(&self) -> Vec<Cookie> {
        lock::read(&self.scheduled).clone()
    }

    /// The last cookie scheduled under `name`. Later cookies overwrite earlier ones on the
    /// client, so this is what the client ends up with.
    pub fn latest(&self, name: &str) -> Option<Cookie> {
        lock::read(&self.scheduled).iter().rev().find(|c| c.name == name).cloned()
    }

    /// Removes and returns everything scheduled so far.
    pub fn take(&self) -> Vec<Cookie> {
        std::mem::take(&mut *lock::write(&self.scheduled))
    }

    pub fn clear(&self) {
        lock::write(&self.scheduled).clear();
    }
}

impl CookieSink for CookieJar {
    fn headers_sent(&self) -> bool {
        self.headers_sent.load(Ordering::SeqCst)
    }

    fn schedule(&self, cookie: Cookie) -> Result<()> {
        if self.headers_sent() {
            anyhow::bail!("cannot schedule cookie {:?}: headers already sent", cookie.name);
        }
        lock::write(&self.scheduled).push(cookie);
        Ok(())
    }
}
