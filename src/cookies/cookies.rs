//! Cookie core types.
//!
//! This module defines the serializable [`Cookie`] record the session manager
//! computes and hands to the response layer, and the type-erased
//! [`CookieSinkHandle`] used to reach that layer.
//!
//! The manager never renders a `Set-Cookie` header itself; it only decides
//! *which* cookie should be sent and with which attributes.
//!
//! ```rust
//! use gosub_session::cookies::{Cookie, SameSite};
//!
//! let c = Cookie {
//!     name: "SESSIONID".into(),
//!     value: "abc123".into(),
//!     path: Some("/".into()),
//!     domain: Some("example.com".into()),
//!     secure: true,
//!     expires: Some(1_767_225_599), // unix seconds
//!     same_site: Some(SameSite::Lax),
//!     http_only: true,
//! };
//! assert!(!c.is_session_cookie());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cookies::CookieSink;

/// A handle to a cookie sink trait.
///
/// Sinks must be **`Send + Sync` and internally synchronized**, since callers
/// hold only `&self` when scheduling cookies.
pub type CookieSinkHandle = Arc<dyn CookieSink + Send + Sync>;

/// SameSite policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie as scheduled by the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive). Always the session name.
    pub name: String,

    /// Raw cookie value: the session id, or empty for an expiring cookie.
    pub value: String,

    /// Path scoping (e.g., `"/"`).
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration as unix seconds. `None` is a browser-session cookie; a value in the
    /// past asks the client to drop the cookie.
    pub expires: Option<i64>,

    /// SameSite policy.
    pub same_site: Option<SameSite>,

    /// If `true`, cookie is blocked from access by client-side scripts.
    pub http_only: bool,
}

impl Cookie {
    pub fn is_session_cookie(&self) -> bool {
        self.expires.is_none()
    }

    /// True when the expiry lies strictly before `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires, Some(ts) if ts < now)
    }
}
