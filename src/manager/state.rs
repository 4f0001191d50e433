use std::fmt;

/// Lifecycle state of the session managed by a [`SessionManager`](super::SessionManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session is running for this request (initial state, and after `destroy()`).
    #[default]
    NotStarted,
    /// Started and writable.
    Active,
    /// Flushed to the save handler; storage is immutable.
    WriteClosed,
}

impl SessionStatus {
    pub fn is_started(&self) -> bool {
        !matches!(self, SessionStatus::NotStarted)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::NotStarted => write!(f, "not started"),
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::WriteClosed => write!(f, "write-closed"),
        }
    }
}

/// Options for [`SessionManager::destroy`](super::SessionManager::destroy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Also empty the live storage (user keys and metadata).
    pub clear_storage: bool,
    /// Ask the client to drop the session cookie.
    pub send_expire_cookie: bool,
}

impl Default for DestroyOptions {
    fn default() -> Self {
        Self {
            clear_storage: false,
            send_expire_cookie: true,
        }
    }
}

/// Non-fatal problems recorded while managing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionWarning {
    /// The response headers were already sent, so the cookie could not be scheduled.
    HeadersAlreadySent { cookie: String },
    /// The cookie sink refused the cookie for another reason.
    CookieRejected { cookie: String, reason: String },
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionWarning::HeadersAlreadySent { cookie } =>
                write!(f, "cannot send session cookie {cookie:?}: headers already sent"),
            SessionWarning::CookieRejected { cookie, reason } =>
                write!(f, "session cookie {cookie:?} rejected: {reason}"),
        }
    }
}
