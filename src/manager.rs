//! Session manager: the lifecycle state machine.
//!
//! A [`SessionManager`] handles the session of **one request**. It resolves the
//! session id, loads the persisted blob through a
//! [`SaveHandler`](crate::save_handler::SaveHandler) into [`Storage`], runs the
//! [`ValidatorChain`], and later flushes, regenerates or destroys the session.
//!
//! ```text
//!              start()                write_close()
//! NotStarted ───────────► Active ───────────────────► WriteClosed
//!     ▲                     │                              │
//!     └──── destroy() ──────┴──────────── destroy() ───────┘
//! ```
//!
//! `start()` on a started session is a no-op. A failed validation destroys the
//! persisted session and leaves the manager in `NotStarted`.
//!
//! # Example
//! ```rust
//! use gosub_session::manager::SessionManager;
//!
//! # fn main() -> Result<(), gosub_session::errors::SessionError> {
//! let mut manager = SessionManager::builder().build();
//! manager.start()?;
//! manager.storage().set("user", "alice")?;
//! manager.write_close()?;
//! assert!(manager.storage().set("user", "bob").is_err());
//! # Ok(()) }
//! ```

use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::SessionConfig;
use crate::cookies::{Cookie, CookieSinkHandle};
use crate::errors::{Result, SessionError};
use crate::ident;
use crate::request::RequestContext;
use crate::save_handler::SaveHandlerHandle;
use crate::storage::{Storage, StorageArena};
use crate::validator::{ChainReport, ValidationContext, ValidationOutcome, ValidatorChain, ValidatorHandle};

mod builder;
mod guard;
mod state;

pub use builder::SessionManagerBuilder;
pub use guard::WriteCloseGuard;
pub use state::{DestroyOptions, SessionStatus, SessionWarning};

/// Expiry used for cookies that must be dropped by the client right away.
const EXPIRED_COOKIE_OFFSET: i64 = 42_000;

pub struct SessionManager {
    config: SessionConfig,
    save_handler: SaveHandlerHandle,
    arena: Arc<StorageArena>,
    cookies: CookieSinkHandle,
    request: RequestContext,
    validators: ValidatorChain,
    storage: Storage,
    status: SessionStatus,
    id: String,
    /// Set by `destroy()` and by a failed validation: the id the client sent must not be
    /// resumed again, and the next `start()` begins from empty storage.
    destroyed: bool,
    /// Whether this manager put the current storage into the arena.
    registered: bool,
    warnings: Vec<SessionWarning>,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        save_handler: SaveHandlerHandle,
        arena: Arc<StorageArena>,
        cookies: CookieSinkHandle,
        request: RequestContext,
        validators: ValidatorChain,
    ) -> Self {
        Self {
            config,
            save_handler,
            arena,
            cookies,
            request,
            validators,
            storage: Storage::new(),
            status: SessionStatus::NotStarted,
            id: String::new(),
            destroyed: false,
            registered: false,
            warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Handle on the current session storage. Handles stay valid across `start()` as long
    /// as no other manager already holds state for the resumed id.
    pub fn storage(&self) -> Storage {
        self.storage.clone()
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn validators(&self) -> &ValidatorChain {
        &self.validators
    }

    pub fn attach_validator(&mut self, validator: ValidatorHandle) -> &mut Self {
        self.validators.attach(validator);
        self
    }

    pub fn attach_validator_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&ValidationContext<'_>) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.validators.attach_fn(name, f);
        self
    }

    /// Warnings recorded so far (cookies that could not be scheduled).
    pub fn warnings(&self) -> &[SessionWarning] {
        &self.warnings
    }

    // ---------- Identity ----------

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the id the next `start()` resumes.
    pub fn set_id(&mut self, id: &str) -> Result<()> {
        if self.status.is_started() {
            return Err(SessionError::InvalidOperation(
                "session has already been started; use regenerate_id() to change the id".to_string(),
            ));
        }
        if !ident::is_valid_id(id) {
            return Err(SessionError::InvalidArgument(format!("malformed session id {id:?}")));
        }
        self.id = id.to_string();
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if !ident::is_valid_name(name) {
            return Err(SessionError::InvalidArgument(format!(
                "session name {name:?} must be non-empty and alphanumeric"
            )));
        }
        if self.status.is_started() {
            return Err(SessionError::InvalidOperation(
                "cannot rename a session that has already been started".to_string(),
            ));
        }
        self.config.name = name.to_string();
        Ok(())
    }

    /// Whether a session is associated with this request and the save handler holds
    /// data for it. Pure query: only `read` is called on the save handler.
    pub fn session_exists(&self) -> bool {
        if self.status.is_started() {
            return !self.id.is_empty();
        }
        if self.destroyed {
            return false;
        }

        let candidate = if self.id.is_empty() {
            self.request_session_id()
        } else {
            Some(self.id.as_str())
        };
        candidate.is_some_and(|id| self.has_stored_data(id))
    }

    fn has_stored_data(&self, id: &str) -> bool {
        if self.arena.contains(id) {
            return true;
        }
        match self.save_handler.read(id) {
            Ok(blob) => !blob.is_empty(),
            Err(err) => {
                log::debug!("Cannot look up session {id}: {err}");
                false
            }
        }
    }

    fn request_session_id(&self) -> Option<&str> {
        if self.destroyed || !self.config.use_cookies {
            return None;
        }
        self.request.cookie(&self.config.name).filter(|id| ident::is_valid_id(id))
    }

    // ---------- Lifecycle ----------

    pub fn start(&mut self) -> Result<()> {
        if self.status.is_started() {
            return Ok(());
        }

        let id = if !self.id.is_empty() {
            self.id.clone()
        } else if let Some(id) = self.request_session_id() {
            id.to_string()
        } else {
            ident::generate_id()
        };

        self.save_handler
            .open(&self.config.save_path, &self.config.name)
            .map_err(SessionError::backend)?;
        let blob = self.save_handler.read(&id).map_err(SessionError::backend)?;

        if self.destroyed {
            self.storage = Storage::new();
        }
        // Only freshly adopted state is loaded; a live view already holds newer data.
        let storage = self.arena.bind(&id, &self.storage);
        let adopted = Storage::ptr_eq(&storage, &self.storage);
        if adopted && !blob.is_empty() {
            if let Err(err) = storage.load_blob(&blob) {
                self.arena.remove(&id);
                return Err(err);
            }
        }

        let now = now();
        let report = self.validators.evaluate(&id, &storage.validation_fingerprints(), &self.request);
        if !report.passed {
            log::warn!("Session validation failed ({}); destroying session", report.failed.join(", "));
            self.reject(&id);
            return Err(SessionError::ValidationFailed);
        }

        let expired = storage.expire_keys(now)?;
        if !expired.is_empty() {
            log::debug!("Expired session keys: {}", expired.join(", "));
        }
        storage.record_fingerprints(report.fingerprints)?;
        storage.touch(now)?;

        self.storage = storage;
        self.registered = adopted;
        self.status = SessionStatus::Active;
        log::info!("Session started");
        log::debug!("Session {id} is active");

        let needs_cookie = self.config.use_cookies && self.request.cookie(&self.config.name) != Some(id.as_str());
        self.id = id;
        if needs_cookie {
            let expires = (self.config.cookie_lifetime > 0)
                .then(|| now.saturating_add_unsigned(self.config.cookie_lifetime));
            self.send_cookie(self.id.clone(), expires);
        }

        Ok(())
    }

    /// Failed-validation policy: the persisted session is destroyed so it cannot be
    /// resumed on retry, and the manager returns to `NotStarted`.
    fn reject(&mut self, id: &str) {
        self.arena.remove(id);
        self.storage = Storage::new();
        self.status = SessionStatus::NotStarted;
        self.id.clear();
        self.destroyed = true;
        self.registered = false;
        if let Err(err) = self.save_handler.destroy(id) {
            log::warn!("Failed to destroy rejected session: {err}");
        }
    }

    /// Persists the session and makes its storage read-only. No-op unless `Active`.
    pub fn write_close(&mut self) -> Result<()> {
        if self.status != SessionStatus::Active {
            return Ok(());
        }

        let blob = self.storage.to_blob()?;
        self.save_handler.write(&self.id, &blob).map_err(SessionError::backend)?;
        self.storage.mark_immutable();
        if self.arena.get(&self.id).is_some_and(|s| Storage::ptr_eq(&s, &self.storage)) {
            self.arena.remove(&self.id);
        }
        self.registered = false;
        self.status = SessionStatus::WriteClosed;
        log::debug!("Session {} written and closed", self.id);
        Ok(())
    }

    /// Moves the session to a fresh id and returns it. No-op before `start()`.
    pub fn regenerate_id(&mut self) -> Result<String> {
        if !self.status.is_started() {
            return Ok(self.id.clone());
        }

        let old = self.id.clone();
        let new = ident::generate_id();

        let blob = self.storage.to_blob()?;
        self.save_handler.write(&new, &blob).map_err(SessionError::backend)?;
        self.save_handler.destroy(&old).map_err(SessionError::backend)?;
        // A write-closed view is never registered; the new blob is canonical for it.
        if self.arena.rekey(&old, &new).is_none() && self.status == SessionStatus::Active {
            self.arena.bind(&new, &self.storage);
            self.registered = true;
        }
        self.id = new;
        log::info!("Session id regenerated");

        if self.config.use_cookies {
            self.send_expire_cookie();
            let expires = (self.config.cookie_lifetime > 0)
                .then(|| now().saturating_add_unsigned(self.config.cookie_lifetime));
            self.send_cookie(self.id.clone(), expires);
        }

        Ok(self.id.clone())
    }

    /// Removes the persisted session and returns to `NotStarted`.
    ///
    /// `clear_storage` empties the live view afterwards. A write-closed view stays
    /// readable as it is.
    pub fn destroy(&mut self, options: DestroyOptions) -> Result<()> {
        if !self.id.is_empty() {
            self.save_handler.destroy(&self.id).map_err(SessionError::backend)?;
            self.arena.remove(&self.id);
        }

        if options.send_expire_cookie && self.config.use_cookies {
            self.send_expire_cookie();
        }

        self.status = SessionStatus::NotStarted;
        self.id.clear();
        self.destroyed = true;
        self.registered = false;
        log::info!("Session destroyed");

        if options.clear_storage {
            if self.storage.is_immutable() {
                log::debug!("Session storage is write-closed; leaving it unchanged");
            } else {
                self.storage.clear_all()?;
            }
        }
        Ok(())
    }

    /// Re-runs the validator chain against the current metadata without side effects.
    pub fn is_valid(&self) -> bool {
        self.validation_report().passed
    }

    pub fn validation_report(&self) -> ChainReport {
        self.validators
            .evaluate(&self.id, &self.storage.validation_fingerprints(), &self.request)
    }

    /// Runs the save handler's garbage collection with the configured lifetime.
    pub fn gc(&self) -> Result<usize> {
        self.save_handler
            .gc(self.config.gc_max_lifetime)
            .map_err(SessionError::backend)
    }

    /// Borrow that flushes the session when dropped.
    pub fn guard(&mut self) -> WriteCloseGuard<'_> {
        WriteCloseGuard::new(self)
    }

    // ---------- Cookies ----------

    /// Makes the session cookie persistent for `ttl` seconds (default: `remember_me_seconds`).
    pub fn remember_me(&mut self, ttl: Option<u64>) -> Result<()> {
        self.require_started("remember_me")?;
        if !self.config.use_cookies {
            return Ok(());
        }
        let ttl = ttl.unwrap_or(self.config.remember_me_seconds);
        self.send_cookie(self.id.clone(), Some(now().saturating_add_unsigned(ttl)));
        Ok(())
    }

    /// Turns the session cookie back into a browser-session cookie.
    pub fn forget_me(&mut self) -> Result<()> {
        self.require_started("forget_me")?;
        if !self.config.use_cookies {
            return Ok(());
        }
        self.send_cookie(self.id.clone(), None);
        Ok(())
    }

    fn require_started(&self, op: &str) -> Result<()> {
        if !self.status.is_started() {
            return Err(SessionError::InvalidOperation(format!("{op}() requires a started session")));
        }
        Ok(())
    }

    fn send_expire_cookie(&mut self) {
        self.send_cookie(String::new(), Some(now() - EXPIRED_COOKIE_OFFSET));
    }

    fn session_cookie(&self, value: String, expires: Option<i64>) -> Cookie {
        Cookie {
            name: self.config.name.clone(),
            value,
            path: self.config.cookie_path.clone(),
            domain: self.config.cookie_domain.clone(),
            secure: self.config.cookie_secure,
            expires,
            same_site: self.config.cookie_same_site,
            http_only: self.config.cookie_http_only,
        }
    }

    fn send_cookie(&mut self, value: String, expires: Option<i64>) {
        let cookie = self.session_cookie(value, expires);

        if self.cookies.headers_sent() {
            let warning = SessionWarning::HeadersAlreadySent { cookie: cookie.name };
            log::warn!("{warning}");
            self.warnings.push(warning);
            return;
        }

        let name = cookie.name.clone();
        if let Err(err) = self.cookies.schedule(cookie) {
            let warning = SessionWarning::CookieRejected {
                cookie: name,
                reason: err.to_string(),
            };
            log::warn!("{warning}");
            self.warnings.push(warning);
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // An unflushed session must not stay registered once its owner is gone.
        if self.registered
            && self.status == SessionStatus::Active
            && self.arena.get(&self.id).is_some_and(|s| Storage::ptr_eq(&s, &self.storage))
        {
            log::debug!("Session {} dropped without write_close", self.id);
            self.arena.remove(&self.id);
        }
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
