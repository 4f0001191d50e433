//! Session configuration.
//!
//! `SessionConfig` holds the read-only options a
//! [`SessionManager`](crate::manager::SessionManager) consumes: the session
//! name, the cookie policy, the remember-me lifetime, which validators are
//! attached and where the save handler keeps its data.
//!
//! `SessionConfig` provides sensible defaults via [`Default`] and a fluent
//! [`SessionConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_session::config::SessionConfig;
//! let cfg = SessionConfig::default();
//! assert_eq!(cfg.name, "SESSIONID");
//! assert!(cfg.use_cookies);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_session::config::SessionConfig;
//! use gosub_session::validator::ValidatorKind;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = SessionConfig::builder()
//!     .name("shopsession")
//!     .cookie_lifetime(3600)
//!     .cookie_secure(true)
//!     .remember_me_seconds(86_400)
//!     .validator(ValidatorKind::RemoteAddr { expected: None })
//!     .build()?; // returns Result<SessionConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `name`: Session (and cookie) name, alphanumeric only (default: `SESSIONID`).
//! - `use_cookies`: Emit the session id through cookies (default: `true`).
//! - `cookie_lifetime`: Cookie lifetime in seconds, `0` for a browser-session cookie.
//! - `cookie_path`, `cookie_domain`, `cookie_secure`, `cookie_http_only`, `cookie_same_site`:
//!   attributes copied onto every cookie the manager schedules.
//! - `remember_me_seconds`: Default lifetime used by `remember_me()` (default: two weeks).
//! - `attach_default_validators`: Put the default validators (`Id`) in front of `validators`.
//! - `validators`: Explicitly declared validators.
//! - `save_path`: Opaque location handed to the save handler's `open`.
//! - `gc_max_lifetime`: Seconds after which the save handler may collect a session.
//!
//! # Errors
//!
//! Builder validation can return [`ConfigError`] if values are invalid
//! (e.g. a non-alphanumeric name or a zero remember-me lifetime).

use std::fmt;

use crate::cookies::SameSite;
use crate::validator::ValidatorKind;

pub const DEFAULT_SESSION_NAME: &str = "SESSIONID";
const TWO_WEEKS: u64 = 60 * 60 * 24 * 14;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub name: String,
    pub use_cookies: bool,
    pub cookie_lifetime: u64,
    pub cookie_path: Option<String>,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: Option<SameSite>,
    pub remember_me_seconds: u64,
    pub attach_default_validators: bool,
    pub validators: Vec<ValidatorKind>,
    pub save_path: String,
    pub gc_max_lifetime: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_string(),
            use_cookies: true,
            cookie_lifetime: 0,
            cookie_path: Some("/".to_string()),
            cookie_domain: None,
            cookie_secure: false,
            cookie_http_only: true,
            cookie_same_site: Some(SameSite::Lax),
            remember_me_seconds: TWO_WEEKS,
            attach_default_validators: true,
            validators: Vec::new(),
            save_path: String::new(),
            gc_max_lifetime: 1440,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validators in attachment order: defaults first (unless disabled), then the declared ones.
    pub fn effective_validators(&self) -> Vec<ValidatorKind> {
        let mut kinds = if self.attach_default_validators {
            ValidatorKind::defaults()
        } else {
            Vec::new()
        };

        for kind in &self.validators {
            if kinds.contains(kind) && kind.is_default() {
                continue;
            }
            kinds.push(kind.clone());
        }

        kinds
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    inner: SessionConfig,
}

impl SessionConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut SessionConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn name<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.name = name.into()) }
    pub fn use_cookies(self, on: bool) -> Self { self.map(|c| c.use_cookies = on) }
    pub fn cookie_lifetime(self, secs: u64) -> Self { self.map(|c| c.cookie_lifetime = secs) }
    pub fn cookie_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.cookie_path = Some(path.into())) }
    pub fn cookie_domain<S: Into<String>>(self, domain: S) -> Self { self.map(|c| c.cookie_domain = Some(domain.into())) }
    pub fn cookie_secure(self, on: bool) -> Self { self.map(|c| c.cookie_secure = on) }
    pub fn cookie_http_only(self, on: bool) -> Self { self.map(|c| c.cookie_http_only = on) }
    pub fn cookie_same_site(self, same_site: SameSite) -> Self { self.map(|c| c.cookie_same_site = Some(same_site)) }
    pub fn remember_me_seconds(self, secs: u64) -> Self { self.map(|c| c.remember_me_seconds = secs) }
    pub fn attach_default_validators(self, on: bool) -> Self { self.map(|c| c.attach_default_validators = on) }
    pub fn validator(self, kind: ValidatorKind) -> Self { self.map(|c| c.validators.push(kind)) }
    pub fn validators(self, kinds: Vec<ValidatorKind>) -> Self { self.map(|c| c.validators = kinds) }
    pub fn save_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.save_path = path.into()) }
    pub fn gc_max_lifetime(self, secs: u64) -> Self { self.map(|c| c.gc_max_lifetime = secs) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut SessionConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidName(String),
    ZeroRememberMe,
    ZeroGcLifetime,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidName(name) =>
                write!(f, "session name {name:?} must be non-empty and alphanumeric"),
            ConfigError::ZeroRememberMe =>
                write!(f, "remember_me_seconds must be at least 1"),
            ConfigError::ZeroGcLifetime =>
                write!(f, "gc_max_lifetime must be at least 1"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &SessionConfig) -> Result<(), ConfigError> {
    if !crate::ident::is_valid_name(&c.name) {
        return Err(ConfigError::InvalidName(c.name.clone()));
    }
    if c.remember_me_seconds == 0 {
        return Err(ConfigError::ZeroRememberMe);
    }
    if c.gc_max_lifetime == 0 {
        return Err(ConfigError::ZeroGcLifetime);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn defaults_validate() {
        let cfg = SessionConfig::builder().build().unwrap();
        assert_eq!(cfg.name, DEFAULT_SESSION_NAME);
        assert_eq!(cfg.remember_me_seconds, TWO_WEEKS);
        assert!(cfg.attach_default_validators);
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "with space", "semi;colon", "dash-ed"] {
            let err = SessionConfig::builder().name(bad).build().unwrap_err();
            assert_eq!(err, ConfigError::InvalidName(bad.to_string()));
        }
    }

    #[test]
    fn rejects_zero_lifetimes() {
        assert_eq!(
            SessionConfig::builder().remember_me_seconds(0).build().unwrap_err(),
            ConfigError::ZeroRememberMe
        );
        assert_eq!(
            SessionConfig::builder().gc_max_lifetime(0).build().unwrap_err(),
            ConfigError::ZeroGcLifetime
        );
    }

    #[test]
    fn default_validator_set_is_id() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.effective_validators(), vec![ValidatorKind::Id]);
    }

    #[test]
    fn defaults_come_first_and_are_not_duplicated() {
        let addr: IpAddr = "10.0.0.1".parse().unwrap();
        let cfg = SessionConfig::builder()
            .validator(ValidatorKind::RemoteAddr { expected: Some(addr) })
            .validator(ValidatorKind::Id)
            .build()
            .unwrap();

        assert_eq!(
            cfg.effective_validators(),
            vec![ValidatorKind::Id, ValidatorKind::RemoteAddr { expected: Some(addr) }]
        );
    }

    #[test]
    fn disabling_defaults_yields_explicit_list() {
        let cfg = SessionConfig::builder()
            .attach_default_validators(false)
            .validator(ValidatorKind::RemoteAddr { expected: None })
            .build()
            .unwrap();

        assert_eq!(cfg.effective_validators(), vec![ValidatorKind::RemoteAddr { expected: None }]);
    }
}
