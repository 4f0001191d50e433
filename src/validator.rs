//! Session validators.
//!
//! A validator is a predicate the manager runs when a session is resumed. It
//! receives the fingerprint it recorded at the previous successful start (if
//! any) and the current request, and answers whether the session may be
//! resumed. It may return a fingerprint to store for the next request.
//!
//! Validators are collected in a [`ValidatorChain`]. Every validator in the
//! chain runs, even after an earlier one failed; the chain passes only when all
//! of them pass.
//!
//! Built-ins:
//! - [`IdValidator`] (`Id`): the session id must be well-formed. Attached by default.
//! - [`RemoteAddrValidator`] (`RemoteAddr`): the caller address must match the
//!   address recorded when the session was first validated.
//!
//! Applications attach their own checks by implementing [`Validator`] or with
//! [`ValidatorChain::attach_fn`].

use std::net::IpAddr;
use std::sync::Arc;

use serde_json::Value;

use crate::request::RequestContext;

mod chain;
mod id;
mod remote_addr;

pub use chain::{ChainReport, FnValidator, ValidatorChain};
pub use id::IdValidator;
pub use remote_addr::RemoteAddrValidator;

/// What a validator gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Id of the session being resumed.
    pub session_id: &'a str,
    /// Fingerprint this validator stored at the previous successful start.
    pub stored: Option<&'a Value>,
    /// The current request.
    pub request: &'a RequestContext,
}

impl ValidationContext<'_> {
    /// Stored fingerprint as a string, treating `""` and non-strings as "not recorded".
    pub fn stored_str(&self) -> Option<&str> {
        self.stored.and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

/// Result of one validator run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub passed: bool,
    /// Value to record under the validator's name for the next request.
    pub fingerprint: Option<Value>,
}

impl ValidationOutcome {
    pub fn pass() -> Self {
        Self { passed: true, fingerprint: None }
    }

    pub fn fail() -> Self {
        Self { passed: false, fingerprint: None }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<Value>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }
}

impl From<bool> for ValidationOutcome {
    fn from(passed: bool) -> Self {
        Self { passed, fingerprint: None }
    }
}

/// A check run at session resumption.
pub trait Validator: Send + Sync {
    /// Name under which the fingerprint is stored in the `_VALID` metadata map.
    fn name(&self) -> &str;

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome;
}

/// A handle to a validator trait.
pub type ValidatorHandle = Arc<dyn Validator + Send + Sync>;

/// Declarative identifiers for the built-in validators, as used in
/// [`SessionConfig`](crate::config::SessionConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorKind {
    Id,
    /// `expected` replaces the caller address as the reference when no fingerprint is
    /// recorded yet.
    RemoteAddr { expected: Option<IpAddr> },
}

impl ValidatorKind {
    /// The validators attached unless `attach_default_validators` is off.
    pub fn defaults() -> Vec<ValidatorKind> {
        vec![ValidatorKind::Id]
    }

    pub fn is_default(&self) -> bool {
        Self::defaults().contains(self)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValidatorKind::Id => id::NAME,
            ValidatorKind::RemoteAddr { .. } => remote_addr::NAME,
        }
    }

    pub fn build(&self) -> ValidatorHandle {
        match self {
            ValidatorKind::Id => Arc::new(IdValidator),
            ValidatorKind::RemoteAddr { expected } => Arc::new(RemoteAddrValidator::new(*expected)),
        }
    }
}
