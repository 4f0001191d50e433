use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{ValidationContext, ValidationOutcome, Validator, ValidatorHandle, ValidatorKind};
use crate::request::RequestContext;

/// Closure-backed validator.
pub struct FnValidator<F> {
    name: String,
    f: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&ValidationContext<'_>) -> ValidationOutcome + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&ValidationContext<'_>) -> ValidationOutcome + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        (self.f)(ctx)
    }
}

/// Aggregate result of a chain run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainReport {
    pub passed: bool,
    /// Names of the validators that failed, in evaluation order.
    pub failed: Vec<String>,
    /// Fingerprints to record, keyed by validator name.
    pub fingerprints: Map<String, Value>,
}

/// Ordered list of validators. All run; the chain passes when every one passes.
#[derive(Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<ValidatorHandle>,
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain from declared identifiers, in order.
    pub fn from_kinds(kinds: &[ValidatorKind]) -> Self {
        Self {
            validators: kinds.iter().map(ValidatorKind::build).collect(),
        }
    }

    /// Appends a validator; evaluation follows attachment order.
    pub fn attach(&mut self, validator: ValidatorHandle) -> &mut Self {
        self.validators.push(validator);
        self
    }

    pub fn attach_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&ValidationContext<'_>) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.attach(Arc::new(FnValidator::new(name, f)))
    }

    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Runs every validator against the stored fingerprints. No short-circuit.
    pub fn evaluate(&self, session_id: &str, stored: &Map<String, Value>, request: &RequestContext) -> ChainReport {
        let mut report = ChainReport {
            passed: true,
            ..ChainReport::default()
        };

        for validator in &self.validators {
            let name = validator.name();
            let ctx = ValidationContext {
                session_id,
                stored: stored.get(name),
                request,
            };
            let outcome = validator.evaluate(&ctx);

            if !outcome.passed {
                log::debug!("Validator {name} rejected session");
                report.passed = false;
                report.failed.push(name.to_string());
            }
            if let Some(fingerprint) = outcome.fingerprint {
                report.fingerprints.insert(name.to_string(), fingerprint);
            }
        }

        report
    }
}
