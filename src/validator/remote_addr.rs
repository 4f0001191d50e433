use std::net::IpAddr;

use super::{ValidationContext, ValidationOutcome, Validator};

pub(super) const NAME: &str = "RemoteAddr";

/// Binds a session to the address of the caller it was first validated from.
///
/// The reference address is, in order: the recorded fingerprint (an empty string
/// counts as not recorded), the configured `expected` address, the current caller
/// address. The validator passes when the reference equals the current caller
/// address and records the reference as its fingerprint.
#[derive(Debug, Clone, Default)]
pub struct RemoteAddrValidator {
    expected: Option<IpAddr>,
}

impl RemoteAddrValidator {
    pub fn new(expected: Option<IpAddr>) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> Option<IpAddr> {
        self.expected
    }
}

impl Validator for RemoteAddrValidator {
    fn name(&self) -> &str {
        NAME
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let current = ctx.request.remote_addr_string();
        let reference = match (ctx.stored_str(), self.expected) {
            (Some(stored), _) => stored.to_string(),
            (None, Some(expected)) => expected.to_string(),
            (None, None) => current.clone(),
        };

        if reference != current {
            log::debug!("RemoteAddr mismatch: session bound to {reference:?}, caller is {current:?}");
        }

        ValidationOutcome::from(reference == current).with_fingerprint(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestContext;
    use serde_json::{json, Value};

    fn request(addr: &str) -> RequestContext {
        RequestContext::new(Some(addr.parse().unwrap()))
    }

    fn run(v: &RemoteAddrValidator, stored: Option<&Value>, req: &RequestContext) -> ValidationOutcome {
        v.evaluate(&ValidationContext { session_id: "abc", stored, request: req })
    }

    #[test]
    fn first_run_records_caller() {
        let outcome = run(&RemoteAddrValidator::default(), None, &request("10.1.2.3"));
        assert!(outcome.passed);
        assert_eq!(outcome.fingerprint, Some(json!("10.1.2.3")));
    }

    #[test]
    fn recorded_address_must_match() {
        let v = RemoteAddrValidator::default();
        let stored = json!("10.1.2.3");
        assert!(run(&v, Some(&stored), &request("10.1.2.3")).passed);

        let outcome = run(&v, Some(&stored), &request("10.9.9.9"));
        assert!(!outcome.passed);
        assert_eq!(outcome.fingerprint, Some(json!("10.1.2.3")));
    }

    #[test]
    fn configured_address_mismatch_fails() {
        let v = RemoteAddrValidator::new(Some("123.123.123.123".parse().unwrap()));
        assert!(!run(&v, None, &request("127.0.0.1")).passed);
        assert!(run(&v, None, &request("123.123.123.123")).passed);
    }

    #[test]
    fn empty_fingerprint_counts_as_not_recorded() {
        let empty = json!("");
        let outcome = run(&RemoteAddrValidator::default(), Some(&empty), &request("127.0.0.1"));
        assert!(outcome.passed);
        assert_eq!(outcome.fingerprint, Some(json!("127.0.0.1")));
    }

    #[test]
    fn unknown_caller_matches_unknown_reference() {
        let outcome = run(&RemoteAddrValidator::default(), None, &RequestContext::default());
        assert!(outcome.passed);
        assert_eq!(outcome.fingerprint, Some(json!("")));
    }
}
