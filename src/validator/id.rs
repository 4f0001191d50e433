use super::{ValidationContext, ValidationOutcome, Validator};
use crate::ident;

pub(super) const NAME: &str = "Id";

/// Passes when the session id is syntactically well-formed.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdValidator;

impl Validator for IdValidator {
    fn name(&self) -> &str {
        NAME
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        if ident::is_valid_id(ctx.session_id) {
            ValidationOutcome::pass().with_fingerprint(ctx.session_id)
        } else {
            ValidationOutcome::fail()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestContext;
    use serde_json::json;

    fn run(id: &str) -> ValidationOutcome {
        let request = RequestContext::default();
        IdValidator.evaluate(&ValidationContext { session_id: id, stored: None, request: &request })
    }

    #[test]
    fn well_formed_ids_pass_with_fingerprint() {
        let outcome = run("abcDEF123,-x");
        assert!(outcome.passed);
        assert_eq!(outcome.fingerprint, Some(json!("abcDEF123,-x")));
    }

    #[test]
    fn malformed_ids_fail() {
        assert!(!run("").passed);
        assert!(!run("has space").passed);
        assert!(!run("semi;colon").passed);
    }
}
