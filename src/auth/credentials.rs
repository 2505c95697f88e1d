//! Login secret verification
//!
//! Exactly one credential is recognized; there is no user table.

/// Verify a submitted login secret against the configured one
///
/// Returns true iff the configured secret is non-empty and the submitted
/// value matches it exactly. An empty configured secret means login is
/// disabled: verification fails closed rather than accepting anything.
pub fn verify_secret(submitted: &str, configured: &str) -> bool {
    !configured.is_empty() && submitted == configured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret_accepted() {
        assert!(verify_secret("hunter2", "hunter2"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert!(!verify_secret("hunter3", "hunter2"));
    }

    #[test]
    fn test_empty_configured_secret_fails_closed() {
        assert!(!verify_secret("", ""));
        assert!(!verify_secret("anything", ""));
    }

    #[test]
    fn test_empty_submission_rejected() {
        assert!(!verify_secret("", "hunter2"));
    }

    #[test]
    fn test_whitespace_is_significant() {
        assert!(!verify_secret("hunter2 ", "hunter2"));
        assert!(!verify_secret(" hunter2", "hunter2"));
    }
}
