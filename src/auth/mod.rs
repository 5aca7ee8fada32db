//! Admin gate for catalog mutations.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use subtle::ConstantTimeEq;

/// Gate protecting admin-only mutations.
#[derive(Debug, Clone)]
pub struct AdminGate {
    expected_key: Option<String>,
}

impl AdminGate {
    pub fn new(expected_key: Option<String>) -> Self {
        if expected_key.is_none() {
            tracing::warn!("No admin key configured (LABLINK_ADMIN_KEY). Admin gate is open!");
        }
        Self { expected_key }
    }

    /// Check a candidate key. With no key configured the gate admits any
    /// candidate (dev mode).
    pub fn verify(&self, candidate: &str) -> bool {
        match &self.expected_key {
            Some(expected) => constant_time_compare(candidate, expected),
            None => true,
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_gate_rejects_wrong_key() {
        let gate = AdminGate::new(Some("admin123".to_string()));
        assert!(gate.verify("admin123"));
        assert!(!gate.verify("admin124"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn test_gate_open_without_configured_key() {
        let gate = AdminGate::new(None);
        assert!(gate.verify("anything"));
    }
}
