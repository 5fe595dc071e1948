//! Capability table layout errors.

use crate::ErrorSeverity;

/// A versioned table header that does not match the consumer's build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum AbiError {
    /// The header does not start with the table magic.
    #[error("capability table magic mismatch: got {actual:#010x}")]
    BadMagic {
        /// Magic value found in the header.
        actual: u32,
    },

    /// Producer and consumer were built against different generations.
    #[error("capability table generation mismatch: expected {expected}, got {actual}")]
    GenerationMismatch {
        /// Generation this build understands.
        expected: u32,
        /// Generation the producer declared.
        actual: u32,
    },

    /// Same generation number but a different struct size, i.e. one side
    /// edited a frozen layout.
    #[error("capability table size mismatch for generation {generation}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Generation both sides declared.
        generation: u32,
        /// Size this build expects.
        expected: u32,
        /// Size the producer declared.
        actual: u32,
    },
}

impl AbiError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_versions() {
        let err = AbiError::GenerationMismatch {
            expected: 2,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 1"));
    }

    #[test]
    fn test_bad_magic_is_hex() {
        let err = AbiError::BadMagic { actual: 0xDEAD_BEEF };
        assert!(err.to_string().contains("0xdeadbeef"));
    }
}
