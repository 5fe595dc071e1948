//! Property-based tests for the message buffer.

use std::fmt::Write as _;

use luaf_api::log::{INLINE_CAPACITY, MessageBuf};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_fragments_concatenate_exactly(parts in prop::collection::vec("\\PC{0,80}", 0..12)) {
        let mut buf = MessageBuf::new();
        for part in &parts {
            prop_assert!(matches!(buf.write_str(part), Ok(())));
        }
        let expected: String = parts.concat();
        prop_assert_eq!(buf.as_str(), expected.as_str());
        prop_assert_eq!(buf.len(), expected.len());
        prop_assert_eq!(buf.is_spilled(), expected.len() > INLINE_CAPACITY);
    }
}
