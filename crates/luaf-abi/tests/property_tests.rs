//! Property-based tests for header validation and string decoding.

#![expect(unsafe_code, reason = "tables are built from raw function pointers")]

use luaf_abi::ffi::{abi_len, decode_str, legacy_arg, decode_legacy_str};
use luaf_abi::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_only_exact_header_is_compatible(
        magic in any::<u32>(),
        generation in 0u32..8,
        size in 0u32..256,
    ) {
        let header = TableHeader { magic, generation, size, reserved: 0 };
        let exact = TableHeader::for_table::<gen2::CoreApiParam>();
        let compatible = header.check::<gen2::CoreApiParam>().is_compatible();
        prop_assert_eq!(compatible, header == exact);
    }

    #[test]
    fn test_decode_is_identity_for_utf8(text in "\\PC{0,64}") {
        let bytes = text.as_bytes();
        // SAFETY: `bytes` is valid for its full length.
        let decoded = unsafe { decode_str(bytes.as_ptr(), abi_len(bytes)) };
        prop_assert_eq!(decoded, text.as_str());
    }

    #[test]
    fn test_legacy_arg_roundtrip(text in "[^\\x00]{0,64}") {
        let (ptr, len) = legacy_arg(text.as_bytes());
        // SAFETY: `legacy_arg` returns either the input buffer with its length
        // or a NUL-terminated empty string.
        let decoded = unsafe { decode_legacy_str(ptr, len) };
        prop_assert_eq!(decoded, text.as_str());
    }

    #[test]
    fn test_key_codes_decode_or_reject(raw in any::<u32>()) {
        if let Some(key) = KeyCode::from_raw(raw) {
            prop_assert_eq!(key.as_raw(), raw);
        } else {
            prop_assert!(KeyCode::ALL.iter().all(|k| k.as_raw() != raw));
        }
    }
}
