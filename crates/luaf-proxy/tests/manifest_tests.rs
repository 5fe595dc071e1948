//! The shipped forwarding manifests.

use luaf_proxy::exports::{forward_directive, parse_manifest};
use luaf_test_helpers::must;
use proptest::prelude::*;

const D3D11: &str = include_str!("../exports/d3d11.exports");
const HID: &str = include_str!("../exports/hid.exports");

#[test]
fn d3d11_manifest_covers_the_device_entry_points() {
    let symbols = must(parse_manifest(D3D11));
    assert_eq!(symbols.len(), 51);
    for required in ["D3D11CreateDevice", "D3D11CreateDeviceAndSwapChain", "D3D11On12CreateDevice"] {
        assert!(symbols.iter().any(|s| s == required), "missing {required}");
    }
}

#[test]
fn hid_manifest_covers_the_device_queries() {
    let symbols = must(parse_manifest(HID));
    assert_eq!(symbols.len(), 47);
    for required in ["HidD_GetHidGuid", "HidD_GetAttributes", "HidP_GetCaps"] {
        assert!(symbols.iter().any(|s| s == required), "missing {required}");
    }
}

proptest! {
    #[test]
    fn prop_symbol_lists_parse_back(
        symbols in proptest::collection::hash_set("[A-Za-z_][A-Za-z0-9_]{0,24}", 1..32)
    ) {
        let symbols: Vec<String> = symbols.into_iter().collect();
        let text = symbols.iter().map(|s| format!("{s}  # comment\n")).collect::<String>();
        prop_assert_eq!(parse_manifest(&text), Ok(symbols.clone()));
        for symbol in &symbols {
            let directive = forward_directive("hid", symbol);
            let expected_suffix = format!("hid.{symbol}");
            prop_assert!(directive.ends_with(&expected_suffix));
        }
    }
}
