use std::env;
use std::path::PathBuf;

#[path = "src/exports.rs"]
mod exports;

// Matches the `FORWARDED_LIBRARY` selection in the crate.
fn forwarded_library() -> &'static str {
    if env::var_os("CARGO_FEATURE_HID").is_some() {
        "hid"
    } else {
        "d3d11"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let library = forwarded_library();
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let manifest = manifest_dir.join("exports").join(format!("{library}.exports"));
    println!("cargo:rerun-if-changed={}", manifest.display());
    println!("cargo:rerun-if-changed=src/exports.rs");

    let text = std::fs::read_to_string(&manifest)?;
    let directives = exports::forward_directives(library, &text)?;

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_env = env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    if target_os == "windows" && target_env == "msvc" {
        for directive in &directives {
            println!("cargo:rustc-cdylib-link-arg={directive}");
        }
    }
    Ok(())
}
