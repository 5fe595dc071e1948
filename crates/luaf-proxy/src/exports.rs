//! Forwarding manifests.
//!
//! A manifest lists the symbols a forwarding stub re-exports from the system
//! copy of the library it replaces, one per line. `#` starts a comment.
//! Shared with the build script, so this module depends on nothing but
//! `thiserror`.

use std::collections::HashSet;

/// Directory the forwarded system libraries live in.
pub const SYSTEM_DIR: &str = r"C:\Windows\System32";

/// A manifest line that cannot be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// The line is not a plain C symbol name.
    #[error("line {line}: invalid symbol {symbol:?}")]
    InvalidSymbol {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        symbol: String,
    },

    /// The symbol was already listed.
    #[error("line {line}: duplicate symbol {symbol}")]
    Duplicate {
        /// 1-based line number of the repeat.
        line: usize,
        /// Repeated symbol.
        symbol: String,
    },

    /// Nothing to forward.
    #[error("manifest lists no symbols")]
    Empty,
}

fn is_symbol(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a manifest into its symbols, in file order.
///
/// # Errors
///
/// Fails on the first line that is not a symbol name, on a repeated symbol,
/// or if the manifest has no symbols at all.
pub fn parse_manifest(text: &str) -> Result<Vec<String>, ManifestError> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(before, _)| before).trim();
        if line.is_empty() {
            continue;
        }
        if !is_symbol(line) {
            return Err(ManifestError::InvalidSymbol {
                line: index + 1,
                symbol: line.to_string(),
            });
        }
        if !seen.insert(line) {
            return Err(ManifestError::Duplicate {
                line: index + 1,
                symbol: line.to_string(),
            });
        }
        symbols.push(line.to_string());
    }
    if symbols.is_empty() {
        return Err(ManifestError::Empty);
    }
    Ok(symbols)
}

/// MSVC linker argument forwarding `symbol` to the system `library`.
pub fn forward_directive(library: &str, symbol: &str) -> String {
    format!("/export:{symbol}={SYSTEM_DIR}\\{library}.{symbol}")
}

/// Linker arguments for every symbol in a manifest.
///
/// # Errors
///
/// Propagates [`parse_manifest`] failures.
pub fn forward_directives(library: &str, manifest: &str) -> Result<Vec<String>, ManifestError> {
    Ok(parse_manifest(manifest)?
        .iter()
        .map(|symbol| forward_directive(library, symbol))
        .collect())
}
