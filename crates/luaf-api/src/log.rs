//! Formatting log façade.
//!
//! Messages are rendered with `format_args!` into a [`MessageBuf`] and sent to
//! the process registry with their exact byte length. Messages up to
//! [`INLINE_CAPACITY`] bytes are rendered on the stack; longer ones spill to
//! the heap and are never truncated.
//!
//! ```no_run
//! # fn main() -> Result<(), luaf_errors::ApiError> {
//! luaf_api::info!("loaded {} scripts", 3)?;
//! # Ok(())
//! # }
//! ```

use core::fmt::{self, Write as _};

use luaf_abi::{CapabilityTable, LogLevel};
use luaf_errors::{ApiError, ApiResult};

use crate::api::Api;
use crate::process::{v1, v2};

/// Bytes rendered without touching the heap.
pub const INLINE_CAPACITY: usize = 256;

/// Message buffer with inline storage and heap spill.
pub struct MessageBuf {
    inline: [u8; INLINE_CAPACITY],
    len: usize,
    spilled: Option<String>,
}

impl MessageBuf {
    /// An empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inline: [0; INLINE_CAPACITY],
            len: 0,
            spilled: None,
        }
    }

    /// Render `args`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Format`] when a `Display` implementation fails.
    pub fn render(args: fmt::Arguments<'_>) -> ApiResult<Self> {
        let mut buf = Self::new();
        buf.write_fmt(args)?;
        Ok(buf)
    }

    /// Rendered text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        if let Some(spilled) = &self.spilled {
            return spilled;
        }
        let bytes = self.inline.get(..self.len).unwrap_or_default();
        // Only whole `&str` fragments are ever copied in.
        core::str::from_utf8(bytes).unwrap_or_default()
    }

    /// Rendered length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spilled.as_ref().map_or(self.len, String::len)
    }

    /// Whether nothing has been rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the message outgrew the inline buffer.
    #[must_use]
    pub fn is_spilled(&self) -> bool {
        self.spilled.is_some()
    }
}

impl Default for MessageBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for MessageBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(spilled) = &mut self.spilled {
            spilled.push_str(s);
            return Ok(());
        }

        let end = self.len.saturating_add(s.len());
        if let Some(dest) = self.inline.get_mut(self.len..end) {
            dest.copy_from_slice(s.as_bytes());
            self.len = end;
            return Ok(());
        }

        let mut spilled = String::with_capacity(end.saturating_mul(2));
        spilled.push_str(self.as_str());
        spilled.push_str(s);
        self.spilled = Some(spilled);
        Ok(())
    }
}

impl fmt::Debug for MessageBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuf")
            .field("text", &self.as_str())
            .field("spilled", &self.is_spilled())
            .finish()
    }
}

/// Render and forward one message through `api`.
///
/// # Errors
///
/// [`ApiError::Format`] when rendering fails; nothing is sent in that case.
pub fn emit_to<T: CapabilityTable>(
    api: &Api<T>,
    level: LogLevel,
    args: fmt::Arguments<'_>,
) -> ApiResult<()> {
    if let Some(literal) = args.as_str() {
        api.log(level, literal);
        return Ok(());
    }
    let buf = MessageBuf::render(args)?;
    api.log(level, buf.as_str());
    Ok(())
}

/// Render and forward one message through the process registry.
///
/// The second generation slot is used when initialized, otherwise the first.
///
/// # Errors
///
/// - [`ApiError::NotInitialized`] when neither slot is initialized.
/// - [`ApiError::Format`] when rendering fails.
pub fn emit(level: LogLevel, args: fmt::Arguments<'_>) -> ApiResult<()> {
    if let Ok(api) = v2::get() {
        return emit_to(api, level, args);
    }
    if let Ok(api) = v1::get() {
        return emit_to(api, level, args);
    }
    Err(ApiError::NotInitialized)
}

/// Log at an explicit level through the process registry.
///
/// Evaluates to `Result<(), ApiError>`.
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::log::emit($level, ::core::format_args!($($arg)+))
    };
}

/// Log at [`LogLevel::Trace`].
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::log!($crate::__private::LogLevel::Trace, $($arg)+) };
}

/// Log at [`LogLevel::Debug`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log!($crate::__private::LogLevel::Debug, $($arg)+) };
}

/// Log at [`LogLevel::Info`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log!($crate::__private::LogLevel::Info, $($arg)+) };
}

/// Log at [`LogLevel::Warn`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::log!($crate::__private::LogLevel::Warn, $($arg)+) };
}

/// Log at [`LogLevel::Error`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log!($crate::__private::LogLevel::Error, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl fmt::Display for Failing {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_short_message_stays_inline() -> Result<(), ApiError> {
        let buf = MessageBuf::render(format_args!("{}-{}", "a", 1))?;
        assert_eq!(buf.as_str(), "a-1");
        assert!(!buf.is_spilled());
        Ok(())
    }

    #[test]
    fn test_exactly_inline_capacity_stays_inline() -> Result<(), ApiError> {
        let text = "x".repeat(INLINE_CAPACITY);
        let buf = MessageBuf::render(format_args!("{text}"))?;
        assert_eq!(buf.len(), INLINE_CAPACITY);
        assert!(!buf.is_spilled());
        Ok(())
    }

    #[test]
    fn test_long_message_spills_without_truncation() -> Result<(), ApiError> {
        let head = "h".repeat(200);
        let tail = "t".repeat(200);
        let buf = MessageBuf::render(format_args!("{head}|{tail}"))?;
        assert!(buf.is_spilled());
        assert_eq!(buf.len(), 401);
        assert!(buf.as_str().starts_with(&head));
        assert!(buf.as_str().ends_with(&tail));
        Ok(())
    }

    #[test]
    fn test_display_failure_is_reported() {
        let result = MessageBuf::render(format_args!("{}", Failing));
        assert!(matches!(result, Err(ApiError::Format)));
    }

    #[test]
    fn test_multibyte_boundary() -> Result<(), ApiError> {
        let text = "é".repeat(200);
        let buf = MessageBuf::render(format_args!("{text}"))?;
        assert_eq!(buf.as_str(), text);
        Ok(())
    }
}
