//! `tracing` integration for extensions.
//!
//! [`ApiLayer`] forwards an extension's own `tracing` events to the provider
//! through a registry, prefixed with the extension name and filtered by a
//! maximum level.
//!
//! ```no_run
//! use luaf_api::layer::ApiLayer;
//! use tracing_subscriber::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = luaf_api::v2::get()?;
//! tracing_subscriber::registry()
//!     .with(ApiLayer::new(api, "imgui", tracing::Level::INFO))
//!     .try_init()?;
//! tracing::info!(fonts = 3, "renderer ready");
//! # Ok(())
//! # }
//! ```

use core::cell::Cell;
use core::fmt::{self, Write as _};

use luaf_abi::{CapabilityTable, LogLevel};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::api::Api;
use crate::log::MessageBuf;

/// Map a `tracing` level to the wire level.
#[must_use]
pub fn to_log_level(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Map a wire level to a `tracing` level.
#[must_use]
pub fn to_tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Layer forwarding events through a registry.
#[derive(Debug)]
pub struct ApiLayer<T: CapabilityTable> {
    api: &'static Api<T>,
    prefix: String,
    max_level: Level,
}

impl<T: CapabilityTable> ApiLayer<T> {
    /// Forward events at `max_level` or more severe, prefixed `[prefix]`.
    pub fn new(api: &'static Api<T>, prefix: impl Into<String>, max_level: Level) -> Self {
        Self {
            api,
            prefix: prefix.into(),
            max_level,
        }
    }

    fn render(&self, event: &Event<'_>) -> Result<MessageBuf, fmt::Error> {
        let mut buf = MessageBuf::new();
        write!(buf, "[{}] ", self.prefix)?;
        let mut visitor = FieldWriter {
            buf: &mut buf,
            result: Ok(()),
        };
        event.record(&mut visitor);
        visitor.result?;
        Ok(buf)
    }
}

impl<S: Subscriber, T: CapabilityTable> Layer<S> for ApiLayer<T> {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level();
        if *level > self.max_level {
            return;
        }
        // A provider that logs through `tracing` in the same dispatcher would
        // otherwise feed its own output back here.
        if FORWARDING.with(Cell::get) {
            return;
        }
        FORWARDING.with(|f| f.set(true));
        if let Ok(buf) = self.render(event) {
            self.api.log(to_log_level(level), buf.as_str());
        }
        FORWARDING.with(|f| f.set(false));
    }
}

struct FieldWriter<'a> {
    buf: &'a mut MessageBuf,
    result: fmt::Result,
}

impl Visit for FieldWriter<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if self.result.is_err() {
            return;
        }
        self.result = if field.name() == "message" {
            self.buf.write_str(value)
        } else {
            write!(self.buf, " {}={}", field.name(), value)
        };
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if self.result.is_err() {
            return;
        }
        self.result = if field.name() == "message" {
            write!(self.buf, "{value:?}")
        } else {
            write!(self.buf, " {}={:?}", field.name(), value)
        };
    }
}
