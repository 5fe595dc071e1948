//! Prelude module for the core.

pub use crate::{
    AddressRecord, CoreHost, HostConfig, LoadSummary, LogSink, MemorySink, TracingSink,
};
pub use luaf_abi::{ControllerButton, ControllerButtons, KeyCode, LogLevel};
pub use luaf_errors::HostError;
