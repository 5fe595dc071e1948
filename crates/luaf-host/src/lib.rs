//! Capability table provider for the LuaFramework core.
//!
//! The core owns one [`CoreHost`] and publishes it with
//! [`CoreHost::install`]. From then on the static capability tables reach it:
//!
//! - [`FunctionRegistry`]: the shared function namespace.
//! - [`Subscribers`]: interpreter lifecycle callbacks.
//! - [`LogSink`]: where extension log records end up.
//! - [`InputState`]: keyboard and controller queries.
//! - [`AddressBook`] / [`SingletonDirectory`]: introspection.
//! - [`LuaLock`]: serializes `with_lua_lock` bodies.
//!
//! [`ExtensionLoader`] scans the extension directory and hands every library
//! the tables.
//!
//! # Example
//!
//! ```no_run
//! use luaf_host::{CoreHost, HostConfig};
//!
//! # fn main() -> Result<(), luaf_errors::HostError> {
//! let host = CoreHost::new(HostConfig::default())?.install()?;
//! let summary = host.load_extensions()?;
//! tracing::info!(%summary, "core ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
pub mod config;
pub mod host;
pub mod input;
pub mod loader;
pub mod lock;
pub mod prelude;
mod provider;
pub mod registry;
pub mod singleton;
pub mod sink;
pub mod subscribers;

pub use address::{AddressBook, AddressRecord, AddressResolver, Pattern, RegionResolver};
pub use config::{HostConfig, HostConfigBuilder};
pub use host::CoreHost;
pub use input::InputState;
pub use loader::{EntryKind, EntryPoints, ExtensionLoader, LoadSummary, LoadedExtension};
pub use lock::LuaLock;
pub use registry::{FunctionEntry, FunctionRegistry};
pub use singleton::SingletonDirectory;
pub use sink::{EXTENSION_TARGET, LogRecord, LogSink, MemorySink, TracingSink};
pub use subscribers::Subscribers;
