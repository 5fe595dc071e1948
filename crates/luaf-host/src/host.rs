//! The capability table owner.

#![expect(unsafe_code, reason = "the installed host is published through a raw pointer")]

use std::ffi::c_void;
use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use luaf_abi::{LogLevel, VersionedTable, gen1, gen2};
use luaf_errors::HostError;
use parking_lot::Mutex;

use crate::address::AddressBook;
use crate::config::HostConfig;
use crate::input::InputState;
use crate::loader::{ExtensionLoader, LoadSummary, LoadedExtension};
use crate::lock::LuaLock;
use crate::provider;
use crate::registry::FunctionRegistry;
use crate::singleton::SingletonDirectory;
use crate::sink::{LogSink, TracingSink};
use crate::subscribers::Subscribers;

static INSTALLED: AtomicPtr<CoreHost> = AtomicPtr::new(ptr::null_mut());

/// Owns everything the capability tables expose.
///
/// The tables are process-wide statics whose entry points forward to the
/// [installed](CoreHost::install) host. Before installation they log a warning
/// and return null or `false`.
pub struct CoreHost {
    config: HostConfig,
    functions: FunctionRegistry,
    subscribers: Subscribers,
    sink: Box<dyn LogSink>,
    input: InputState,
    addresses: AddressBook,
    singletons: SingletonDirectory,
    lua_lock: LuaLock,
    extensions: Mutex<Vec<LoadedExtension>>,
}

impl fmt::Debug for CoreHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreHost")
            .field("config", &self.config)
            .field("functions", &self.functions.len())
            .field("subscribers", &self.subscribers.len())
            .field("addresses", &self.addresses)
            .field("singletons", &self.singletons.len())
            .field("extensions", &self.extensions.lock().len())
            .finish_non_exhaustive()
    }
}

impl CoreHost {
    /// Host forwarding extension logs into `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(config: HostConfig) -> Result<Self, HostError> {
        let sink = TracingSink::with_prefix(config.log_prefix.clone());
        Self::with_sink(config, sink)
    }

    /// Host with a custom log sink.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_sink(config: HostConfig, sink: impl LogSink + 'static) -> Result<Self, HostError> {
        config.validate()?;
        Ok(Self {
            config,
            functions: FunctionRegistry::new(),
            subscribers: Subscribers::new(),
            sink: Box::new(sink),
            input: InputState::new(),
            addresses: AddressBook::new(),
            singletons: SingletonDirectory::new(),
            lua_lock: LuaLock::new(),
            extensions: Mutex::new(Vec::new()),
        })
    }

    /// Publish this host to the table entry points.
    ///
    /// The host is leaked; it lives for the rest of the process.
    ///
    /// # Errors
    ///
    /// [`HostError::AlreadyInstalled`] if another host is installed.
    pub fn install(self) -> Result<&'static CoreHost, HostError> {
        if INSTALLED.load(Ordering::Acquire).is_null() {
            let raw = Box::into_raw(Box::new(self));
            match INSTALLED.compare_exchange(ptr::null_mut(), raw, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    // SAFETY: `raw` came from `Box::into_raw` and is never freed.
                    let host = unsafe { &*raw };
                    tracing::info!(extension_dir = %host.config.extension_dir.display(), "core host installed");
                    return Ok(host);
                }
                Err(_) => {
                    // SAFETY: the exchange failed, so `raw` was never published.
                    drop(unsafe { Box::from_raw(raw) });
                }
            }
        }
        Err(HostError::AlreadyInstalled)
    }

    /// The installed host, if any.
    #[must_use]
    pub fn installed() -> Option<&'static CoreHost> {
        let raw = INSTALLED.load(Ordering::Acquire);
        // SAFETY: non-null values come from `install` and are never freed.
        unsafe { raw.as_ref() }
    }

    /// Withdraw the installed host from the table entry points.
    ///
    /// The host is not freed: extensions may still hold references. Returns
    /// whether a host was installed.
    pub fn uninstall() -> bool {
        let previous = INSTALLED.swap(ptr::null_mut(), Ordering::AcqRel);
        if !previous.is_null() {
            tracing::info!("core host uninstalled");
        }
        !previous.is_null()
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Shared function namespace.
    #[must_use]
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Lifecycle subscriptions.
    #[must_use]
    pub fn subscribers(&self) -> &Subscribers {
        &self.subscribers
    }

    /// Input state served to extensions.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Managed addresses.
    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Host singletons.
    #[must_use]
    pub fn singletons(&self) -> &SingletonDirectory {
        &self.singletons
    }

    /// Interpreter lock.
    #[must_use]
    pub fn lua_lock(&self) -> &LuaLock {
        &self.lua_lock
    }

    /// Forward one record to the sink.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.sink.log(level, message);
    }

    /// First generation table.
    #[must_use]
    pub fn table_v1(&self) -> &'static gen1::CoreApiParam {
        &provider::GEN1_TABLE
    }

    /// Second generation table.
    #[must_use]
    pub fn table_v2(&self) -> &'static gen2::CoreApiParam {
        &provider::GEN2_TABLE
    }

    /// First generation table in its envelope.
    #[must_use]
    pub fn envelope_v1(&self) -> &'static VersionedTable {
        &provider::GEN1_ENVELOPE
    }

    /// Second generation table in its envelope.
    #[must_use]
    pub fn envelope_v2(&self) -> &'static VersionedTable {
        &provider::GEN2_ENVELOPE
    }

    /// Notify subscribers that an interpreter state was created.
    ///
    /// # Safety
    ///
    /// `state` must be a live interpreter state for the duration of the call.
    pub unsafe fn dispatch_state_created(&self, state: *mut c_void) {
        // SAFETY: forwarded caller contract.
        unsafe { self.subscribers.dispatch_created(state) };
    }

    /// Notify subscribers that an interpreter state is about to be destroyed.
    ///
    /// # Safety
    ///
    /// `state` must still be live for the duration of the call.
    pub unsafe fn dispatch_state_destroyed(&self, state: *mut c_void) {
        // SAFETY: forwarded caller contract.
        unsafe { self.subscribers.dispatch_destroyed(state) };
    }

    /// Scan the configured extension directory and initialize every library
    /// found there.
    ///
    /// # Errors
    ///
    /// [`HostError::ExtensionDir`] when the directory exists but cannot be
    /// read. Failures of individual extensions are logged and counted.
    pub fn load_extensions(&self) -> Result<LoadSummary, HostError> {
        ExtensionLoader::new(self, &self.config.extension_dir).load_all()
    }

    pub(crate) fn add_extension(&self, extension: LoadedExtension) {
        self.extensions.lock().push(extension);
    }

    /// Whether an extension with this file stem is loaded.
    #[must_use]
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.lock().iter().any(|ext| ext.name() == name)
    }

    /// Loaded extension names, in load order.
    #[must_use]
    pub fn extension_names(&self) -> Vec<String> {
        self.extensions
            .lock()
            .iter()
            .map(|ext| ext.name().to_string())
            .collect()
    }
}
