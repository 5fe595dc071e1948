//! Write-once slot holding a registry instance.

#![expect(unsafe_code, reason = "adopts provider tables from raw pointers")]

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use luaf_abi::{CapabilityTable, VersionedTable};
use luaf_errors::{ApiError, ApiResult};

use crate::api::Api;

/// Holds at most one [`Api`] for table type `T`.
///
/// The instance is published with a release compare-exchange and read with
/// an acquire load, so initialization happens-before every successful
/// [`get`](ApiSlot::get) and reads never lock.
///
/// Process-wide slots live in [`v1`](crate::v1) and [`v2`](crate::v2); tests
/// can declare their own.
///
/// ```
/// use luaf_api::ApiSlot;
/// use luaf_abi::gen2;
///
/// static SLOT: ApiSlot<gen2::CoreApiParam> = ApiSlot::new();
/// assert!(SLOT.get().is_err());
/// ```
pub struct ApiSlot<T: CapabilityTable> {
    api: AtomicPtr<Api<T>>,
}

impl<T: CapabilityTable> ApiSlot<T> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            api: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Fill the slot from a raw table pointer.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NullTable`] if `table` is null.
    /// - [`ApiError::AlreadyInitialized`] if the slot is already filled; the
    ///   existing instance is left untouched.
    ///
    /// # Safety
    ///
    /// When non-null, `table` and every pointer nested in it must be valid for
    /// reads for the rest of the process and must never be written to.
    pub unsafe fn initialize(&self, table: *const T) -> ApiResult<&'static Api<T>> {
        if table.is_null() {
            return Err(ApiError::NullTable);
        }
        if !self.api.load(Ordering::Acquire).is_null() {
            return Err(ApiError::AlreadyInitialized);
        }

        // SAFETY: non-null, and the caller guarantees process lifetime.
        let table: &'static T = unsafe { &*table };
        let candidate = Box::into_raw(Box::new(Api::new(table)));

        match self.api.compare_exchange(
            ptr::null_mut(),
            candidate,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                tracing::debug!(generation = T::GENERATION, "capability registry initialized");
                // SAFETY: `candidate` was just published and is never freed.
                Ok(unsafe { &*candidate })
            }
            Err(_) => {
                // SAFETY: the exchange failed, so `candidate` was never shared.
                drop(unsafe { Box::from_raw(candidate) });
                Err(ApiError::AlreadyInitialized)
            }
        }
    }

    /// Fill the slot from a versioned envelope, validating its header first.
    ///
    /// # Errors
    ///
    /// As [`initialize`](Self::initialize), plus [`ApiError::Abi`] when the
    /// header does not describe `T`.
    ///
    /// # Safety
    ///
    /// When non-null, `envelope` must be valid for reads, and the table it
    /// points to must satisfy the contract of [`initialize`](Self::initialize).
    pub unsafe fn initialize_versioned(
        &self,
        envelope: *const VersionedTable,
    ) -> ApiResult<&'static Api<T>> {
        if envelope.is_null() {
            return Err(ApiError::NullTable);
        }
        // SAFETY: non-null and readable per the caller contract.
        let envelope = unsafe { &*envelope };
        let table = envelope.table_ptr::<T>()?;
        // SAFETY: forwarded caller contract.
        unsafe { self.initialize(table) }
    }

    /// The registry instance.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotInitialized`] before a successful initialization.
    pub fn get(&self) -> ApiResult<&'static Api<T>> {
        let api = self.api.load(Ordering::Acquire);
        if api.is_null() {
            return Err(ApiError::NotInitialized);
        }
        // SAFETY: published instances are leaked boxes that are never freed.
        Ok(unsafe { &*api })
    }

    /// Whether the slot has been filled.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.api.load(Ordering::Acquire).is_null()
    }

    /// Empty the slot so it can be initialized again.
    ///
    /// The previous instance is leaked, never freed, so references obtained
    /// from earlier [`get`](Self::get) calls stay valid. Meant for tests and
    /// for hosts that reload a provider.
    pub fn reset(&self) {
        let previous = self.api.swap(ptr::null_mut(), Ordering::AcqRel);
        if !previous.is_null() {
            tracing::debug!(generation = T::GENERATION, "capability registry reset");
        }
    }
}

impl<T: CapabilityTable> Default for ApiSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CapabilityTable> core::fmt::Debug for ApiSlot<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiSlot")
            .field("generation", &T::GENERATION)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
