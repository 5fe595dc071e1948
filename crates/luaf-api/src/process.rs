//! Process-wide registry slots, one per table generation.

#![expect(unsafe_code, reason = "slot initialization takes raw table pointers")]

macro_rules! process_slot {
    ($(#[$meta:meta])* $module:ident, $table:ty, $api:ty) => {
        $(#[$meta])*
        pub mod $module {
            use luaf_abi::VersionedTable;
            use luaf_errors::ApiResult;

            use crate::ApiSlot;

            /// Table type of this generation.
            pub type Table = $table;

            /// The process slot.
            pub static API: ApiSlot<$table> = ApiSlot::new();

            /// Initialize the process slot from a raw table pointer.
            ///
            /// # Errors
            ///
            /// See [`ApiSlot::initialize`].
            ///
            /// # Safety
            ///
            /// See [`ApiSlot::initialize`].
            pub unsafe fn initialize(table: *const $table) -> ApiResult<&'static $api> {
                // SAFETY: forwarded caller contract.
                unsafe { API.initialize(table) }
            }

            /// Initialize the process slot from a versioned envelope.
            ///
            /// # Errors
            ///
            /// See [`ApiSlot::initialize_versioned`].
            ///
            /// # Safety
            ///
            /// See [`ApiSlot::initialize_versioned`].
            pub unsafe fn initialize_versioned(
                envelope: *const VersionedTable,
            ) -> ApiResult<&'static $api> {
                // SAFETY: forwarded caller contract.
                unsafe { API.initialize_versioned(envelope) }
            }

            /// The process registry.
            ///
            /// # Errors
            ///
            /// [`ApiError::NotInitialized`](luaf_errors::ApiError::NotInitialized)
            /// before initialization.
            pub fn get() -> ApiResult<&'static $api> {
                API.get()
            }
        }
    };
}

process_slot!(
    /// Process registry for first generation tables.
    v1,
    luaf_abi::gen1::CoreApiParam,
    crate::ApiV1
);

process_slot!(
    /// Process registry for second generation tables.
    v2,
    luaf_abi::gen2::CoreApiParam,
    crate::ApiV2
);
