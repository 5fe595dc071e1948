//! Generation-independent view of a capability table.

#![expect(unsafe_code, reason = "dispatches through foreign function pointers")]

use core::ffi::c_void;

use crate::types::LogLevel;

/// Operations every table generation provides.
///
/// Implemented by [`gen1::CoreApiParam`](crate::gen1::CoreApiParam) and
/// [`gen2::CoreApiParam`](crate::gen2::CoreApiParam). The registry is generic
/// over this trait, so generation specific operations live in inherent impls
/// on the registry and everything else is written once.
///
/// A table reference is only ever obtained through the registry's unsafe
/// initialization, whose contract guarantees that every nested pointer in the
/// table is valid for the rest of the process.
pub trait CapabilityTable: Sync + 'static {
    /// Generation number written into [`TableHeader`](crate::TableHeader).
    const GENERATION: u32;

    /// Register `func` under `name` in the shared function namespace.
    fn add_core_function(&self, name: &[u8], func: *const c_void);

    /// Look up a function by name. Null means absent.
    fn get_core_function(&self, name: &[u8]) -> *const c_void;

    /// Forward one log record to the table owner.
    fn log(&self, level: LogLevel, message: &[u8]);
}

mod sealed {
    pub trait Sealed {}
}

/// A C-callable function pointer type that can be stored in the untyped
/// function namespace.
///
/// Implemented for `extern "C" fn` and `unsafe extern "C" fn` pointers of up
/// to six arguments. [`FunctionSignature::from_raw`] is the only place a raw
/// pointer is turned back into a callable type.
pub trait FunctionSignature: sealed::Sealed + Copy + Send + Sync + 'static {
    /// Erase the signature for the wire.
    fn into_raw(self) -> *const c_void;

    /// Recover the typed pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and point to a function with exactly this
    /// signature and calling convention.
    unsafe fn from_raw(ptr: *const c_void) -> Self;

    /// Human readable signature, used in mismatch diagnostics.
    #[must_use]
    fn signature() -> &'static str {
        core::any::type_name::<Self>()
    }
}

macro_rules! impl_function_signature {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> sealed::Sealed for extern "C" fn($($arg),*) -> R {}
        impl<R: 'static, $($arg: 'static),*> sealed::Sealed for unsafe extern "C" fn($($arg),*) -> R {}

        impl<R: 'static, $($arg: 'static),*> FunctionSignature for extern "C" fn($($arg),*) -> R {
            fn into_raw(self) -> *const c_void {
                self as *const c_void
            }

            unsafe fn from_raw(ptr: *const c_void) -> Self {
                // SAFETY: function pointers and data pointers have the same
                // size on every supported target; the caller guarantees the
                // pointee has this signature.
                unsafe { core::mem::transmute_copy::<*const c_void, Self>(&ptr) }
            }
        }

        impl<R: 'static, $($arg: 'static),*> FunctionSignature for unsafe extern "C" fn($($arg),*) -> R {
            fn into_raw(self) -> *const c_void {
                self as *const c_void
            }

            unsafe fn from_raw(ptr: *const c_void) -> Self {
                // SAFETY: as above.
                unsafe { core::mem::transmute_copy::<*const c_void, Self>(&ptr) }
            }
        }
    };
}

impl_function_signature!();
impl_function_signature!(A);
impl_function_signature!(A, B);
impl_function_signature!(A, B, C);
impl_function_signature!(A, B, C, D);
impl_function_signature!(A, B, C, D, E);
impl_function_signature!(A, B, C, D, E, F);

static_assertions::assert_eq_size!(extern "C" fn(), *const c_void);
