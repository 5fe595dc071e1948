//! Typed capability keys.

#![expect(unsafe_code, reason = "a key asserts the signature of a foreign function")]

use core::fmt;
use core::marker::PhantomData;

use luaf_abi::FunctionSignature;

/// A function name bound to the signature every participant uses for it.
///
/// The shared namespace is untyped on the wire; a key is the one place where
/// a name and a signature are tied together, so registration and lookup
/// through the same key agree by construction.
///
/// ```
/// use luaf_api::FunctionKey;
///
/// // SAFETY: every module registering "add" registers this signature.
/// const ADD: FunctionKey<extern "C" fn(i32, i32) -> i32> = unsafe { FunctionKey::new("add") };
/// assert_eq!(ADD.name(), "add");
/// ```
pub struct FunctionKey<F: FunctionSignature> {
    name: &'static str,
    _signature: PhantomData<F>,
}

impl<F: FunctionSignature> FunctionKey<F> {
    /// Declare a key.
    ///
    /// # Safety
    ///
    /// Every module in the process that registers a function under `name`
    /// must register a function of type `F`.
    #[must_use]
    pub const unsafe fn new(name: &'static str) -> Self {
        Self {
            name,
            _signature: PhantomData,
        }
    }

    /// Function name on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Signature description.
    #[must_use]
    pub fn signature(&self) -> &'static str {
        F::signature()
    }
}

impl<F: FunctionSignature> Clone for FunctionKey<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: FunctionSignature> Copy for FunctionKey<F> {}

impl<F: FunctionSignature> fmt::Debug for FunctionKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionKey")
            .field("name", &self.name)
            .field("signature", &F::signature())
            .finish()
    }
}

/// Declare a [`FunctionKey`] constant.
///
/// ```
/// luaf_api::function_key!(pub ON_FRAME: extern "C" fn(u64) = "on_frame");
/// assert_eq!(ON_FRAME.name(), "on_frame");
/// ```
#[macro_export]
macro_rules! function_key {
    ($vis:vis $ident:ident : $ty:ty = $name:literal) => {
        #[expect(unsafe_code, reason = "the key asserts the declared signature")]
        // SAFETY: the signature is declared together with the name.
        $vis const $ident: $crate::FunctionKey<$ty> = unsafe { $crate::FunctionKey::new($name) };
    };
}
