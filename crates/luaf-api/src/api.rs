//! The registry façade over one capability table.

#![expect(unsafe_code, reason = "calls through the provider's function pointers")]

use core::ffi::c_void;
use core::ptr::NonNull;
use std::panic::{self, AssertUnwindSafe};

use luaf_abi::{CapabilityTable, ControllerButton, FunctionSignature, KeyCode, LogLevel, gen1, gen2};

use crate::key::FunctionKey;

/// Owns one reference to a provider's capability table.
///
/// Obtained from an [`ApiSlot`](crate::ApiSlot). Operations common to both
/// generations are available on every `Api<T>`; generation specific ones are
/// in inherent impls for [`ApiV1`] and [`ApiV2`].
#[derive(Debug)]
pub struct Api<T: CapabilityTable> {
    table: &'static T,
}

/// Registry over a first generation table.
pub type ApiV1 = Api<gen1::CoreApiParam>;
/// Registry over a second generation table.
pub type ApiV2 = Api<gen2::CoreApiParam>;

impl<T: CapabilityTable> Api<T> {
    pub(crate) fn new(table: &'static T) -> Self {
        Self { table }
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &'static T {
        self.table
    }

    /// Table generation.
    #[must_use]
    pub fn generation(&self) -> u32 {
        T::GENERATION
    }

    /// Forward a preformatted message.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.table.log(level, message.as_bytes());
    }

    /// Register `func` under `name`. Last registration wins at the provider.
    pub fn add_function(&self, name: &str, func: *const c_void) {
        self.table.add_core_function(name.as_bytes(), func);
    }

    /// Look up a function by name.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<NonNull<c_void>> {
        NonNull::new(self.table.get_core_function(name.as_bytes()).cast_mut())
    }

    /// Register a function under a typed key.
    pub fn register<F: FunctionSignature>(&self, key: FunctionKey<F>, func: F) {
        self.add_function(key.name(), func.into_raw());
    }

    /// Look up a function through a typed key.
    #[must_use]
    pub fn lookup<F: FunctionSignature>(&self, key: FunctionKey<F>) -> Option<F> {
        let ptr = self.get_function(key.name())?;
        // SAFETY: the key's contract guarantees every registration under this
        // name has type `F`, and the pointer is non-null.
        Some(unsafe { F::from_raw(ptr.as_ptr().cast_const()) })
    }
}

impl ApiV1 {
    /// Subscribe to interpreter state creation.
    pub fn on_lua_state_created(&self, callback: gen1::StateCallback) {
        self.table.functions().on_lua_state_created(callback);
    }

    /// Subscribe to interpreter state destruction.
    pub fn on_lua_state_destroyed(&self, callback: gen1::StateCallback) {
        self.table.functions().on_lua_state_destroyed(callback);
    }
}

impl ApiV2 {
    /// Interpreter lifecycle and locking.
    #[must_use]
    pub fn lua(&self) -> Lua<'_> {
        Lua(self.table.lua())
    }

    /// Function namespace introspection.
    #[must_use]
    pub fn functions(&self) -> Functions<'_> {
        Functions(self.table.functions())
    }

    /// Keyboard and controller state.
    #[must_use]
    pub fn input(&self) -> Input<'_> {
        Input(self.table.input())
    }
}

/// Interpreter operations of a second generation table.
#[derive(Debug, Clone, Copy)]
pub struct Lua<'a>(&'a gen2::CoreApiLua);

impl Lua<'_> {
    /// Subscribe to interpreter state creation.
    pub fn on_state_created(&self, callback: gen2::StateCallback) {
        self.0.on_lua_state_created(callback);
    }

    /// Subscribe to interpreter state destruction.
    pub fn on_state_destroyed(&self, callback: gen2::StateCallback) {
        self.0.on_lua_state_destroyed(callback);
    }

    /// Run `body` while the provider holds the interpreter lock.
    ///
    /// Blocks until the provider returns. Returns `None` if the provider
    /// returned without running `body`. A panic in `body` is carried across
    /// the C boundary and resumed here.
    pub fn with_lock<R, F: FnOnce() -> R>(&self, body: F) -> Option<R> {
        let mut frame = LockFrame {
            body: Some(body),
            outcome: None,
        };
        self.0.with_lua_lock(
            lock_trampoline::<R, F>,
            (&mut frame as *mut LockFrame<R, F>).cast::<c_void>(),
        );
        match frame.outcome? {
            Ok(value) => Some(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

struct LockFrame<R, F> {
    body: Option<F>,
    outcome: Option<std::thread::Result<R>>,
}

extern "C" fn lock_trampoline<R, F: FnOnce() -> R>(user_data: *mut c_void) {
    if user_data.is_null() {
        return;
    }
    // SAFETY: `with_lock` passes a pointer to a `LockFrame<R, F>` on its own
    // stack that outlives the provider's call.
    let frame = unsafe { &mut *user_data.cast::<LockFrame<R, F>>() };
    if let Some(body) = frame.body.take() {
        frame.outcome = Some(panic::catch_unwind(AssertUnwindSafe(body)));
    }
}

/// Introspection operations of a second generation table.
#[derive(Debug, Clone, Copy)]
pub struct Functions<'a>(&'a gen2::CoreApiFunctions);

impl Functions<'_> {
    /// Host singleton by name.
    #[must_use]
    pub fn singleton(&self, name: &str) -> Option<NonNull<c_void>> {
        NonNull::new(self.0.get_singleton(name.as_bytes()))
    }

    /// Resolved managed address by name.
    #[must_use]
    pub fn managed_address(&self, name: &str) -> Option<NonNull<c_void>> {
        NonNull::new(self.0.get_managed_address(name.as_bytes()))
    }

    /// Record a byte pattern for the provider to resolve under `name`.
    pub fn set_managed_address(&self, name: &str, pattern: &str, offset: i32) {
        self.0
            .set_managed_address(name.as_bytes(), pattern.as_bytes(), offset);
    }
}

/// Input operations of a second generation table.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a>(&'a gen2::CoreApiInput);

impl<'a> Input<'a> {
    /// Keyboard queries.
    #[must_use]
    pub fn keyboard(&self) -> Keyboard<'a> {
        Keyboard(self.0)
    }

    /// Controller queries.
    #[must_use]
    pub fn controller(&self) -> Controller<'a> {
        Controller(self.0)
    }
}

/// Keyboard queries.
#[derive(Debug, Clone, Copy)]
pub struct Keyboard<'a>(&'a gen2::CoreApiInput);

impl Keyboard<'_> {
    /// Key went down this frame.
    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.0.is_key_pressed(key.as_raw())
    }

    /// Key is held.
    #[must_use]
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.0.is_key_down(key.as_raw())
    }
}

/// Controller queries.
#[derive(Debug, Clone, Copy)]
pub struct Controller<'a>(&'a gen2::CoreApiInput);

impl Controller<'_> {
    /// Button went down this frame.
    #[must_use]
    pub fn is_pressed(&self, button: ControllerButton) -> bool {
        self.0.is_controller_pressed(button.as_raw())
    }

    /// Button is held.
    #[must_use]
    pub fn is_down(&self, button: ControllerButton) -> bool {
        self.0.is_controller_down(button.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiSlot;
    use luaf_test_helpers::{mock, must, must_some, serial::serial};

    fn v2() -> &'static ApiV2 {
        let slot = Box::leak(Box::new(ApiSlot::<gen2::CoreApiParam>::new()));
        // SAFETY: the mock table is a process-lifetime static.
        must(unsafe { slot.initialize(mock::gen2_table()) })
    }

    fn v1() -> &'static ApiV1 {
        let slot = Box::leak(Box::new(ApiSlot::<gen1::CoreApiParam>::new()));
        // SAFETY: as above.
        must(unsafe { slot.initialize(mock::gen1_table()) })
    }

    extern "C" fn double(x: i32) -> i32 {
        x * 2
    }

    crate::function_key!(DOUBLE: extern "C" fn(i32) -> i32 = "double");

    #[test]
    fn test_add_then_get_function() {
        let _guard = serial();
        mock::reset();
        let api = v2();
        api.add_function("raw", 0x40 as *const c_void);
        let found = must_some(api.get_function("raw"), "raw should be registered");
        assert_eq!(found.as_ptr() as usize, 0x40);
        assert!(api.get_function("unknown").is_none());
    }

    #[test]
    fn test_typed_key_roundtrip() {
        let _guard = serial();
        mock::reset();
        let api = v1();
        api.register(DOUBLE, double);
        let f = must_some(api.lookup(DOUBLE), "double should be registered");
        assert_eq!(f(21), 42);
    }

    #[test]
    fn test_with_lock_returns_value() {
        let _guard = serial();
        mock::reset();
        let api = v2();
        let mut touched = false;
        let result = api.lua().with_lock(|| {
            touched = true;
            7
        });
        assert_eq!(result, Some(7));
        assert!(touched);
        assert_eq!(mock::with_recorder(|r| r.lock_calls), 1);
    }

    #[test]
    fn test_with_lock_not_run() {
        let _guard = serial();
        mock::reset();
        mock::with_recorder(|r| r.lock_runs_body = false);
        let api = v2();
        assert_eq!(api.lua().with_lock(|| 1), None);
    }

    #[test]
    fn test_input_queries() {
        let _guard = serial();
        mock::reset();
        mock::with_recorder(|r| {
            r.keys_down.push(KeyCode::LeftShift.as_raw());
            r.buttons_pressed = ControllerButton::Triangle.as_raw();
        });
        let input = v2().input();
        assert!(input.keyboard().is_down(KeyCode::LeftShift));
        assert!(!input.keyboard().is_pressed(KeyCode::LeftShift));
        assert!(input.controller().is_pressed(ControllerButton::Triangle));
        assert!(!input.controller().is_down(ControllerButton::Triangle));
    }

    #[test]
    fn test_singleton_and_managed_address() {
        let _guard = serial();
        mock::reset();
        mock::set_singleton("sPlayer", 0x1234 as *mut c_void);
        let functions = v2().functions();
        let player = must_some(functions.singleton("sPlayer"), "singleton");
        assert_eq!(player.as_ptr() as usize, 0x1234);
        assert!(functions.singleton("sMissing").is_none());

        functions.set_managed_address("chat", "48 89 5C 24", -4);
        let calls = mock::with_recorder(|r| r.address_calls.clone());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls.first().map(|c| c.offset), Some(-4));
        assert!(functions.managed_address("chat").is_none());
    }
}
