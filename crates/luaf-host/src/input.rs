//! Keyboard and controller state served through the input sub-table.
//!
//! The core feeds state once per frame: [`InputState::begin_frame`], then
//! [`InputState::set_key`] / [`InputState::set_buttons`]. "Pressed" means the
//! key or button went down since the previous frame; "down" means it is held.

use luaf_abi::{ControllerButton, ControllerButtons, KeyCode};
use parking_lot::RwLock;

/// 256 bit set indexed by scan code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct KeySet([u64; 4]);

impl KeySet {
    fn slot(code: u32) -> Option<(usize, u64)> {
        let word = usize::try_from(code / 64).ok()?;
        (word < 4).then(|| (word, 1u64 << (code % 64)))
    }

    fn contains(&self, code: u32) -> bool {
        Self::slot(code)
            .and_then(|(word, bit)| self.0.get(word).map(|w| w & bit != 0))
            .unwrap_or(false)
    }

    fn set(&mut self, code: u32, on: bool) {
        let Some((word, bit)) = Self::slot(code) else {
            return;
        };
        if let Some(w) = self.0.get_mut(word) {
            if on {
                *w |= bit;
            } else {
                *w &= !bit;
            }
        }
    }

    fn clear(&mut self) {
        self.0 = [0; 4];
    }
}

#[derive(Debug, Default)]
struct Frame {
    keys_down: KeySet,
    keys_pressed: KeySet,
    buttons_down: ControllerButtons,
    buttons_pressed: ControllerButtons,
}

impl Frame {
    fn hold_buttons(&mut self, held: ControllerButtons) {
        self.buttons_pressed |= held.difference(self.buttons_down);
        self.buttons_down = held;
    }
}

/// Per-frame input state.
#[derive(Debug, Default)]
pub struct InputState {
    frame: RwLock<Frame>,
}

impl InputState {
    /// All keys and buttons up.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: clear the pressed edges, keep held state.
    pub fn begin_frame(&self) {
        let mut frame = self.frame.write();
        frame.keys_pressed.clear();
        frame.buttons_pressed = ControllerButtons::empty();
    }

    /// Report a key as held or released.
    pub fn set_key(&self, key: KeyCode, down: bool) {
        let code = key.as_raw();
        let mut frame = self.frame.write();
        if down && !frame.keys_down.contains(code) {
            frame.keys_pressed.set(code, true);
        }
        frame.keys_down.set(code, down);
    }

    /// Report one controller button as held or released.
    pub fn set_button(&self, button: ControllerButton, down: bool) {
        let mut frame = self.frame.write();
        let mut held = frame.buttons_down;
        held.set(ControllerButtons::from(button), down);
        frame.hold_buttons(held);
    }

    /// Report the full set of held controller buttons.
    pub fn set_buttons(&self, held: ControllerButtons) {
        self.frame.write().hold_buttons(held);
    }

    /// Key went down this frame.
    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.frame.read().keys_pressed.contains(key.as_raw())
    }

    /// Key is held.
    #[must_use]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.frame.read().keys_down.contains(key.as_raw())
    }

    /// Button went down this frame.
    #[must_use]
    pub fn is_button_pressed(&self, button: ControllerButton) -> bool {
        self.frame
            .read()
            .buttons_pressed
            .contains(ControllerButtons::from(button))
    }

    /// Button is held.
    #[must_use]
    pub fn is_button_down(&self, button: ControllerButton) -> bool {
        self.frame
            .read()
            .buttons_down
            .contains(ControllerButtons::from(button))
    }

    /// Held controller buttons.
    #[must_use]
    pub fn buttons_down(&self) -> ControllerButtons {
        self.frame.read().buttons_down
    }

    /// Raw key query as received from the table; unknown codes are never
    /// pressed.
    #[must_use]
    pub fn query_key(&self, raw: u32, pressed: bool) -> bool {
        match KeyCode::from_raw(raw) {
            Some(key) if pressed => self.is_key_pressed(key),
            Some(key) => self.is_key_down(key),
            None => false,
        }
    }

    /// Raw button query as received from the table; values that are not a
    /// single known button are never pressed.
    #[must_use]
    pub fn query_button(&self, raw: u32, pressed: bool) -> bool {
        match ControllerButton::from_raw(raw) {
            Some(button) if pressed => self.is_button_pressed(button),
            Some(button) => self.is_button_down(button),
            None => false,
        }
    }
}
