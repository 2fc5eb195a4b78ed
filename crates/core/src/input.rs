//! Input model shared by every backend
//!
//! Keys and gamepad buttons are reported as transitions (edge-triggered), not
//! levels. The detection is a pure function of the previous and current state
//! so it can be tested without a window or a controller.
//!
//! Gamepads are polled per slot through [`InputPoller`]; a slot with no device
//! reports `None`. Vibration goes through [`Haptics`], which is best effort.
//! [`NullInput`] stands in for both when the real backend cannot be probed.

use serde::{Deserialize, Serialize};

/// Highest number of controller slots polled per frame
pub const MAX_CONTROLLERS: usize = 4;

/// Keyboard keys the platform layer reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    // Number keys
    Key0, Key1, Key2, Key3, Key4, Key5, Key6, Key7, Key8, Key9,

    // Letter keys
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Arrow keys
    Up, Down, Left, Right,

    // Special keys
    Escape, Enter, Space, Tab, Backspace,
    LeftShift, RightShift, LeftCtrl, RightCtrl, LeftAlt, RightAlt,
}

impl Key {
    pub fn is_alt(self) -> bool {
        matches!(self, Key::LeftAlt | Key::RightAlt)
    }
}

/// Digital buttons of a gamepad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadButton {
    Up,
    Down,
    Left,
    Right,
    Start,
    Back,
    LeftShoulder,
    RightShoulder,
    A,
    B,
    X,
    Y,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 12] = [
        GamepadButton::Up,
        GamepadButton::Down,
        GamepadButton::Left,
        GamepadButton::Right,
        GamepadButton::Start,
        GamepadButton::Back,
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::A,
        GamepadButton::B,
        GamepadButton::X,
        GamepadButton::Y,
    ];

    fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// Snapshot of one connected controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadState {
    buttons: u16,
    /// Left stick, full signed 16-bit range
    pub stick_x: i16,
    pub stick_y: i16,
}

impl GamepadState {
    pub fn new(stick_x: i16, stick_y: i16) -> Self {
        Self {
            buttons: 0,
            stick_x,
            stick_y,
        }
    }

    pub fn with_button(mut self, button: GamepadButton) -> Self {
        self.set(button, true);
        self
    }

    pub fn set(&mut self, button: GamepadButton, down: bool) {
        if down {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn is_down(&self, button: GamepadButton) -> bool {
        self.buttons & button.mask() != 0
    }
}

/// Direction of a button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pressed,
    Released,
}

/// What changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionInput {
    Key(Key),
    Button { slot: usize, button: GamepadButton },
}

/// An edge on a key or button, dispatched to the frame handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub input: ActionInput,
    pub transition: Transition,
}

/// Edge detection: an event only when the state actually changed
pub fn detect_edge(input: ActionInput, was_down: bool, is_down: bool) -> Option<ActionEvent> {
    match (was_down, is_down) {
        (false, true) => Some(ActionEvent {
            input,
            transition: Transition::Pressed,
        }),
        (true, false) => Some(ActionEvent {
            input,
            transition: Transition::Released,
        }),
        _ => None,
    }
}

/// Button edges between two snapshots of the same slot
///
/// A disconnected slot is treated as all buttons up, so unplugging a pad
/// releases whatever it was holding.
pub fn gamepad_edges(
    slot: usize,
    previous: Option<&GamepadState>,
    current: Option<&GamepadState>,
) -> Vec<ActionEvent> {
    GamepadButton::ALL
        .into_iter()
        .filter_map(|button| {
            let was_down = previous.is_some_and(|p| p.is_down(button));
            let is_down = current.is_some_and(|c| c.is_down(button));
            detect_edge(ActionInput::Button { slot, button }, was_down, is_down)
        })
        .collect()
}

/// Key edges between two sets of held keys
///
/// Keys absent from `previous` and present in `current` are presses, and the
/// reverse are releases. Presses come first, in `current` order.
pub fn key_edges(previous: &[Key], current: &[Key]) -> Vec<ActionEvent> {
    let pressed = current
        .iter()
        .filter_map(|k| detect_edge(ActionInput::Key(*k), previous.contains(k), true));
    let released = previous
        .iter()
        .filter_map(|k| detect_edge(ActionInput::Key(*k), true, current.contains(k)));
    pressed.chain(released).collect()
}

/// Motor speeds for a rumble request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vibration {
    pub left_motor: u16,
    pub right_motor: u16,
}

impl Vibration {
    pub fn is_off(&self) -> bool {
        self.left_motor == 0 && self.right_motor == 0
    }
}

/// Source of per-slot controller snapshots
pub trait InputPoller {
    /// Pump backend events (hot-plug etc.) once per frame before polling
    fn refresh(&mut self) {}

    /// Current state of `slot`, or `None` if nothing is connected there
    fn poll(&mut self, slot: usize) -> Option<GamepadState>;

    fn name(&self) -> &str;
}

/// Rumble output; failures are reported but callers are free to drop them
pub trait Haptics {
    fn set_vibration(&mut self, slot: usize, vibration: Vibration) -> crate::Result<()>;
}

/// Everything the frame loop needs from a controller backend
pub trait Controllers: InputPoller + Haptics {}

impl<T: InputPoller + Haptics + ?Sized> Controllers for T {}

impl<T: InputPoller + ?Sized> InputPoller for Box<T> {
    fn refresh(&mut self) {
        (**self).refresh()
    }

    fn poll(&mut self, slot: usize) -> Option<GamepadState> {
        (**self).poll(slot)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Haptics + ?Sized> Haptics for Box<T> {
    fn set_vibration(&mut self, slot: usize, vibration: Vibration) -> crate::Result<()> {
        (**self).set_vibration(slot, vibration)
    }
}

/// Backend used when no gamepad library is available
///
/// Every slot polls as disconnected and rumble requests are accepted and
/// dropped.
#[derive(Debug, Default)]
pub struct NullInput;

impl InputPoller for NullInput {
    fn poll(&mut self, _slot: usize) -> Option<GamepadState> {
        None
    }

    fn name(&self) -> &str {
        "none"
    }
}

impl Haptics for NullInput {
    fn set_vibration(&mut self, _slot: usize, _vibration: Vibration) -> crate::Result<()> {
        Ok(())
    }
}
