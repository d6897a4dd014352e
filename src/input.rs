//! Input model: keys, modifier keys, and configurable key bindings.
//!
//! Key names are the browser's `KeyboardEvent.key` strings. Letter bindings
//! compare case-insensitively so that holding Shift (or Caps Lock) does not
//! stop the glass from activating.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// A keyboard key as reported by the browser (e.g. `"z"`, `"ArrowUp"`, `"Alt"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn is_alt(&self) -> bool {
        self.0 == "Alt" || self.0 == "AltGraph"
    }

    /// Whether this key matches a configured key name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    /// Direction of an arrow key as `(dx, dy)`, y growing downwards.
    #[must_use]
    pub fn arrow_direction(&self) -> Option<(i32, i32)> {
        match self.0.as_str() {
            "ArrowUp" => Some((0, -1)),
            "ArrowDown" => Some((0, 1)),
            "ArrowLeft" => Some((-1, 0)),
            "ArrowRight" => Some((1, 0)),
            _ => None,
        }
    }
}

/// A key plus an optional Alt requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyBinding {
    pub key: String,
    pub require_alt: bool,
}

impl KeyBinding {
    #[must_use]
    pub fn new(key: impl Into<String>, require_alt: bool) -> Self {
        Self { key: key.into(), require_alt }
    }

    /// Whether a key-down of `key` with `modifiers` triggers this binding.
    #[must_use]
    pub fn is_pressed_by(&self, key: &Key, modifiers: Modifiers) -> bool {
        key.matches(&self.key) && (!self.require_alt || modifiers.alt)
    }

    /// Whether releasing `key` ends a hold of this binding.
    ///
    /// Releasing the bound key always does; releasing Alt does only when Alt
    /// is required.
    #[must_use]
    pub fn is_released_by(&self, key: &Key) -> bool {
        key.matches(&self.key) || (self.require_alt && key.is_alt())
    }
}
