//! Settings-store plumbing: descriptors, initial load, and change subscription.
//!
//! The host owns the settings UI and persistence. This module describes each
//! configuration field to the host ([`descriptors`]), reads the initial values
//! ([`load_config`]) and wires one change callback per field into a
//! [`SettingSink`] ([`subscribe`]).
//!
//! ERROR POLICY
//! ============
//! The store may be transiently unavailable. Reads fall back to the built-in
//! default with a single warning; registration failures are logged and
//! skipped. Nothing here returns an error to the caller.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::config::{self, Config};
use crate::consts::{MAX_BORDER_WIDTH_PX, MAX_DIAMETER_PX, MAX_OFFSET_STEP, MAX_ZOOM, MIN_DIAMETER_PX, MIN_ZOOM};
use crate::geometry::Placement;

/// Category shown by the host settings dialog.
pub const CATEGORY: &str = "Magnify Glass";

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Failure reported by a host-provided store (settings or key-value).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected the operation: {0}")]
    Rejected(String),
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// Editor widget the host should show for a setting.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Slider { min: f64, max: f64, step: f64 },
    Color,
    Combo { options: Vec<&'static str> },
    Toggle,
    Text,
}

/// Everything the host needs to register one setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub tooltip: &'static str,
    pub category: &'static str,
    pub kind: SettingKind,
    pub default: Value,
}

/// Descriptors for every configuration field, defaults taken from [`Config::default`].
#[must_use]
pub fn descriptors() -> Vec<SettingDescriptor> {
    let defaults = Config::default();
    let describe = |id: &'static str, name: &'static str, tooltip: &'static str, kind: SettingKind| {
        SettingDescriptor {
            id,
            name,
            tooltip,
            category: CATEGORY,
            kind,
            default: defaults.value_of(id).unwrap_or(Value::Null),
        }
    };

    vec![
        describe(
            config::ZOOM_FACTOR,
            "Zoom factor",
            "How many times the area under the cursor is enlarged",
            SettingKind::Slider { min: MIN_ZOOM, max: MAX_ZOOM, step: 0.5 },
        ),
        describe(
            config::GLASS_DIAMETER,
            "Glass size",
            "Diameter of the glass in pixels",
            SettingKind::Slider { min: MIN_DIAMETER_PX, max: MAX_DIAMETER_PX, step: 10.0 },
        ),
        describe(config::BORDER_ENABLED, "Show border", "Draw a border around the glass", SettingKind::Toggle),
        describe(
            config::BORDER_WIDTH,
            "Border width",
            "Border width in pixels",
            SettingKind::Slider { min: 0.0, max: MAX_BORDER_WIDTH_PX, step: 1.0 },
        ),
        describe(config::BORDER_COLOR, "Border color", "Border color", SettingKind::Color),
        describe(config::ACTIVATION_KEY, "Activation key", "Hold this key to show the glass", SettingKind::Text),
        describe(
            config::ACTIVATION_REQUIRES_ALT,
            "Activation requires Alt",
            "Only activate while Alt is held",
            SettingKind::Toggle,
        ),
        describe(config::RESET_KEY, "Reset key", "Press to zero the manual offset", SettingKind::Text),
        describe(config::RESET_REQUIRES_ALT, "Reset requires Alt", "Only reset while Alt is held", SettingKind::Toggle),
        describe(
            config::OFFSET_STEP,
            "Offset step",
            "Arrow-key nudge in graph units (Shift moves five times as far)",
            SettingKind::Slider { min: 1.0, max: f64::from(MAX_OFFSET_STEP), step: 1.0 },
        ),
        describe(
            config::FOLLOW_CURSOR,
            "Follow cursor",
            "Move the glass with the cursor instead of pinning it to the canvas",
            SettingKind::Toggle,
        ),
        describe(
            config::PLACEMENT,
            "Glass placement",
            "Where the glass sits relative to the cursor or canvas",
            SettingKind::Combo { options: Placement::ALL.iter().map(|p| p.as_str()).collect() },
        ),
        describe(
            config::SHAPE,
            "Glass shape",
            "Outline of the glass",
            SettingKind::Combo { options: config::GlassShape::ALL.iter().map(|s| s.as_str()).collect() },
        ),
        describe(
            config::FILTER,
            "Texture filter",
            "Linear smooths pixels, nearest keeps hard edges",
            SettingKind::Combo { options: config::FilterMode::ALL.iter().map(|f| f.as_str()).collect() },
        ),
        describe(
            config::DEBUG_OVERLAY,
            "Debug overlay",
            "Show coordinate diagnostics inside the glass",
            SettingKind::Toggle,
        ),
    ]
}

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Callback invoked by the store with the new value of a setting.
pub type ChangeCallback = Box<dyn FnMut(&Value)>;

/// Host settings store.
pub trait SettingsStore {
    /// Current value of `id`, or `default` if the user never changed it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be reached.
    fn get(&self, id: &str, default: &Value) -> Result<Value, StoreError>;

    /// Register a setting with the host UI and subscribe to its changes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be reached or refuses the setting.
    fn register(&mut self, descriptor: &SettingDescriptor, on_change: ChangeCallback) -> Result<(), StoreError>;
}

/// Receiver of setting changes.
pub trait SettingSink {
    fn setting_changed(&mut self, id: &str, value: &Value);
}

// =============================================================================
// LOAD / SUBSCRIBE
// =============================================================================

/// Build the initial configuration from the store.
///
/// Fields the store cannot provide, or provides in an unusable shape, keep
/// their defaults. A store outage is logged once, not once per field.
#[must_use]
pub fn load_config(store: &dyn SettingsStore) -> Config {
    let mut config = Config::default();
    let mut warned_unavailable = false;

    for descriptor in descriptors() {
        let value = match store.get(descriptor.id, &descriptor.default) {
            Ok(value) => value,
            Err(e) => {
                if !warned_unavailable {
                    log::warn!("settings store read failed, using defaults: {e}");
                    warned_unavailable = true;
                }
                continue;
            }
        };
        if value.is_null() {
            continue;
        }
        if let Err(e) = config.apply(descriptor.id, &value) {
            log::warn!("ignoring stored setting: {e}");
        }
    }

    config
}

/// Register every setting with the store, forwarding changes to `sink`.
///
/// The store holds only a weak reference to the sink; changes delivered after
/// the sink is dropped are ignored. Returns the number of settings registered.
pub fn subscribe<S: SettingSink + 'static>(store: &mut dyn SettingsStore, sink: &Rc<RefCell<S>>) -> usize {
    let mut registered = 0;
    for descriptor in descriptors() {
        let weak: Weak<RefCell<S>> = Rc::downgrade(sink);
        let id = descriptor.id;
        let callback: ChangeCallback = Box::new(move |value: &Value| {
            let Some(sink) = weak.upgrade() else {
                return;
            };
            match sink.try_borrow_mut() {
                Ok(mut sink) => sink.setting_changed(id, value),
                Err(_) => log::warn!("setting {id} changed re-entrantly; change dropped"),
            }
        });
        match store.register(&descriptor, callback) {
            Ok(()) => registered += 1,
            Err(e) => log::warn!("could not register setting {id}: {e}"),
        }
    }
    registered
}
