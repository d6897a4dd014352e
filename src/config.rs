//! User configuration for the glass.
//!
//! `Config` is written only through [`Config::apply`] (driven by settings-store
//! change notifications) and by the controller's manual-offset transitions.
//! Every other component reads it.
//!
//! Each field is addressed by a stable setting id, the same string the host
//! settings store uses. [`Config::value_of`] and [`Config::apply`] are the two
//! directions of that mapping.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Serialize;
use serde_json::{Value, json};

use crate::consts::{
    DEFAULT_ACTIVATION_KEY, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH_PX, DEFAULT_DIAMETER_PX, DEFAULT_OFFSET_STEP,
    DEFAULT_RESET_KEY, DEFAULT_ZOOM, MAX_BORDER_WIDTH_PX, MAX_DIAMETER_PX, MAX_OFFSET_STEP, MAX_ZOOM, MIN_DIAMETER_PX,
    MIN_ZOOM, ROUNDED_CORNER_RATIO,
};
use crate::geometry::{ManualOffset, Placement};
use crate::input::KeyBinding;

// ── Setting ids ─────────────────────────────────────────────────

pub const ZOOM_FACTOR: &str = "MagnifyGlass.ZoomFactor";
pub const GLASS_DIAMETER: &str = "MagnifyGlass.GlassSize";
pub const BORDER_ENABLED: &str = "MagnifyGlass.BorderEnabled";
pub const BORDER_WIDTH: &str = "MagnifyGlass.BorderWidth";
pub const BORDER_COLOR: &str = "MagnifyGlass.BorderColor";
pub const ACTIVATION_KEY: &str = "MagnifyGlass.ActivationKey";
pub const ACTIVATION_REQUIRES_ALT: &str = "MagnifyGlass.ActivationRequiresAlt";
pub const RESET_KEY: &str = "MagnifyGlass.ResetKey";
pub const RESET_REQUIRES_ALT: &str = "MagnifyGlass.ResetRequiresAlt";
pub const OFFSET_STEP: &str = "MagnifyGlass.OffsetStep";
pub const FOLLOW_CURSOR: &str = "MagnifyGlass.FollowCursor";
pub const PLACEMENT: &str = "MagnifyGlass.Placement";
pub const SHAPE: &str = "MagnifyGlass.Shape";
pub const FILTER: &str = "MagnifyGlass.TextureFilter";
pub const DEBUG_OVERLAY: &str = "MagnifyGlass.DebugOverlay";

/// Every setting id, in registration order.
#[cfg(test)]
pub const SETTING_IDS: [&str; 15] = [
    ZOOM_FACTOR,
    GLASS_DIAMETER,
    BORDER_ENABLED,
    BORDER_WIDTH,
    BORDER_COLOR,
    ACTIVATION_KEY,
    ACTIVATION_REQUIRES_ALT,
    RESET_KEY,
    RESET_REQUIRES_ALT,
    OFFSET_STEP,
    FOLLOW_CURSOR,
    PLACEMENT,
    SHAPE,
    FILTER,
    DEBUG_OVERLAY,
];

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown setting: {0}")]
    UnknownSetting(String),
    #[error("invalid value for {id}: {reason}")]
    InvalidValue { id: String, reason: String },
}

fn invalid(id: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue { id: id.to_owned(), reason: reason.into() }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Outline of the glass window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlassShape {
    #[default]
    Circle,
    Square,
    RoundedSquare,
}

impl GlassShape {
    pub const ALL: [GlassShape; 3] = [Self::Circle, Self::Square, Self::RoundedSquare];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::RoundedSquare => "rounded_square",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// CSS `border-radius` for a glass of the given diameter.
    #[must_use]
    pub fn border_radius(self, diameter: f64) -> String {
        match self {
            Self::Circle => "50%".to_owned(),
            Self::Square => "0".to_owned(),
            Self::RoundedSquare => format!("{}px", (diameter * ROUNDED_CORNER_RATIO).round()),
        }
    }
}

/// Texture sampling filter used when magnifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Smooth bilinear interpolation.
    #[default]
    Linear,
    /// Hard pixel edges.
    Nearest,
}

impl FilterMode {
    pub const ALL: [FilterMode; 2] = [Self::Linear, Self::Nearest];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Nearest => "nearest",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value)
    }
}

/// What a successful [`Config::apply`] requires from the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// The value was already current.
    Unchanged,
    /// Glass border, shape, or position changed.
    Restyle,
    /// Zoom or diameter changed; the sample rectangle must be recomputed.
    Resample,
    /// The texture filter changed.
    Filter(FilterMode),
    /// Key bindings or offset step changed; nothing visible.
    Bindings,
    /// The debug overlay was toggled.
    Debug,
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Magnification factor, at least 1.
    pub zoom_factor: f64,
    /// Glass diameter in CSS pixels.
    pub glass_diameter: f64,
    pub border_enabled: bool,
    pub border_width: f64,
    /// CSS hex color, always with a leading `#`.
    pub border_color: String,
    /// Key held to show the glass.
    pub activation: KeyBinding,
    /// Key pressed to zero the manual offset.
    pub reset: KeyBinding,
    /// Arrow-key nudge in graph units.
    pub offset_step: i32,
    pub follow_cursor: bool,
    pub placement: Placement,
    pub shape: GlassShape,
    pub filter: FilterMode,
    pub debug: bool,
    /// Persisted correction added to the cursor's world position.
    pub manual_offset: ManualOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zoom_factor: DEFAULT_ZOOM,
            glass_diameter: DEFAULT_DIAMETER_PX,
            border_enabled: true,
            border_width: DEFAULT_BORDER_WIDTH_PX,
            border_color: DEFAULT_BORDER_COLOR.to_owned(),
            activation: KeyBinding::new(DEFAULT_ACTIVATION_KEY, false),
            reset: KeyBinding::new(DEFAULT_RESET_KEY, true),
            offset_step: DEFAULT_OFFSET_STEP,
            follow_cursor: true,
            placement: Placement::None,
            shape: GlassShape::Circle,
            filter: FilterMode::Linear,
            debug: false,
            manual_offset: ManualOffset::default(),
        }
    }
}

impl Config {
    /// Border width actually drawn around the glass, in CSS pixels.
    #[must_use]
    pub fn border_px(&self) -> f64 {
        if self.border_enabled { self.border_width.max(0.0) } else { 0.0 }
    }

    /// Current value of a setting, in the shape the settings store uses.
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<Value> {
        let value = match id {
            ZOOM_FACTOR => json!(self.zoom_factor),
            GLASS_DIAMETER => json!(self.glass_diameter),
            BORDER_ENABLED => json!(self.border_enabled),
            BORDER_WIDTH => json!(self.border_width),
            BORDER_COLOR => json!(self.border_color),
            ACTIVATION_KEY => json!(self.activation.key),
            ACTIVATION_REQUIRES_ALT => json!(self.activation.require_alt),
            RESET_KEY => json!(self.reset.key),
            RESET_REQUIRES_ALT => json!(self.reset.require_alt),
            OFFSET_STEP => json!(self.offset_step),
            FOLLOW_CURSOR => json!(self.follow_cursor),
            PLACEMENT => json!(self.placement.as_str()),
            SHAPE => json!(self.shape.as_str()),
            FILTER => json!(self.filter.as_str()),
            DEBUG_OVERLAY => json!(self.debug),
            _ => return None,
        };
        Some(value)
    }

    /// Validate and apply one setting change.
    ///
    /// Numeric settings are clamped into range rather than rejected. Values of
    /// the wrong type are rejected and leave the config untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSetting`] for an unrecognised id and
    /// [`ConfigError::InvalidValue`] when the value cannot be interpreted.
    pub fn apply(&mut self, id: &str, value: &Value) -> Result<ConfigChange, ConfigError> {
        let change = match id {
            ZOOM_FACTOR => {
                let zoom = number(id, value)?.clamp(MIN_ZOOM, MAX_ZOOM);
                replace(&mut self.zoom_factor, zoom, ConfigChange::Resample)
            }
            GLASS_DIAMETER => {
                let diameter = number(id, value)?.clamp(MIN_DIAMETER_PX, MAX_DIAMETER_PX);
                replace(&mut self.glass_diameter, diameter, ConfigChange::Resample)
            }
            BORDER_ENABLED => replace(&mut self.border_enabled, boolean(id, value)?, ConfigChange::Restyle),
            BORDER_WIDTH => {
                let width = number(id, value)?.clamp(0.0, MAX_BORDER_WIDTH_PX);
                replace(&mut self.border_width, width, ConfigChange::Restyle)
            }
            BORDER_COLOR => replace(&mut self.border_color, color(id, value)?, ConfigChange::Restyle),
            ACTIVATION_KEY => replace(&mut self.activation.key, key_name(id, value)?, ConfigChange::Bindings),
            ACTIVATION_REQUIRES_ALT => {
                replace(&mut self.activation.require_alt, boolean(id, value)?, ConfigChange::Bindings)
            }
            RESET_KEY => replace(&mut self.reset.key, key_name(id, value)?, ConfigChange::Bindings),
            RESET_REQUIRES_ALT => replace(&mut self.reset.require_alt, boolean(id, value)?, ConfigChange::Bindings),
            OFFSET_STEP => {
                let step = integer(id, value)?.clamp(1, MAX_OFFSET_STEP);
                replace(&mut self.offset_step, step, ConfigChange::Bindings)
            }
            FOLLOW_CURSOR => replace(&mut self.follow_cursor, boolean(id, value)?, ConfigChange::Restyle),
            PLACEMENT => {
                let placement = Placement::parse(text(id, value)?).ok_or_else(|| invalid(id, "unknown placement"))?;
                replace(&mut self.placement, placement, ConfigChange::Restyle)
            }
            SHAPE => {
                let shape = GlassShape::parse(text(id, value)?).ok_or_else(|| invalid(id, "unknown shape"))?;
                replace(&mut self.shape, shape, ConfigChange::Restyle)
            }
            FILTER => {
                let filter = FilterMode::parse(text(id, value)?).ok_or_else(|| invalid(id, "unknown filter"))?;
                replace(&mut self.filter, filter, ConfigChange::Filter(filter))
            }
            DEBUG_OVERLAY => replace(&mut self.debug, boolean(id, value)?, ConfigChange::Debug),
            _ => return Err(ConfigError::UnknownSetting(id.to_owned())),
        };
        Ok(change)
    }
}

fn replace<T: PartialEq>(slot: &mut T, next: T, change: ConfigChange) -> ConfigChange {
    if *slot == next {
        ConfigChange::Unchanged
    } else {
        *slot = next;
        change
    }
}

// ── Value coercion ──────────────────────────────────────────────

/// Accept JSON numbers and numeric strings (sliders in some hosts report strings).
fn number(id: &str, value: &Value) -> Result<f64, ConfigError> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => None,
        },
        _ => None,
    };
    n.filter(|n| n.is_finite()).ok_or_else(|| invalid(id, "expected a number"))
}

#[allow(clippy::cast_possible_truncation)]
fn integer(id: &str, value: &Value) -> Result<i32, ConfigError> {
    let n = number(id, value)?.round();
    if n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return Err(invalid(id, "out of range"));
    }
    Ok(n as i32)
}

fn boolean(id: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        _ => Err(invalid(id, "expected a boolean")),
    }
}

fn text<'a>(id: &str, value: &'a Value) -> Result<&'a str, ConfigError> {
    value.as_str().ok_or_else(|| invalid(id, "expected a string"))
}

fn key_name(id: &str, value: &Value) -> Result<String, ConfigError> {
    let key = text(id, value)?;
    if key.is_empty() {
        return Err(invalid(id, "key must not be empty"));
    }
    Ok(key.to_owned())
}

/// Normalize `rgb`, `rrggbb` or `rrggbbaa` hex (with or without `#`) to `#…`.
fn color(id: &str, value: &Value) -> Result<String, ConfigError> {
    let raw = text(id, value)?.trim();
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if !matches!(hex.len(), 3 | 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(id, "expected a hex color"));
    }
    Ok(format!("#{}", hex.to_ascii_lowercase()))
}
