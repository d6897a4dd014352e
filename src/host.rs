//! Collaborator interfaces for the host graph editor.
//!
//! The host is a read-only data source polled once per frame: its canvas (a
//! pixel surface plus a pan/zoom transform and a client rectangle) and its
//! widget tree (DOM elements attached to graph nodes). Nothing here writes to
//! host state, and nothing read from the widget tree is kept across frames.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use crate::compositor::{Candidate, WidgetKind};
use crate::consts::{CANVAS_RETRY_DELAY_MS, CANVAS_RETRY_LIMIT};
use crate::geometry::{HostTransform, Rect, Size, client_rect_to_canvas};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("host canvas not found")]
    CanvasNotFound,
    #[error("host object is missing {0}")]
    MissingProperty(&'static str),
    #[error("host call failed: {0}")]
    Js(String),
}

// =============================================================================
// CANVAS
// =============================================================================

/// Per-frame reading of the host canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSnapshot {
    /// Pan/zoom transform between world units and canvas pixels.
    pub transform: HostTransform,
    /// Backing-store size in canvas pixels.
    pub backing: Size,
    /// Bounding client rectangle of the canvas element, in CSS pixels.
    pub client_rect: Rect,
}

impl CanvasSnapshot {
    /// Canvas backing pixels per CSS pixel, horizontally. `1.0` while the
    /// canvas has no layout width.
    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        if self.client_rect.width > 0.0 && self.backing.width > 0.0 {
            self.backing.width / self.client_rect.width
        } else {
            1.0
        }
    }
}

/// The host's rendered canvas.
pub trait HostCanvas {
    /// Pixel surface the renderer uploads from.
    type Surface: ?Sized;

    fn surface(&self) -> &Self::Surface;

    /// Read the current transform and geometry.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the host objects are missing or malformed.
    fn snapshot(&self) -> Result<CanvasSnapshot, HostError>;
}

// =============================================================================
// WIDGETS
// =============================================================================

/// One DOM element found in the host widget tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HostWidget<E> {
    pub element: E,
    /// Element tag name as reported by the DOM.
    pub tag: String,
    /// Bounding client rectangle in CSS pixels.
    pub client_rect: Rect,
    /// Whether the element is rendered (not `display: none`, not detached).
    pub visible: bool,
}

/// The host's widget tree, queried fresh every frame.
pub trait WidgetTree {
    type Element;

    fn widgets(&self) -> Vec<HostWidget<Self::Element>>;
}

/// Turn the host's widgets into compositor candidates in canvas pixels.
///
/// Hidden, zero-size and unsupported elements are skipped.
#[must_use]
pub fn discover_candidates<T: WidgetTree + ?Sized>(tree: &T, canvas: &CanvasSnapshot) -> Vec<Candidate<T::Element>> {
    tree.widgets()
        .into_iter()
        .filter(|w| w.visible && !w.client_rect.size().is_empty())
        .filter_map(|w| {
            let kind = WidgetKind::from_tag(&w.tag)?;
            let bounds = client_rect_to_canvas(&w.client_rect, &canvas.client_rect, canvas.backing)?;
            Some(Candidate { element: w.element, kind, bounds })
        })
        .collect()
}

// =============================================================================
// STARTUP
// =============================================================================

/// Decision after probing for the host canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found,
    /// Try again after this many milliseconds.
    RetryAfter(u32),
    GiveUp,
}

/// Bounded fixed-delay retry while the host canvas is not yet mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasProbe {
    attempts: u32,
    limit: u32,
    delay_ms: u32,
}

impl Default for CanvasProbe {
    fn default() -> Self {
        Self { attempts: 0, limit: CANVAS_RETRY_LIMIT, delay_ms: CANVAS_RETRY_DELAY_MS }
    }
}

impl CanvasProbe {
    #[must_use]
    pub fn new(limit: u32, delay_ms: u32) -> Self {
        Self { attempts: 0, limit, delay_ms }
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record one probe and decide what to do next.
    pub fn record(&mut self, found: bool) -> ProbeOutcome {
        self.attempts += 1;
        if found {
            return ProbeOutcome::Found;
        }
        if self.attempts >= self.limit {
            log::error!("host canvas not found after {} attempts; magnifier disabled", self.attempts);
            return ProbeOutcome::GiveUp;
        }
        log::debug!("host canvas not ready (attempt {}/{})", self.attempts, self.limit);
        ProbeOutcome::RetryAfter(self.delay_ms)
    }
}
