//! Interaction controller: activation state machine and per-frame planning.
//!
//! `MagnifierCore` holds all interaction logic and no browser handles, so it
//! can be driven directly by tests. Event handlers return [`Action`]s for the
//! shell to carry out (show/hide the glass, ask for a frame callback, persist
//! offsets, change the texture filter). The frame callback calls
//! [`MagnifierCore::on_frame`], which yields a [`FramePlan`] describing what
//! to draw.
//!
//! STATES
//! ======
//! - **Inactive** (initial): pointer moves are tracked but nothing is drawn.
//! - **Active**: the glass is visible; pointer moves, arrow keys and the reset
//!   key re-sample and request a render.
//!
//! The glass deactivates on the first qualifying release: the activation key
//! going up, or Alt going up while the binding requires Alt. Whichever arrives
//! first wins; later releases find the controller Inactive and do nothing.
//! Losing window focus deactivates too.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use serde_json::Value;

use crate::compositor::{Candidate, Placed, compose};
use crate::config::{Config, ConfigChange, FilterMode};
use crate::consts::LARGE_STEP_MULTIPLIER;
use crate::geometry::{ManualOffset, Point, Rect, client_to_canvas, compute_sample_rect, glass_origin};
use crate::host::CanvasSnapshot;
use crate::input::{Key, Modifiers};
use crate::scheduler::RenderScheduler;

/// Actions returned from event handlers for the shell to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Make the glass container visible.
    ShowGlass,
    /// Hide the glass container and discard every overlay clone.
    HideGlass,
    /// Ask the host for one frame callback.
    RequestFrame,
    /// Write the manual offset to storage.
    PersistOffsets(ManualOffset),
    /// Glass size, border, shape, or placement changed.
    Restyle,
    /// Switch the renderer's texture filter.
    SetFilter(FilterMode),
}

/// Activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlassState {
    #[default]
    Inactive,
    Active,
}

/// What to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan<E> {
    /// Region of the host canvas to magnify, in canvas pixels.
    pub sample: Rect,
    /// Host canvas snapshot the sample was computed against.
    pub canvas: CanvasSnapshot,
    /// Top-left of the glass in client pixels.
    pub glass_origin: Point,
    pub diameter: f64,
    pub zoom: f64,
    /// Widget clones to layer over the magnified image.
    pub clones: Vec<Placed<E>>,
    /// Diagnostic lines, present only with the debug overlay enabled.
    pub debug: Option<Vec<String>>,
}

/// Core controller state. Separated from the browser shell for testing.
#[derive(Debug, Clone, Default)]
pub struct MagnifierCore {
    config: Config,
    state: GlassState,
    /// Last pointer position in client pixels, tracked even while Inactive.
    pointer: Option<Point>,
    /// Last host canvas reading.
    canvas: Option<CanvasSnapshot>,
    /// Cursor in canvas pixels, derived from `pointer` and `canvas`.
    cursor: Option<Point>,
    sample: Option<Rect>,
    scheduler: RenderScheduler,
}

impl MagnifierCore {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[cfg(test)]
    pub fn state(&self) -> GlassState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == GlassState::Active
    }

    #[cfg(test)]
    pub fn manual_offset(&self) -> ManualOffset {
        self.config.manual_offset
    }

    /// The most recently computed sample rectangle.
    #[cfg(test)]
    pub fn sample(&self) -> Option<Rect> {
        self.sample
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    #[must_use]
    pub fn render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    // --- Host data ---

    /// Record a fresh reading of the host canvas.
    pub fn sync_host(&mut self, canvas: CanvasSnapshot) {
        self.canvas = Some(canvas);
        self.recompute_sample();
    }

    // --- Input events ---

    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        self.pointer = Some(client);
        let mut actions = Vec::new();
        if self.is_active() {
            self.recompute_sample();
            self.request_render(&mut actions);
        }
        actions
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.config.activation.is_pressed_by(key, modifiers) {
            if !self.is_active() {
                self.state = GlassState::Active;
                self.recompute_sample();
                actions.push(Action::ShowGlass);
                self.request_render(&mut actions);
                log::debug!("magnifier activated");
            }
            return actions;
        }

        if self.config.reset.is_pressed_by(key, modifiers) {
            self.config.manual_offset = ManualOffset::default();
            actions.push(Action::PersistOffsets(self.config.manual_offset));
            if self.is_active() {
                self.recompute_sample();
                self.request_render(&mut actions);
            }
            return actions;
        }

        if self.is_active() {
            if let Some((dx, dy)) = key.arrow_direction() {
                let step = if modifiers.shift {
                    self.config.offset_step.saturating_mul(LARGE_STEP_MULTIPLIER)
                } else {
                    self.config.offset_step
                };
                let offset = &mut self.config.manual_offset;
                offset.x = offset.x.saturating_add(dx * step);
                offset.y = offset.y.saturating_add(dy * step);
                actions.push(Action::PersistOffsets(*offset));
                self.recompute_sample();
                self.request_render(&mut actions);
            }
        }

        actions
    }

    pub fn on_key_up(&mut self, key: &Key) -> Vec<Action> {
        if self.is_active() && self.config.activation.is_released_by(key) {
            return self.deactivate();
        }
        Vec::new()
    }

    /// The window lost focus; key-up events will not arrive.
    pub fn on_blur(&mut self) -> Vec<Action> {
        if self.is_active() {
            return self.deactivate();
        }
        Vec::new()
    }

    fn deactivate(&mut self) -> Vec<Action> {
        self.state = GlassState::Inactive;
        self.scheduler.cancel();
        log::debug!("magnifier deactivated");
        vec![Action::HideGlass]
    }

    // --- Settings ---

    /// Apply a settings-store change and report the follow-up work.
    ///
    /// Invalid values are logged and ignored.
    pub fn apply_setting(&mut self, id: &str, value: &Value) -> Vec<Action> {
        let change = match self.config.apply(id, value) {
            Ok(change) => change,
            Err(e) => {
                log::warn!("ignoring setting change: {e}");
                return Vec::new();
            }
        };

        let mut actions = Vec::new();
        match change {
            ConfigChange::Unchanged | ConfigChange::Bindings => return actions,
            ConfigChange::Restyle => actions.push(Action::Restyle),
            ConfigChange::Resample => {
                self.recompute_sample();
                actions.push(Action::Restyle);
            }
            ConfigChange::Filter(mode) => actions.push(Action::SetFilter(mode)),
            ConfigChange::Debug => {}
        }
        self.request_render(&mut actions);
        actions
    }

    // --- Frame ---

    /// Handle the host's frame callback.
    ///
    /// Returns a plan only when a render was requested since the last frame
    /// and the glass is still active. `candidates` is invoked at most once,
    /// and only when a plan is produced, so widget discovery is skipped on
    /// coalesced or stale callbacks.
    pub fn on_frame<E, F>(&mut self, canvas: CanvasSnapshot, candidates: F) -> Option<FramePlan<E>>
    where
        F: FnOnce(&CanvasSnapshot) -> Vec<Candidate<E>>,
    {
        if !self.scheduler.take() || !self.is_active() {
            return None;
        }
        self.sync_host(canvas);
        let sample = self.sample?;
        let pointer = self.pointer.unwrap_or_else(|| canvas.client_rect.center());

        let zoom = self.config.zoom_factor;
        let diameter = self.config.glass_diameter;
        let origin = glass_origin(self.config.placement, self.config.follow_cursor, pointer, &canvas.client_rect, diameter);
        let clones = compose(&sample, zoom, candidates(&canvas));
        let debug = self.config.debug.then(|| self.debug_lines(&canvas, &sample, clones.len()));

        Some(FramePlan { sample, canvas, glass_origin: origin, diameter, zoom, clones, debug })
    }

    /// Drop the pending frame without drawing, e.g. when the host refused a
    /// frame callback. The next event requests a fresh frame.
    pub fn skip_frame(&mut self) {
        self.scheduler.cancel();
    }

    /// A frame callback ran but could not draw (host unreadable, upload
    /// failed). Call once per such callback: it asks for exactly one more
    /// frame while the glass is active, so a still cursor does not leave a
    /// stale image behind.
    pub fn retry_frame(&mut self) -> Vec<Action> {
        self.scheduler.cancel();
        let mut actions = Vec::new();
        self.request_render(&mut actions);
        actions
    }

    fn debug_lines(&self, canvas: &CanvasSnapshot, sample: &Rect, clone_count: usize) -> Vec<String> {
        let cursor = self.cursor.unwrap_or_default();
        let t = canvas.transform;
        let offset = self.config.manual_offset;
        vec![
            format!("cursor {:.1}, {:.1} px", cursor.x, cursor.y),
            format!("host scale {:.3} offset {:.1}, {:.1}", t.scale, t.offset.x, t.offset.y),
            format!("manual offset {}, {}", offset.x, offset.y),
            format!("sample {:.1}, {:.1} {:.1}x{:.1}", sample.x, sample.y, sample.width, sample.height),
            format!("zoom {:.2}x clones {clone_count}", self.config.zoom_factor),
        ]
    }

    // --- Internals ---

    fn request_render(&mut self, actions: &mut Vec<Action>) {
        if self.is_active() && self.scheduler.request() {
            actions.push(Action::RequestFrame);
        }
    }

    /// Recompute cursor and sample from the last pointer and canvas readings.
    ///
    /// Leaves the previous sample in place when the inputs are missing or the
    /// host transform is degenerate.
    fn recompute_sample(&mut self) {
        let (Some(pointer), Some(canvas)) = (self.pointer, self.canvas) else {
            return;
        };
        let Some(cursor) = client_to_canvas(pointer, &canvas.client_rect, canvas.backing) else {
            return;
        };
        self.cursor = Some(cursor);
        if let Some(rect) = compute_sample_rect(
            cursor,
            &canvas.transform,
            self.config.manual_offset,
            self.config.glass_diameter,
            self.config.zoom_factor,
        ) {
            self.sample = Some(rect);
        }
    }
}
