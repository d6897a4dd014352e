//! Coordinate spaces and the sample-rectangle math.
//!
//! Three spaces are in play:
//!
//! - **client** pixels: CSS pixels relative to the browser viewport, as
//!   reported by pointer events and `getBoundingClientRect`;
//! - **canvas** pixels: the host canvas backing store, which differs from the
//!   client size by the device pixel ratio and any CSS scaling;
//! - **world** (graph) units: the host's pan/zoom-independent content space,
//!   related to canvas pixels by [`HostTransform`].
//!
//! Everything here is a pure function of its inputs.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::Serialize;

use crate::consts::GLASS_GAP_PX;

/// A point in client, canvas, or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero, negative, or not finite.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// An axis-aligned rectangle given by its top-left corner and extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle of `size` centred on `center`.
    #[must_use]
    pub fn centered(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the two rectangles share interior area.
    ///
    /// Strict on all four sides: rectangles that only touch along an edge or
    /// at a corner do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x && self.y < other.bottom() && self.bottom() > other.y
    }
}

/// Snapshot of the host's pan/zoom transform.
///
/// `offset` is in canvas pixels, `scale` is canvas pixels per world unit.
/// Copied from the host once per frame; never written back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostTransform {
    pub scale: f64,
    pub offset: Point,
}

impl Default for HostTransform {
    fn default() -> Self {
        Self { scale: 1.0, offset: Point::default() }
    }
}

impl HostTransform {
    #[must_use]
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self { scale, offset: Point::new(offset_x, offset_y) }
    }

    /// Whether the transform can be inverted.
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.scale.is_finite() && self.scale != 0.0 && self.offset.x.is_finite() && self.offset.y.is_finite()
    }

    /// Convert a canvas-pixel point to world coordinates.
    ///
    /// Returns `None` when the scale is zero or not finite.
    #[must_use]
    pub fn canvas_to_world(&self, canvas: Point) -> Option<Point> {
        if !self.is_invertible() {
            return None;
        }
        Some(Point {
            x: (canvas.x - self.offset.x) / self.scale,
            y: (canvas.y - self.offset.y) / self.scale,
        })
    }

    /// Convert a world-space point to canvas pixels.
    #[must_use]
    pub fn world_to_canvas(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.offset.x,
            y: world.y * self.scale + self.offset.y,
        }
    }
}

/// User correction added to the cursor's world position before sampling, in graph units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ManualOffset {
    pub x: i32,
    pub y: i32,
}

impl ManualOffset {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compute the region of the host canvas to magnify, in canvas pixels.
///
/// The cursor is taken to world space, shifted by the manual offset, and a
/// square of `glass_diameter / zoom_factor` canvas pixels is laid around it.
/// The world rectangle is mapped back to canvas pixels because the renderer
/// samples in pixel space.
///
/// Returns `None` (leaving any previous sample untouched) when the host scale
/// is zero or not finite, or when the zoom factor is not positive.
#[must_use]
pub fn compute_sample_rect(
    cursor: Point,
    host: &HostTransform,
    manual_offset: ManualOffset,
    glass_diameter: f64,
    zoom_factor: f64,
) -> Option<Rect> {
    if !(zoom_factor.is_finite() && zoom_factor > 0.0) {
        return None;
    }
    let world = host.canvas_to_world(cursor)?;
    let center = Point::new(world.x + f64::from(manual_offset.x), world.y + f64::from(manual_offset.y));
    let extent = (glass_diameter / zoom_factor) / host.scale;

    let world_rect = Rect::centered(center, Size::new(extent, extent));
    let origin = host.world_to_canvas(world_rect.origin());
    Some(Rect::new(origin.x, origin.y, extent * host.scale, extent * host.scale))
}

/// Convert a client-space point into canvas backing-store pixels.
///
/// `client_rect` is the canvas element's bounding client rectangle and
/// `backing` the size of its backing store. Returns `None` for a zero-size
/// client rectangle.
#[must_use]
pub fn client_to_canvas(client: Point, client_rect: &Rect, backing: Size) -> Option<Point> {
    if client_rect.size().is_empty() {
        return None;
    }
    let sx = backing.width / client_rect.width;
    let sy = backing.height / client_rect.height;
    Some(Point::new((client.x - client_rect.x) * sx, (client.y - client_rect.y) * sy))
}

/// Convert a client-space rectangle into canvas backing-store pixels.
#[must_use]
pub fn client_rect_to_canvas(rect: &Rect, client_rect: &Rect, backing: Size) -> Option<Rect> {
    let origin = client_to_canvas(rect.origin(), client_rect, backing)?;
    let sx = backing.width / client_rect.width;
    let sy = backing.height / client_rect.height;
    Some(Rect::new(origin.x, origin.y, rect.width * sx, rect.height * sy))
}

/// Normalized texture window handed to the fragment shader.
///
/// The shader samples at `offset + tex_coord * repeat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexWindow {
    pub offset: [f32; 2],
    pub repeat: [f32; 2],
}

impl TexWindow {
    /// Normalize a canvas-pixel sample rectangle against the source surface size.
    ///
    /// Returns `None` when the surface has no area.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_sample(sample: &Rect, surface: Size) -> Option<Self> {
        if surface.is_empty() {
            return None;
        }
        Some(Self {
            offset: [(sample.x / surface.width) as f32, (sample.y / surface.height) as f32],
            repeat: [(sample.width / surface.width) as f32, (sample.height / surface.height) as f32],
        })
    }
}

/// Where the glass sits relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Centred on the anchor.
    #[default]
    None,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Placement {
    pub const ALL: [Placement; 9] = [
        Self::None,
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Unit direction of the placement: x grows east, y grows south.
    #[must_use]
    pub fn direction(self) -> (f64, f64) {
        match self {
            Self::None => (0.0, 0.0),
            Self::North => (0.0, -1.0),
            Self::NorthEast => (1.0, -1.0),
            Self::East => (1.0, 0.0),
            Self::SouthEast => (1.0, 1.0),
            Self::South => (0.0, 1.0),
            Self::SouthWest => (-1.0, 1.0),
            Self::West => (-1.0, 0.0),
            Self::NorthWest => (-1.0, -1.0),
        }
    }

    /// Setting value used by the host settings store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::North => "north",
            Self::NorthEast => "north_east",
            Self::East => "east",
            Self::SouthEast => "south_east",
            Self::South => "south",
            Self::SouthWest => "south_west",
            Self::West => "west",
            Self::NorthWest => "north_west",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// Top-left corner of the floating glass, in client pixels.
///
/// When following the cursor the glass is centred on it, or pushed off to the
/// placement side with [`GLASS_GAP_PX`] between the cursor and the glass edge.
/// When not following, the glass is pinned to the matching edge or corner of
/// the canvas (inset by the same gap), or centred in the canvas for `None`.
#[must_use]
pub fn glass_origin(
    placement: Placement,
    follow_cursor: bool,
    cursor_client: Point,
    canvas_client: &Rect,
    diameter: f64,
) -> Point {
    let (dx, dy) = placement.direction();
    let half = diameter / 2.0;

    let center = if follow_cursor {
        let reach = half + GLASS_GAP_PX;
        Point::new(cursor_client.x + dx * reach, cursor_client.y + dy * reach)
    } else {
        let c = canvas_client.center();
        let reach_x = (canvas_client.width / 2.0 - half - GLASS_GAP_PX).max(0.0);
        let reach_y = (canvas_client.height / 2.0 - half - GLASS_GAP_PX).max(0.0);
        Point::new(c.x + dx * reach_x, c.y + dy * reach_y)
    };

    Point::new(center.x - half, center.y - half)
}
