//! Overlay compositor: which host widgets appear under the glass, and where.
//!
//! The compositor works in two steps, both pure:
//!
//! 1. [`compose`] tests each candidate widget's canvas-pixel bounding box
//!    against the sample rectangle and places every overlapping one relative
//!    to the glass, scaled by the zoom factor.
//! 2. [`clone_spec`] turns a placed widget plus a [`Snapshot`] of its source
//!    element into a [`CloneSpec`]: the tag, attributes, styles and playback
//!    state of the visual clone the DOM layer should build.
//!
//! Clones are rebuilt from scratch every frame. There is no diffing and no
//! clone identity carried across frames, because the host's widget set can
//! change between any two frames.
//!
//! Clones are scaled with a CSS transform rather than by resizing, so media
//! keeps its native resolution and text keeps its layout.

#[cfg(test)]
#[path = "compositor_test.rs"]
mod compositor_test;

use crate::geometry::Rect;

/// Which kind of clone a widget element produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// `<textarea>` or `<input>`.
    Text,
    Image,
    Video,
}

impl WidgetKind {
    /// Classify an element by its (upper- or lower-case) tag name.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "TEXTAREA" | "INPUT" => Some(Self::Text),
            "IMG" => Some(Self::Image),
            "VIDEO" => Some(Self::Video),
            _ => None,
        }
    }
}

/// A host widget element that may need cloning this frame.
///
/// `bounds` is in canvas backing-store pixels, the same space as the sample rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<E> {
    pub element: E,
    pub kind: WidgetKind,
    pub bounds: Rect,
}

/// A candidate placed inside the glass.
///
/// `left`/`top` are relative to the glass origin and already multiplied by
/// the zoom factor. `width`/`height` are the unscaled size; the clone is
/// enlarged by a `scale` transform anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed<E> {
    pub element: E,
    pub kind: WidgetKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Place every candidate that overlaps the sample rectangle.
///
/// Candidates that only touch the sample rectangle's edge are dropped.
/// Order is preserved so later host widgets stack above earlier ones.
#[must_use]
pub fn compose<E>(sample: &Rect, zoom: f64, candidates: Vec<Candidate<E>>) -> Vec<Placed<E>> {
    candidates
        .into_iter()
        .filter(|c| c.bounds.overlaps(sample))
        .map(|c| Placed {
            left: (c.bounds.x - sample.x) * zoom,
            top: (c.bounds.y - sample.y) * zoom,
            width: c.bounds.width,
            height: c.bounds.height,
            scale: zoom,
            kind: c.kind,
            element: c.element,
        })
        .collect()
}

// =============================================================================
// CLONE SPECS
// =============================================================================

/// Visual state read from a source element, captured fresh each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Text {
        value: String,
        multiline: bool,
        background: String,
        color: String,
        border: String,
        font_family: String,
        font_size: String,
    },
    Image {
        src: String,
        alt: String,
    },
    Video {
        src: String,
        looped: bool,
        current_time: f64,
        paused: bool,
    },
}

/// Media state applied to a video clone after it is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub current_time: f64,
    pub looped: bool,
    /// Always `true`: clones must never make sound.
    pub muted: bool,
    /// Start playback, mirroring a source that is playing.
    pub play: bool,
}

/// Everything the DOM layer needs to build one clone.
#[derive(Debug, Clone, PartialEq)]
pub struct CloneSpec {
    pub tag: &'static str,
    pub value: Option<String>,
    pub attributes: Vec<(&'static str, String)>,
    pub styles: Vec<(&'static str, String)>,
    pub playback: Option<Playback>,
}

/// Build the clone for a placed widget from its source snapshot.
///
/// `pixel_ratio` is canvas backing pixels per CSS pixel. Clone boxes are laid
/// out in canvas pixels, so CSS lengths copied from the source (font size,
/// border width) are multiplied by it to keep text in proportion.
///
/// All clones are absolutely positioned, ignore the pointer, and carry the
/// zoom as a top-left anchored `scale` transform. Per kind:
///
/// - text: value plus inherited background, foreground, border and font;
///   disabled and read-only;
/// - image: `src` and `alt` only;
/// - video: `src`, loop flag, forced mute and the source's current time,
///   playing only if the source is playing.
#[must_use]
pub fn clone_spec<E>(placed: &Placed<E>, snapshot: &Snapshot, pixel_ratio: f64) -> CloneSpec {
    let mut styles = vec![
        ("position", "absolute".to_owned()),
        ("left", px(placed.left)),
        ("top", px(placed.top)),
        ("width", px(placed.width)),
        ("height", px(placed.height)),
        ("margin", "0".to_owned()),
        ("transform", format!("scale({})", placed.scale)),
        ("transform-origin", "0 0".to_owned()),
        ("pointer-events", "none".to_owned()),
        ("box-sizing", "border-box".to_owned()),
    ];

    match snapshot {
        Snapshot::Text { value, multiline, background, color, border, font_family, font_size } => {
            styles.extend([
                ("background", background.clone()),
                ("color", color.clone()),
                ("border", scale_px(border, pixel_ratio)),
                ("font-family", font_family.clone()),
                ("font-size", scale_px(font_size, pixel_ratio)),
                ("resize", "none".to_owned()),
                ("overflow", "hidden".to_owned()),
            ]);
            CloneSpec {
                tag: if *multiline { "textarea" } else { "input" },
                value: Some(value.clone()),
                attributes: vec![("disabled", String::new()), ("readonly", String::new()), ("tabindex", "-1".to_owned())],
                styles,
                playback: None,
            }
        }
        Snapshot::Image { src, alt } => CloneSpec {
            tag: "img",
            value: None,
            attributes: vec![("src", src.clone()), ("alt", alt.clone())],
            styles,
            playback: None,
        },
        Snapshot::Video { src, looped, current_time, paused } => {
            let mut attributes = vec![("src", src.clone()), ("muted", String::new()), ("playsinline", String::new())];
            if *looped {
                attributes.push(("loop", String::new()));
            }
            CloneSpec {
                tag: "video",
                value: None,
                attributes,
                styles,
                playback: Some(Playback { current_time: *current_time, looped: *looped, muted: true, play: !*paused }),
            }
        }
    }
}

fn px(v: f64) -> String {
    format!("{v}px")
}

/// Multiply every `<n>px` token of a CSS value by `factor`, leaving other
/// tokens (keywords, colors) as they are.
fn scale_px(value: &str, factor: f64) -> String {
    value
        .split(' ')
        .map(|token| match token.strip_suffix("px").map(str::parse::<f64>) {
            Some(Ok(n)) => px(n * factor),
            _ => token.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
