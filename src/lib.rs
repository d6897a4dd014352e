//! Hold-to-zoom magnifying glass for node-graph canvas editors.
//!
//! This crate is compiled to WebAssembly and loaded next to a host graph editor.
//! While the activation key is held it samples the host's rendered canvas
//! around the cursor, zooms the region through a texture-sampling shader, and
//! shows it in a floating glass. DOM widgets that sit under the glass (text
//! boxes, images, videos) are cloned and rescaled on top of the zoomed pixels so
//! they stay readable.
//!
//! The host is treated as a read-only data source. Everything it provides (the
//! canvas, its pan/zoom transform, the widget tree, the settings store, the
//! key-value store) reaches the core through the traits in [`host`],
//! [`settings`] and [`persistence`], so the whole pipeline can be driven
//! natively in tests.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Points, rectangles, host transform and sample-rectangle math |
//! | [`config`] | User configuration and validation of setting changes |
//! | [`settings`] | Setting descriptors, initial load and change subscription |
//! | [`persistence`] | Manual-offset storage in a key-value store |
//! | [`input`] | Key, modifier and key-binding types |
//! | [`scheduler`] | Single-flight render scheduling flag |
//! | [`controller`] | Activation state machine and per-frame planning |
//! | [`compositor`] | Overlap test and placement of widget clones |
//! | [`gpu`] | Abstract GPU context used by the renderer |
//! | [`render`] | Texture-sampling renderer and its shaders |
//! | [`host`] | Host canvas and widget tree collaborator traits |
//! | [`consts`] | Shared constants (defaults, limits, storage keys) |
//! | `web` | Browser glue (feature `web`) |

pub mod compositor;
pub mod config;
pub mod consts;
pub mod controller;
pub mod geometry;
pub mod gpu;
pub mod host;
pub mod input;
pub mod persistence;
pub mod render;
pub mod scheduler;
pub mod settings;

#[cfg(feature = "web")]
pub mod web;
