//! Texture-sampling renderer: draws the magnified region into the glass.
//!
//! This module is the only place that drives a [`GpuContext`]. It owns one
//! shader program, two static quad buffers and one dynamic texture. All of
//! them are created once by [`Renderer::initialize`] and released once by
//! [`Renderer::dispose`] (or on drop). Each frame only the texture's pixels
//! change.
//!
//! The shaders are a straight pass-through. The vertex stage forwards the
//! quad's texture coordinates; the fragment stage samples at
//! `offset + tex_coord * repeat`. Filtering is a texture parameter, never
//! shader logic, so switching it never relinks the program.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::config::FilterMode;
use crate::geometry::{Rect, Size, TexWindow};
use crate::gpu::{Bindings, DrawCall, GpuContext, GpuError, ShaderStage};

pub const VERTEX_SHADER: &str = r"#version 300 es
in vec2 a_position;
in vec2 a_tex_coord;
out vec2 v_tex_coord;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
    v_tex_coord = a_tex_coord;
}
";

pub const FRAGMENT_SHADER: &str = r"#version 300 es
precision mediump float;

uniform sampler2D u_texture;
uniform vec2 u_offset;
uniform vec2 u_repeat;

in vec2 v_tex_coord;
out vec4 out_color;

void main() {
    out_color = texture(u_texture, u_offset + v_tex_coord * u_repeat);
}
";

/// Full-viewport quad in clip space, as a triangle strip.
pub const QUAD_POSITIONS: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

/// Texture coordinates matching [`QUAD_POSITIONS`].
///
/// Canvas uploads put the top row at `v = 0`, so the bottom of the quad
/// samples `v = 1`.
pub const QUAD_TEX_COORDS: [f32; 8] = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("renderer has been disposed")]
    Disposed,
    #[error("source surface has no area")]
    EmptySource,
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

// =============================================================================
// RENDERER
// =============================================================================

struct Resources<G: GpuContext> {
    program: G::Program,
    positions: G::Buffer,
    tex_coords: G::Buffer,
    texture: G::Texture,
    bindings: Bindings<G::Location>,
}

pub struct Renderer<G: GpuContext> {
    gl: G,
    resources: Option<Resources<G>>,
    filter: FilterMode,
    viewport: Size,
}

impl<G: GpuContext> Renderer<G> {
    /// Compile, link and allocate everything the pass needs.
    ///
    /// On failure every resource acquired so far is released before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`GpuError`] hit: a shader compile error (with its
    /// stage and info log), a link error, a missing binding, or a failed
    /// allocation.
    pub fn initialize(gl: G, filter: FilterMode, viewport: Size) -> Result<Self, GpuError> {
        let resources = acquire(&gl, filter)?;
        log::debug!("magnifier renderer initialized ({}x{})", viewport.width, viewport.height);
        Ok(Self { gl, resources: Some(resources), filter, viewport })
    }

    /// Whether GPU resources are held and draws are allowed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.resources.is_some()
    }

    #[cfg(test)]
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[cfg(test)]
    pub fn context(&self) -> &G {
        &self.gl
    }

    /// Set the drawing-buffer size the quad covers.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Switch the texture filter. No-op when `mode` is already current.
    ///
    /// Returns `true` if the filter changed.
    pub fn update_filter_mode(&mut self, mode: FilterMode) -> bool {
        if self.filter == mode {
            return false;
        }
        self.filter = mode;
        if let Some(res) = &self.resources {
            self.gl.set_texture_filter(&res.texture, mode);
        }
        true
    }

    /// Upload `source` and draw the `sample` region of it across the viewport.
    ///
    /// An upload failure skips the frame: nothing is drawn, and the next call
    /// retries from scratch.
    ///
    /// # Errors
    ///
    /// [`RenderError::Disposed`] after [`Renderer::dispose`],
    /// [`RenderError::EmptySource`] for a zero-size source, or
    /// [`RenderError::Gpu`] when the upload or draw fails.
    pub fn render(&mut self, source: &G::Source, source_size: Size, sample: &Rect) -> Result<(), RenderError> {
        let Some(res) = &self.resources else {
            return Err(RenderError::Disposed);
        };
        let window = TexWindow::from_sample(sample, source_size).ok_or(RenderError::EmptySource)?;

        if let Err(e) = self.gl.upload_texture(&res.texture, source) {
            log::warn!("skipping magnifier frame: {e}");
            return Err(e.into());
        }

        self.gl.draw(&DrawCall {
            program: &res.program,
            positions: &res.positions,
            tex_coords: &res.tex_coords,
            texture: &res.texture,
            bindings: &res.bindings,
            window,
            viewport: self.viewport,
        })?;
        Ok(())
    }

    /// Release all GPU resources. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if let Some(res) = self.resources.take() {
            self.gl.delete_texture(res.texture);
            self.gl.delete_buffer(res.tex_coords);
            self.gl.delete_buffer(res.positions);
            self.gl.delete_program(res.program);
            log::debug!("magnifier renderer disposed");
        }
    }
}

impl<G: GpuContext> Drop for Renderer<G> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn acquire<G: GpuContext>(gl: &G, filter: FilterMode) -> Result<Resources<G>, GpuError> {
    let program = build_program(gl)?;

    let bindings = match gl.bindings(&program) {
        Ok(bindings) => bindings,
        Err(e) => {
            gl.delete_program(program);
            return Err(e);
        }
    };
    let positions = match gl.create_buffer(&QUAD_POSITIONS) {
        Ok(buffer) => buffer,
        Err(e) => {
            gl.delete_program(program);
            return Err(e);
        }
    };
    let tex_coords = match gl.create_buffer(&QUAD_TEX_COORDS) {
        Ok(buffer) => buffer,
        Err(e) => {
            gl.delete_buffer(positions);
            gl.delete_program(program);
            return Err(e);
        }
    };
    let texture = match gl.create_texture(filter) {
        Ok(texture) => texture,
        Err(e) => {
            gl.delete_buffer(tex_coords);
            gl.delete_buffer(positions);
            gl.delete_program(program);
            return Err(e);
        }
    };

    Ok(Resources { program, positions, tex_coords, texture, bindings })
}

fn build_program<G: GpuContext>(gl: &G) -> Result<G::Program, GpuError> {
    let vertex = gl.compile_shader(ShaderStage::Vertex, VERTEX_SHADER)?;
    let fragment = match gl.compile_shader(ShaderStage::Fragment, FRAGMENT_SHADER) {
        Ok(shader) => shader,
        Err(e) => {
            gl.delete_shader(vertex);
            return Err(e);
        }
    };
    let linked = gl.link_program(&vertex, &fragment);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);
    linked
}
