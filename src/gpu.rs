//! Abstract GPU context consumed by [`crate::render::Renderer`].
//!
//! The trait covers exactly the calls the texture-sampling pass needs. The
//! browser build implements it for `WebGl2RenderingContext`; tests implement it
//! with a recording mock. Handles are associated types so each backend keeps
//! its native object types.

use crate::config::FilterMode;
use crate::geometry::{Size, TexWindow};

/// Shader pipeline stage, used in compile diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpuError {
    #[error("no WebGL2 context available")]
    NoContext,
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },
    #[error("could not create {0}")]
    ResourceCreation(&'static str),
    #[error("shader attribute or uniform not found: {0}")]
    MissingAttribute(&'static str),
    #[error("texture upload failed: {0}")]
    TextureUpload(String),
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Locations of the attributes and uniforms the pass binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings<L> {
    pub position: u32,
    pub tex_coord: u32,
    pub texture: L,
    pub offset: L,
    pub repeat: L,
}

/// Everything a single draw of the quad needs.
pub struct DrawCall<'a, P, B, T, L> {
    pub program: &'a P,
    pub positions: &'a B,
    pub tex_coords: &'a B,
    pub texture: &'a T,
    pub bindings: &'a Bindings<L>,
    pub window: TexWindow,
    pub viewport: Size,
}

/// The GPU operations behind the texture-sampling pass.
pub trait GpuContext {
    type Shader;
    type Program;
    type Buffer;
    type Texture;
    type Location;
    /// Pixel source the texture is uploaded from (the host canvas in the browser).
    type Source: ?Sized;

    /// # Errors
    ///
    /// [`GpuError::ShaderCompile`] carrying the driver's info log.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, GpuError>;

    /// # Errors
    ///
    /// [`GpuError::ProgramLink`] carrying the driver's info log.
    fn link_program(&self, vertex: &Self::Shader, fragment: &Self::Shader) -> Result<Self::Program, GpuError>;

    /// # Errors
    ///
    /// [`GpuError::MissingAttribute`] when a required name is not active in the program.
    fn bindings(&self, program: &Self::Program) -> Result<Bindings<Self::Location>, GpuError>;

    /// Create a static vertex buffer holding `data`.
    ///
    /// # Errors
    ///
    /// [`GpuError::ResourceCreation`] when the buffer cannot be allocated.
    fn create_buffer(&self, data: &[f32]) -> Result<Self::Buffer, GpuError>;

    /// Create an empty clamped 2D texture with the given filter.
    ///
    /// # Errors
    ///
    /// [`GpuError::ResourceCreation`] when the texture cannot be allocated.
    fn create_texture(&self, filter: FilterMode) -> Result<Self::Texture, GpuError>;

    fn set_texture_filter(&self, texture: &Self::Texture, filter: FilterMode);

    /// Replace the texture's contents with the source's current pixels.
    ///
    /// # Errors
    ///
    /// [`GpuError::TextureUpload`] when the source cannot be read.
    fn upload_texture(&self, texture: &Self::Texture, source: &Self::Source) -> Result<(), GpuError>;

    /// Draw the quad as a four-vertex triangle strip.
    ///
    /// # Errors
    ///
    /// [`GpuError::Draw`] when the backend reports a failure.
    fn draw(
        &self,
        call: &DrawCall<'_, Self::Program, Self::Buffer, Self::Texture, Self::Location>,
    ) -> Result<(), GpuError>;

    fn delete_shader(&self, shader: Self::Shader);
    fn delete_program(&self, program: Self::Program);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn delete_texture(&self, texture: Self::Texture);
}
