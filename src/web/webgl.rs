//! WebGL2 backend for [`GpuContext`].

use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlUniformLocation,
};

use crate::config::FilterMode;
use crate::gpu::{Bindings, DrawCall, GpuContext, GpuError, ShaderStage};

/// Acquire a WebGL2 context on the glass canvas.
///
/// # Errors
///
/// [`GpuError::NoContext`] when the browser refuses WebGL2.
pub fn context(canvas: &HtmlCanvasElement) -> Result<Gl, GpuError> {
    match canvas.get_context("webgl2") {
        Ok(Some(ctx)) => ctx.dyn_into::<Gl>().map_err(|_| GpuError::NoContext),
        Ok(None) => Err(GpuError::NoContext),
        Err(e) => {
            log::debug!("getContext(webgl2) threw: {e:?}");
            Err(GpuError::NoContext)
        }
    }
}

fn filter_param(filter: FilterMode) -> i32 {
    match filter {
        FilterMode::Linear => Gl::LINEAR as i32,
        FilterMode::Nearest => Gl::NEAREST as i32,
    }
}

fn attrib(gl: &Gl, program: &WebGlProgram, name: &'static str) -> Result<u32, GpuError> {
    u32::try_from(gl.get_attrib_location(program, name)).map_err(|_| GpuError::MissingAttribute(name))
}

fn uniform(gl: &Gl, program: &WebGlProgram, name: &'static str) -> Result<WebGlUniformLocation, GpuError> {
    gl.get_uniform_location(program, name).ok_or(GpuError::MissingAttribute(name))
}

impl GpuContext for Gl {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;
    type Location = WebGlUniformLocation;
    type Source = HtmlCanvasElement;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<WebGlShader, GpuError> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        let shader = self.create_shader(kind).ok_or(GpuError::ResourceCreation("shader"))?;
        self.shader_source(&shader, source);
        Gl::compile_shader(self, &shader);

        if self.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool().unwrap_or(false) {
            return Ok(shader);
        }
        let log = self.get_shader_info_log(&shader).unwrap_or_default();
        self.delete_shader(Some(&shader));
        Err(GpuError::ShaderCompile { stage, log })
    }

    fn link_program(&self, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, GpuError> {
        let program = self.create_program().ok_or(GpuError::ResourceCreation("program"))?;
        self.attach_shader(&program, vertex);
        self.attach_shader(&program, fragment);
        Gl::link_program(self, &program);

        if self.get_program_parameter(&program, Gl::LINK_STATUS).as_bool().unwrap_or(false) {
            return Ok(program);
        }
        let log = self.get_program_info_log(&program).unwrap_or_default();
        self.delete_program(Some(&program));
        Err(GpuError::ProgramLink { log })
    }

    fn bindings(&self, program: &WebGlProgram) -> Result<Bindings<WebGlUniformLocation>, GpuError> {
        Ok(Bindings {
            position: attrib(self, program, "a_position")?,
            tex_coord: attrib(self, program, "a_tex_coord")?,
            texture: uniform(self, program, "u_texture")?,
            offset: uniform(self, program, "u_offset")?,
            repeat: uniform(self, program, "u_repeat")?,
        })
    }

    fn create_buffer(&self, data: &[f32]) -> Result<WebGlBuffer, GpuError> {
        let buffer = Gl::create_buffer(self).ok_or(GpuError::ResourceCreation("buffer"))?;
        self.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        let array = js_sys::Float32Array::from(data);
        self.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);
        self.bind_buffer(Gl::ARRAY_BUFFER, None);
        Ok(buffer)
    }

    fn create_texture(&self, filter: FilterMode) -> Result<WebGlTexture, GpuError> {
        let texture = Gl::create_texture(self).ok_or(GpuError::ResourceCreation("texture"))?;
        self.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        self.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE as i32);
        self.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        self.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, filter_param(filter));
        self.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, filter_param(filter));
        self.bind_texture(Gl::TEXTURE_2D, None);
        Ok(texture)
    }

    fn set_texture_filter(&self, texture: &WebGlTexture, filter: FilterMode) {
        self.bind_texture(Gl::TEXTURE_2D, Some(texture));
        self.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, filter_param(filter));
        self.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, filter_param(filter));
        self.bind_texture(Gl::TEXTURE_2D, None);
    }

    fn upload_texture(&self, texture: &WebGlTexture, source: &HtmlCanvasElement) -> Result<(), GpuError> {
        self.bind_texture(Gl::TEXTURE_2D, Some(texture));
        let uploaded = self.tex_image_2d_with_u32_and_u32_and_html_canvas_element(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA as i32,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            source,
        );
        self.bind_texture(Gl::TEXTURE_2D, None);
        uploaded.map_err(|e| GpuError::TextureUpload(format!("{e:?}")))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw(&self, call: &DrawCall<'_, WebGlProgram, WebGlBuffer, WebGlTexture, WebGlUniformLocation>) -> Result<(), GpuError> {
        let b = call.bindings;
        self.viewport(0, 0, call.viewport.width.round() as i32, call.viewport.height.round() as i32);
        self.clear_color(0.0, 0.0, 0.0, 0.0);
        self.clear(Gl::COLOR_BUFFER_BIT);
        self.use_program(Some(call.program));

        self.bind_buffer(Gl::ARRAY_BUFFER, Some(call.positions));
        self.enable_vertex_attrib_array(b.position);
        self.vertex_attrib_pointer_with_i32(b.position, 2, Gl::FLOAT, false, 0, 0);
        self.bind_buffer(Gl::ARRAY_BUFFER, Some(call.tex_coords));
        self.enable_vertex_attrib_array(b.tex_coord);
        self.vertex_attrib_pointer_with_i32(b.tex_coord, 2, Gl::FLOAT, false, 0, 0);

        self.active_texture(Gl::TEXTURE0);
        self.bind_texture(Gl::TEXTURE_2D, Some(call.texture));
        self.uniform1i(Some(&b.texture), 0);
        self.uniform2f(Some(&b.offset), call.window.offset[0], call.window.offset[1]);
        self.uniform2f(Some(&b.repeat), call.window.repeat[0], call.window.repeat[1]);

        self.draw_arrays(Gl::TRIANGLE_STRIP, 0, 4);

        self.bind_texture(Gl::TEXTURE_2D, None);
        self.bind_buffer(Gl::ARRAY_BUFFER, None);

        match self.get_error() {
            Gl::NO_ERROR => Ok(()),
            code => Err(GpuError::Draw(format!("GL error 0x{code:04x}"))),
        }
    }

    fn delete_shader(&self, shader: WebGlShader) {
        Gl::delete_shader(self, Some(&shader));
    }

    fn delete_program(&self, program: WebGlProgram) {
        Gl::delete_program(self, Some(&program));
    }

    fn delete_buffer(&self, buffer: WebGlBuffer) {
        Gl::delete_buffer(self, Some(&buffer));
    }

    fn delete_texture(&self, texture: WebGlTexture) {
        Gl::delete_texture(self, Some(&texture));
    }
}
