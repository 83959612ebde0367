use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer,
    WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

/// Offscreen color target, with depth when the pass draws solid geometry
pub struct RenderTarget {
    pub texture: WebGlTexture,
    framebuffer: WebGlFramebuffer,
    _depth: Option<WebGlRenderbuffer>,
    pub width: i32,
    pub height: i32,
}

/// Blend and depth state for one kind of draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// Depth tested and written, no blending
    Opaque,
    /// Depth tested but not written, `src * alpha + dst`
    Additive,
    /// Fullscreen post pass, no depth, no blending
    Fullscreen,
}

/// Thin layer over the WebGL2 context for the point, instanced and post passes
pub struct WebGLContext {
    pub gl: Gl,
}

impl WebGLContext {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    fn compile(&self, kind: u32, stage: &str, source: &str) -> Result<WebGlShader, String> {
        let shader = self.gl.create_shader(kind).ok_or("Failed to create shader")?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);

        let ok = self.gl
            .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if ok {
            return Ok(shader);
        }
        let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
        self.gl.delete_shader(Some(&shader));
        Err(format!("{} shader failed to compile: {}", stage, log))
    }

    /// Compile and link a vertex/fragment pair
    pub fn program(&self, vert_src: &str, frag_src: &str) -> Result<WebGlProgram, String> {
        let vert = self.compile(Gl::VERTEX_SHADER, "vertex", vert_src)?;
        let frag = self.compile(Gl::FRAGMENT_SHADER, "fragment", frag_src)?;
        let program = self.gl.create_program().ok_or("Failed to create program")?;

        self.gl.attach_shader(&program, &vert);
        self.gl.attach_shader(&program, &frag);
        self.gl.link_program(&program);
        self.gl.delete_shader(Some(&vert));
        self.gl.delete_shader(Some(&frag));

        let ok = self.gl
            .get_program_parameter(&program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if ok {
            return Ok(program);
        }
        let log = self.gl.get_program_info_log(&program).unwrap_or_default();
        self.gl.delete_program(Some(&program));
        Err(format!("Program linking failed: {}", log))
    }

    pub fn uniform(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    /// ARRAY_BUFFER filled with `data`, left bound for attribute setup
    pub fn array_buffer(&self, data: &[f32], usage: u32) -> Result<WebGlBuffer, String> {
        let buffer = self.gl.create_buffer().ok_or("Failed to create buffer")?;
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        // Safety: the view is consumed by buffer_data before any allocation
        unsafe {
            let view = js_sys::Float32Array::view(data);
            self.gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &view, usage);
        }
        Ok(buffer)
    }

    /// ELEMENT_ARRAY_BUFFER of u32 indices, left bound to the current VAO
    pub fn element_buffer(&self, indices: &[u32]) -> Result<WebGlBuffer, String> {
        let buffer = self.gl.create_buffer().ok_or("Failed to create index buffer")?;
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&buffer));
        unsafe {
            let view = js_sys::Uint32Array::view(indices);
            self.gl.buffer_data_with_array_buffer_view(Gl::ELEMENT_ARRAY_BUFFER, &view, Gl::STATIC_DRAW);
        }
        Ok(buffer)
    }

    /// Overwrite a buffer from offset 0; `data` must fit its allocation
    pub fn write_array_buffer(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
        unsafe {
            let view = js_sys::Float32Array::view(data);
            self.gl.buffer_sub_data_with_i32_and_array_buffer_view(Gl::ARRAY_BUFFER, 0, &view);
        }
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, None);
    }

    /// New VAO, bound
    pub fn vertex_array(&self) -> Result<WebGlVertexArrayObject, String> {
        let vao = self.gl.create_vertex_array().ok_or("Failed to create VAO")?;
        self.gl.bind_vertex_array(Some(&vao));
        Ok(vao)
    }

    /// Point a float attribute at the bound ARRAY_BUFFER
    ///
    /// `stride` and `offset` are in floats. A non-zero `divisor` makes the
    /// attribute advance per instance instead of per vertex.
    pub fn float_attribute(&self, location: u32, size: i32, stride: i32, offset: i32, divisor: u32) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl.vertex_attrib_pointer_with_i32(location, size, Gl::FLOAT, false, stride * 4, offset * 4);
        if divisor > 0 {
            self.gl.vertex_attrib_divisor(location, divisor);
        }
    }

    /// RGBA8 color target, linear filtered and edge clamped
    pub fn render_target(&self, width: i32, height: i32, with_depth: bool) -> Result<RenderTarget, String> {
        let gl = &self.gl;
        let (width, height) = (width.max(1), height.max(1));

        let texture = gl.create_texture().ok_or("Failed to create texture")?;
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            Gl::TEXTURE_2D, 0, Gl::RGBA as i32, width, height, 0, Gl::RGBA, Gl::UNSIGNED_BYTE, None,
        )
        .map_err(|e| format!("Failed to allocate texture: {:?}", e))?;
        for (param, value) in [
            (Gl::TEXTURE_MIN_FILTER, Gl::LINEAR),
            (Gl::TEXTURE_MAG_FILTER, Gl::LINEAR),
            (Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE),
            (Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE),
        ] {
            gl.tex_parameteri(Gl::TEXTURE_2D, param, value as i32);
        }
        gl.bind_texture(Gl::TEXTURE_2D, None);

        let framebuffer = gl.create_framebuffer().ok_or("Failed to create framebuffer")?;
        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&framebuffer));
        gl.framebuffer_texture_2d(Gl::FRAMEBUFFER, Gl::COLOR_ATTACHMENT0, Gl::TEXTURE_2D, Some(&texture), 0);

        let depth = if with_depth {
            let rbo = gl.create_renderbuffer().ok_or("Failed to create renderbuffer")?;
            gl.bind_renderbuffer(Gl::RENDERBUFFER, Some(&rbo));
            gl.renderbuffer_storage(Gl::RENDERBUFFER, Gl::DEPTH_COMPONENT24, width, height);
            gl.framebuffer_renderbuffer(Gl::FRAMEBUFFER, Gl::DEPTH_ATTACHMENT, Gl::RENDERBUFFER, Some(&rbo));
            gl.bind_renderbuffer(Gl::RENDERBUFFER, None);
            Some(rbo)
        } else {
            None
        };

        let status = gl.check_framebuffer_status(Gl::FRAMEBUFFER);
        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        if status != Gl::FRAMEBUFFER_COMPLETE {
            return Err(format!("Framebuffer incomplete: {}", status));
        }

        Ok(RenderTarget {
            texture,
            framebuffer,
            _depth: depth,
            width,
            height,
        })
    }

    /// Draw into `target`, or the canvas at `canvas_size` when `None`
    pub fn bind_target(&self, target: Option<&RenderTarget>, canvas_size: (i32, i32)) {
        let (width, height) = target.map_or(canvas_size, |t| (t.width, t.height));
        self.gl.bind_framebuffer(Gl::FRAMEBUFFER, target.map(|t| &t.framebuffer));
        self.gl.viewport(0, 0, width, height);
    }

    pub fn clear(&self, rgb: [f32; 3]) {
        self.gl.depth_mask(true);
        self.gl.clear_color(rgb[0], rgb[1], rgb[2], 1.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    pub fn set_pass(&self, pass: PassState) {
        let gl = &self.gl;
        match pass {
            PassState::Opaque => {
                gl.enable(Gl::DEPTH_TEST);
                gl.depth_mask(true);
                gl.disable(Gl::BLEND);
            }
            PassState::Additive => {
                gl.enable(Gl::DEPTH_TEST);
                gl.depth_mask(false);
                gl.enable(Gl::BLEND);
                gl.blend_func(Gl::SRC_ALPHA, Gl::ONE);
            }
            PassState::Fullscreen => {
                gl.disable(Gl::DEPTH_TEST);
                gl.depth_mask(true);
                gl.disable(Gl::BLEND);
            }
        }
    }

    /// Bind `texture` to `unit` and point the sampler uniform at it
    pub fn set_sampler(&self, location: &Option<WebGlUniformLocation>, unit: u32, texture: &WebGlTexture) {
        self.gl.active_texture(Gl::TEXTURE0 + unit);
        self.gl.bind_texture(Gl::TEXTURE_2D, Some(texture));
        self.gl.uniform1i(location.as_ref(), unit as i32);
    }

    pub fn set_f32(&self, location: &Option<WebGlUniformLocation>, value: f32) {
        self.gl.uniform1f(location.as_ref(), value);
    }

    pub fn set_vec2(&self, location: &Option<WebGlUniformLocation>, value: [f32; 2]) {
        self.gl.uniform2f(location.as_ref(), value[0], value[1]);
    }

    /// vec3 or vec3[] uniform from packed floats
    pub fn set_vec3(&self, location: &Option<WebGlUniformLocation>, data: &[f32]) {
        self.gl.uniform3fv_with_f32_array(location.as_ref(), data);
    }

    pub fn set_mat4(&self, location: &Option<WebGlUniformLocation>, data: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(location.as_ref(), false, data);
    }

    /// Fullscreen triangle generated from gl_VertexID
    pub fn draw_fullscreen(&self) {
        self.gl.draw_arrays(Gl::TRIANGLES, 0, 3);
    }
}
