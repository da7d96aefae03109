use wasm_bindgen::prelude::*;
use web_sys::{WebGlRenderingContext, WebGlProgram, WebGlBuffer, WebGlUniformLocation, HtmlCanvasElement};
use nalgebra::{Matrix4, Vector3};
use crate::engine::mesh::{Mesh, VERTEX_STRIDE};
use wasm_bindgen::JsCast;

const VERTEX_SHADER: &str = r#"
    attribute vec3 aPosition;
    attribute vec3 aColor;
    uniform mat4 uModelViewProjection;
    varying vec3 vColor;
    varying vec3 vPos;
    void main() {
        gl_Position = uModelViewProjection * vec4(aPosition, 1.0);
        vPos = aPosition;
        vColor = aColor;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision mediump float;
    varying vec3 vColor;
    varying vec3 vPos;
    uniform vec3 uUniformColor;
    uniform bool uUseUniformColor;
    uniform float uAlpha;

    void main() {
        vec3 color;
        if (uUseUniformColor) {
            color = uUniformColor;
        } else {
            color = vColor;
        }

        // Darken toward the base of each model
        float ao = smoothstep(-0.5, 0.5, vPos.y + 0.5);
        ao = mix(0.75, 1.0, ao);
        color *= ao;

        gl_FragColor = vec4(color, uAlpha);
    }
"#;

/// Mesh data already uploaded to the GPU.
pub struct GpuMesh {
    vertex_buffer: WebGlBuffer,
    index_buffer: WebGlBuffer,
    index_count: i32,
}

pub struct Renderer {
    pub gl: WebGlRenderingContext,
    program: WebGlProgram,
    mvp_location: WebGlUniformLocation,
    u_uniform_color_location: WebGlUniformLocation,
    u_use_uniform_color_location: WebGlUniformLocation,
    u_alpha_location: WebGlUniformLocation,
    unit_cube: GpuMesh,
}

impl Renderer {
    pub fn new(gl: WebGlRenderingContext) -> Result<Self, JsValue> {
        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let mvp_location = gl.get_uniform_location(&program, "uModelViewProjection")
            .ok_or("Failed to get uniform location")?;
        let u_uniform_color_location = gl.get_uniform_location(&program, "uUniformColor")
            .ok_or("Failed to get uUniformColor location")?;
        let u_use_uniform_color_location = gl.get_uniform_location(&program, "uUseUniformColor")
            .ok_or("Failed to get uUseUniformColor location")?;
        let u_alpha_location = gl.get_uniform_location(&program, "uAlpha")
            .ok_or("Failed to get uAlpha location")?;

        let unit_cube = upload(&gl, &Mesh::cube(1.0, 1.0, 1.0, 1.0))?;

        gl.uniform1f(Some(&u_alpha_location), 1.0);

        Ok(Renderer {
            gl,
            program,
            mvp_location,
            u_uniform_color_location,
            u_use_uniform_color_location,
            u_alpha_location,
            unit_cube,
        })
    }

    pub fn upload_mesh(&self, mesh: &Mesh) -> Result<GpuMesh, JsValue> {
        upload(&self.gl, mesh)
    }

    pub fn clear(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT);
    }

    pub fn enable_depth_test(&self) {
        self.gl.enable(WebGlRenderingContext::DEPTH_TEST);
    }

    /// Additive blending without depth writes, for dust.
    pub fn begin_particles(&self) {
        self.gl.enable(WebGlRenderingContext::BLEND);
        self.gl.blend_func(WebGlRenderingContext::SRC_ALPHA, WebGlRenderingContext::ONE);
        self.gl.depth_mask(false);
    }

    pub fn end_particles(&self) {
        self.gl.depth_mask(true);
        self.gl.disable(WebGlRenderingContext::BLEND);
        self.gl.uniform1f(Some(&self.u_alpha_location), 1.0);
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    pub fn canvas(&self) -> Option<HtmlCanvasElement> {
        self.gl.canvas()?.dyn_into::<HtmlCanvasElement>().ok()
    }

    fn bind(&self, mesh: &GpuMesh) {
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&mesh.vertex_buffer));
        self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&mesh.index_buffer));

        let stride = (VERTEX_STRIDE * 4) as i32;
        let pos_loc = self.gl.get_attrib_location(&self.program, "aPosition") as u32;
        let col_loc = self.gl.get_attrib_location(&self.program, "aColor") as u32;

        self.gl.vertex_attrib_pointer_with_i32(pos_loc, 3, WebGlRenderingContext::FLOAT, false, stride, 0);
        self.gl.enable_vertex_attrib_array(pos_loc);

        self.gl.vertex_attrib_pointer_with_i32(col_loc, 3, WebGlRenderingContext::FLOAT, false, stride, 12);
        self.gl.enable_vertex_attrib_array(col_loc);
    }

    fn set_mvp(&self, model: &Matrix4<f32>, projection: &Matrix4<f32>, view: &Matrix4<f32>) {
        let mvp = projection * view * model;
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.mvp_location), false, mvp.as_slice());
    }

    fn draw_elements(&self, index_count: i32) {
        self.gl.draw_elements_with_i32(
            WebGlRenderingContext::TRIANGLES,
            index_count,
            WebGlRenderingContext::UNSIGNED_SHORT,
            0
        );
    }

    /// Draws a mesh with its own vertex colours.
    pub fn draw_mesh(&self, mesh: &GpuMesh, model: &Matrix4<f32>, projection: &Matrix4<f32>, view: &Matrix4<f32>) {
        self.bind(mesh);
        self.gl.uniform1i(Some(&self.u_use_uniform_color_location), 0);
        self.set_mvp(model, projection, view);
        self.draw_elements(mesh.index_count);
    }

    /// Draws a flat-coloured cube of edge `size` centred at `position`.
    pub fn draw_cube(&self, position: &Vector3<f32>, size: f32, color: (f32, f32, f32), alpha: f32, projection: &Matrix4<f32>, view: &Matrix4<f32>) {
        self.bind(&self.unit_cube);
        self.gl.uniform1i(Some(&self.u_use_uniform_color_location), 1);
        self.gl.uniform3f(Some(&self.u_uniform_color_location), color.0, color.1, color.2);
        self.gl.uniform1f(Some(&self.u_alpha_location), alpha);

        let model = Matrix4::new_translation(position) * Matrix4::new_scaling(size);
        self.set_mvp(&model, projection, view);
        self.draw_elements(self.unit_cube.index_count);
    }
}

fn upload(gl: &WebGlRenderingContext, mesh: &Mesh) -> Result<GpuMesh, JsValue> {
    let vertex_buffer = gl.create_buffer().ok_or("Failed to create vertex buffer")?;
    let index_buffer = gl.create_buffer().ok_or("Failed to create index buffer")?;

    gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));
    unsafe {
        let vert_array = js_sys::Float32Array::view(&mesh.vertices);
        gl.buffer_data_with_array_buffer_view(
            WebGlRenderingContext::ARRAY_BUFFER,
            &vert_array,
            WebGlRenderingContext::STATIC_DRAW
        );
    }

    gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
    unsafe {
        let idx_array = js_sys::Uint16Array::view(&mesh.indices);
        gl.buffer_data_with_array_buffer_view(
            WebGlRenderingContext::ELEMENT_ARRAY_BUFFER,
            &idx_array,
            WebGlRenderingContext::STATIC_DRAW
        );
    }

    Ok(GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as i32,
    })
}

fn create_program(gl: &WebGlRenderingContext) -> Result<WebGlProgram, JsValue> {
    let vert_shader = compile_shader(gl, WebGlRenderingContext::VERTEX_SHADER, VERTEX_SHADER)?;
    let frag_shader = compile_shader(gl, WebGlRenderingContext::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or("Unable to create program")?;
    gl.attach_shader(&program, &vert_shader);
    gl.attach_shader(&program, &frag_shader);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS).as_bool().unwrap_or(false) {
        Ok(program)
    } else {
        Err(JsValue::from_str(&gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

fn compile_shader(gl: &WebGlRenderingContext, shader_type: u32, source: &str) -> Result<web_sys::WebGlShader, JsValue> {
    let shader = gl.create_shader(shader_type).ok_or("Unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        Err(JsValue::from_str(&gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}
