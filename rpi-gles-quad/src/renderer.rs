//! Shader-program renderer: compiles the embedded shader pair once and
//! rasterizes a single flat-colored quad as a triangle fan.

use tracing::{debug, info, warn};

use crate::display::DisplayContext;
use crate::driver::{
    EglApi, GlApi, GL_ARRAY_BUFFER, GL_COLOR_BUFFER_BIT, GL_DEPTH_BUFFER_BIT, GL_FLOAT,
    GL_FRAGMENT_SHADER, GL_NO_ERROR, GL_STATIC_DRAW, GL_TRIANGLE_FAN, GL_VERTEX_SHADER,
};

/// Unit quad, 4 vertices of 4 floats (x, y, z, w), fanned from the first
/// vertex. The vertex shader scales x/y down by 0.3.
pub const QUAD_VERTICES: [f32; 16] = [
    0.0, 0.0, 0.5, 1.0, //
    1.0, 0.0, 0.5, 1.0, //
    1.0, 1.0, 0.5, 1.0, //
    0.0, 1.0, 0.5, 1.0, //
];

pub const VERTEX_SHADER_SRC: &str = "\
attribute vec4 vertex;
void main(void) {
  vec4 pos = vertex;
  pos.xy *= 0.3;
  gl_Position = pos;
}
";

pub const FRAGMENT_SHADER_SRC: &str = "\
uniform vec4 color;
void main(void) {
  gl_FragColor = color;
}
";

/// Flat fill color sent through the `color` uniform on every draw.
pub const QUAD_COLOR: [f32; 4] = [0.5, 0.5, 0.8, 1.0];

/// Clear color set once at construction (cyan).
const CLEAR_COLOR: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

/// Component count, stride and offset of the interleaved vertex stream.
const VERTEX_COMPONENTS: i32 = 4;
const VERTEX_STRIDE: i32 = 16;

/// A linked shader program plus the one buffer object the quad is drawn
/// from. All GPU objects live until process exit; nothing is deleted.
pub struct QuadRenderer {
    program: u32,
    color_uniform: i32,
    vertex_attrib: i32,
    buffer: u32,
}

impl QuadRenderer {
    /// Build the renderer from the embedded shader sources. The context must
    /// already be current.
    pub fn new<G: GlApi>(gl: &G) -> Self {
        Self::with_sources(gl, VERTEX_SHADER_SRC, FRAGMENT_SHADER_SRC)
    }

    /// Build the renderer from caller-supplied GLSL ES sources.
    ///
    /// Compile and link status flags are deliberately never inspected: the
    /// driver's info logs are fetched and logged as the diagnostic channel,
    /// and a broken shader surfaces only through [`report_gl_error`] after a
    /// draw. Construction therefore cannot fail.
    pub fn with_sources<G: GlApi>(gl: &G, vertex_src: &str, fragment_src: &str) -> Self {
        let vshader = compile_shader(gl, GL_VERTEX_SHADER, vertex_src);
        let fshader = compile_shader(gl, GL_FRAGMENT_SHADER, fragment_src);

        let program = gl.create_program();
        gl.attach_shader(program, vshader);
        gl.attach_shader(program, fshader);
        gl.link_program(program);
        let log = gl.program_info_log(program);
        if log.is_empty() {
            debug!(program, "program linked");
        } else {
            info!(program, "link log: {log}");
        }

        // Name lookups against the linked program. A -1 (not found) result
        // is passed through to the driver as-is on draw.
        let color_uniform = gl.uniform_location(program, "color");
        let vertex_attrib = gl.attrib_location(program, "vertex");
        debug!(color_uniform, vertex_attrib, "resolved shader locations");

        gl.clear_color(CLEAR_COLOR[0], CLEAR_COLOR[1], CLEAR_COLOR[2], CLEAR_COLOR[3]);

        let buffer = gl.gen_buffer();

        Self {
            program,
            color_uniform,
            vertex_attrib,
            buffer,
        }
    }

    /// Draw the quad and present it.
    ///
    /// Each call fully re-specifies state — viewport, program, buffer
    /// contents, attribute layout, clear, uniform — so repeated calls are
    /// idempotent given an unchanged context.
    pub fn draw<G: GlApi, E: EglApi>(&self, gl: &G, egl: &E, ctx: &DisplayContext) {
        gl.viewport(0, 0, ctx.width as i32, ctx.height as i32);
        gl.use_program(self.program);

        gl.bind_buffer(GL_ARRAY_BUFFER, self.buffer);
        gl.buffer_data(GL_ARRAY_BUFFER, &QUAD_VERTICES, GL_STATIC_DRAW);
        gl.vertex_attrib_pointer(
            self.vertex_attrib,
            VERTEX_COMPONENTS,
            GL_FLOAT,
            false,
            VERTEX_STRIDE,
            0,
        );
        gl.enable_vertex_attrib_array(self.vertex_attrib);

        gl.clear(GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT);
        gl.uniform4f(
            self.color_uniform,
            QUAD_COLOR[0],
            QUAD_COLOR[1],
            QUAD_COLOR[2],
            QUAD_COLOR[3],
        );
        gl.draw_arrays(GL_TRIANGLE_FAN, 0, 4);
        gl.bind_buffer(GL_ARRAY_BUFFER, 0);

        egl.swap_buffers(ctx.display, ctx.surface);
    }
}

fn compile_shader<G: GlApi>(gl: &G, kind: u32, source: &str) -> u32 {
    let shader = gl.create_shader(kind);
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    // The info log is always fetched, success or not; the compile status
    // flag is never read.
    let log = gl.shader_info_log(shader);
    if log.is_empty() {
        debug!(shader, kind, "shader compiled");
    } else {
        info!(shader, kind, "compile log: {log}");
    }
    shader
}

/// Fetch and log the oldest pending GL error, returning the raw code
/// (`GL_NO_ERROR` when the pipeline is clean). The demo binary calls this
/// once after its draw as the final health report.
pub fn report_gl_error<G: GlApi>(gl: &G) -> u32 {
    let code = gl.get_error();
    if code == GL_NO_ERROR {
        info!("no pending GL error");
    } else {
        warn!("pending GL error {code:#06x}");
    }
    code
}
