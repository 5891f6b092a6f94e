//! Seams over the three native libraries the demo drives.
//!
//! The bring-up and draw paths talk to the Broadcom host library, EGL and
//! OpenGL ES exclusively through these traits, so the same code runs against
//! the real bindings in [`crate::ffi`] and against a recording driver in the
//! integration tests. Handles are plain `Copy` newtypes over the native
//! integer/pointer values; the crate owns no driver memory.

// EGL attribute and token values from <EGL/egl.h>.
pub const EGL_ALPHA_SIZE: i32 = 0x3021;
pub const EGL_BLUE_SIZE: i32 = 0x3022;
pub const EGL_GREEN_SIZE: i32 = 0x3023;
pub const EGL_RED_SIZE: i32 = 0x3024;
pub const EGL_SURFACE_TYPE: i32 = 0x3033;
pub const EGL_NONE: i32 = 0x3038;
pub const EGL_WINDOW_BIT: i32 = 0x0004;
pub const EGL_CONTEXT_CLIENT_VERSION: i32 = 0x3098;
pub const EGL_OPENGL_ES_API: u32 = 0x30A0;

// GLES2 token values from <GLES2/gl2.h>.
pub const GL_TRIANGLE_FAN: u32 = 0x0006;
pub const GL_DEPTH_BUFFER_BIT: u32 = 0x0100;
pub const GL_FLOAT: u32 = 0x1406;
pub const GL_COLOR_BUFFER_BIT: u32 = 0x4000;
pub const GL_ARRAY_BUFFER: u32 = 0x8892;
pub const GL_STATIC_DRAW: u32 = 0x88E4;
pub const GL_FRAGMENT_SHADER: u32 = 0x8B30;
pub const GL_VERTEX_SHADER: u32 = 0x8B31;
pub const GL_NO_ERROR: u32 = 0;

macro_rules! native_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub usize);

        impl $name {
            /// The driver's "no such object" sentinel.
            pub const NONE: Self = Self(0);

            pub fn is_none(self) -> bool {
                self.0 == 0
            }
        }
    };
}

native_handle!(
    /// Connection to the EGL display, obtained once at startup.
    EglDisplay
);
native_handle!(
    /// A pixel-format configuration negotiated with the driver.
    EglConfig
);
native_handle!(
    /// GPU rendering context; must be made current before any GL call.
    EglContext
);
native_handle!(
    /// On-screen drawable tied to the physical framebuffer.
    EglSurface
);
native_handle!(DispmanxDisplay);
native_handle!(DispmanxUpdate);
native_handle!(DispmanxElement);

/// Screen-space rectangle for compositor element placement. Source
/// rectangles use 16.16 fixed-point coordinates, destination rectangles use
/// plain pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// The native-window descriptor EGL expects for a dispmanx-backed surface:
/// the committed compositor element plus the surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWindow {
    pub element: DispmanxElement,
    pub width: i32,
    pub height: i32,
}

/// Entry points consumed from libbcm_host: platform bring-up, display
/// geometry, and the dispmanx compositor transaction used to put a
/// full-screen element on screen.
///
/// Status-returning calls surface the raw native status; mapping a bad
/// status to an error is the caller's job.
pub trait HostApi {
    /// Initialize the VideoCore host subsystem. Zero on success.
    fn host_init(&self) -> i32;

    /// Query the physical pixel dimensions of a display. Returns
    /// `(status, width, height)`; a negative status means the query failed
    /// and the dimensions are meaningless.
    fn graphics_display_size(&self, screen: u16) -> (i32, u32, u32);

    fn dispmanx_display_open(&self, screen: u32) -> DispmanxDisplay;

    fn dispmanx_update_start(&self, priority: i32) -> DispmanxUpdate;

    /// Add an opaque, untransformed, unclipped visual element to an open
    /// update transaction.
    fn dispmanx_element_add(
        &self,
        update: DispmanxUpdate,
        display: DispmanxDisplay,
        layer: i32,
        dst: &Rect,
        src: &Rect,
    ) -> DispmanxElement;

    /// Commit the transaction and block until the compositor has applied
    /// it. Zero on success.
    fn dispmanx_update_submit_sync(&self, update: DispmanxUpdate) -> i32;
}

/// Entry points consumed from libEGL.
pub trait EglApi {
    fn get_default_display(&self) -> EglDisplay;

    fn initialize(&self, display: EglDisplay) -> bool;

    /// Negotiate exactly one configuration matching `attribs` (an
    /// `EGL_NONE`-terminated attribute/value list). `None` when the driver
    /// cannot satisfy the request.
    fn choose_config(&self, display: EglDisplay, attribs: &[i32]) -> Option<EglConfig>;

    fn bind_api(&self, api: u32) -> bool;

    /// Create a context for the given client API version, sharing with no
    /// other context.
    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        client_version: i32,
    ) -> EglContext;

    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: &NativeWindow,
    ) -> EglSurface;

    fn make_current(
        &self,
        display: EglDisplay,
        draw: EglSurface,
        read: EglSurface,
        context: EglContext,
    ) -> bool;

    /// Present the surface's back buffer to the screen.
    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> bool;
}

/// Entry points consumed from libGLESv2. All calls require a current
/// context.
///
/// Locations are the raw `i32` the driver hands back; `-1` (name not found)
/// flows through unchanged.
pub trait GlApi {
    fn create_shader(&self, kind: u32) -> u32;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    /// Fetch the compiler diagnostic log, bounded to 1024 bytes.
    fn shader_info_log(&self, shader: u32) -> String;

    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    /// Fetch the linker diagnostic log, bounded to 1024 bytes.
    fn program_info_log(&self, program: u32) -> String;

    fn uniform_location(&self, program: u32, name: &str) -> i32;
    fn attrib_location(&self, program: u32, name: &str) -> i32;

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn gen_buffer(&self) -> u32;

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn use_program(&self, program: u32);
    fn bind_buffer(&self, target: u32, buffer: u32);
    fn buffer_data(&self, target: u32, data: &[f32], usage: u32);
    fn vertex_attrib_pointer(
        &self,
        location: i32,
        size: i32,
        ty: u32,
        normalized: bool,
        stride: i32,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&self, location: i32);
    fn clear(&self, mask: u32);
    fn uniform4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32);
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);

    /// Pop the oldest pending error flag, `GL_NO_ERROR` if none.
    fn get_error(&self) -> u32;
}
