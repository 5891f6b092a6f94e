//! One-shot display bring-up: EGL display, full-screen dispmanx element,
//! window surface and current context.

use tracing::{debug, info};

use crate::driver::{
    EglApi, EglContext, EglDisplay, EglSurface, HostApi, NativeWindow, Rect, EGL_ALPHA_SIZE,
    EGL_BLUE_SIZE, EGL_GREEN_SIZE, EGL_NONE, EGL_OPENGL_ES_API, EGL_RED_SIZE, EGL_SURFACE_TYPE,
    EGL_WINDOW_BIT,
};
use crate::error::{QuadError, Result};

/// Required pixel format: 8 bits per channel, window-surface capable.
/// Exactly one matching configuration is requested; there is no fallback to
/// a looser format.
pub const CONFIG_ATTRIBS: [i32; 11] = [
    EGL_RED_SIZE,
    8,
    EGL_GREEN_SIZE,
    8,
    EGL_BLUE_SIZE,
    8,
    EGL_ALPHA_SIZE,
    8,
    EGL_SURFACE_TYPE,
    EGL_WINDOW_BIT,
    EGL_NONE,
];

/// GLES client version requested at context creation.
const CONTEXT_CLIENT_VERSION: i32 = 2;

/// The physical screen (LCD) both the geometry query and the compositor
/// element target.
const SCREEN: u32 = 0;

/// Everything the renderer needs from the platform: the EGL handle triple
/// plus the surface geometry, fixed at initialization and never re-queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayContext {
    pub display: EglDisplay,
    pub surface: EglSurface,
    pub context: EglContext,
    pub width: u32,
    pub height: u32,
}

/// Destination and source rectangles for a compositor element covering the
/// whole display. The source rectangle is in 16.16 fixed point.
fn fullscreen_rects(width: u32, height: u32) -> (Rect, Rect) {
    let dst = Rect::new(0, 0, width as i32, height as i32);
    let src = Rect::new(0, 0, (width << 16) as i32, (height << 16) as i32);
    (dst, src)
}

impl DisplayContext {
    /// Bring up the display stack and make a context current on the calling
    /// thread.
    ///
    /// Strictly sequential; the first failing step aborts the bring-up and
    /// nothing acquired so far is released. The dispmanx update is submitted
    /// synchronously before the window surface referencing its element is
    /// created — the surface must not exist before the element is on screen.
    pub fn initialize<H: HostApi, E: EglApi>(host: &H, egl: &E) -> Result<Self> {
        // 1. Host subsystem.
        let status = host.host_init();
        if status != 0 {
            return Err(QuadError::HostInit(status));
        }

        // 2-3. Default display and driver handshake.
        let display = egl.get_default_display();
        if display.is_none() {
            return Err(QuadError::NoDisplay);
        }
        if !egl.initialize(display) {
            return Err(QuadError::DisplayInit);
        }
        debug!("EGL display initialized");

        // 4. Pixel-format negotiation, count = 1.
        let config = egl
            .choose_config(display, &CONFIG_ATTRIBS)
            .ok_or(QuadError::NoConfig)?;

        // 5. Bind the embedded-profile API before creating the context.
        if !egl.bind_api(EGL_OPENGL_ES_API) {
            return Err(QuadError::BindApi);
        }

        // 6. Context with client version 2, no share context.
        let context = egl.create_context(display, config, CONTEXT_CLIENT_VERSION);
        if context.is_none() {
            return Err(QuadError::NoContext);
        }

        // 7. Physical display geometry.
        let (status, width, height) = host.graphics_display_size(SCREEN as u16);
        if status < 0 {
            return Err(QuadError::DisplaySize(status));
        }
        info!(width, height, "physical display size");

        // 8. Full-screen opaque compositor element, committed synchronously.
        let dispman_display = host.dispmanx_display_open(SCREEN);
        if dispman_display.is_none() {
            return Err(QuadError::CompositorDisplay);
        }
        let update = host.dispmanx_update_start(0);
        if update.is_none() {
            return Err(QuadError::CompositorUpdate);
        }
        let (dst, src) = fullscreen_rects(width, height);
        let element = host.dispmanx_element_add(update, dispman_display, 0, &dst, &src);
        if element.is_none() {
            return Err(QuadError::CompositorElement);
        }
        let status = host.dispmanx_update_submit_sync(update);
        if status != 0 {
            return Err(QuadError::CompositorSubmit(status));
        }
        debug!("compositor element committed");

        // 9. Window surface over the committed element.
        let window = NativeWindow {
            element,
            width: width as i32,
            height: height as i32,
        };
        let surface = egl.create_window_surface(display, config, &window);
        if surface.is_none() {
            return Err(QuadError::NoSurface);
        }

        // 10. Make the context current for the draw calls that follow.
        if !egl.make_current(display, surface, surface, context) {
            return Err(QuadError::MakeCurrent);
        }
        info!("EGL context current");

        Ok(Self {
            display,
            surface,
            context,
            width,
            height,
        })
    }
}
