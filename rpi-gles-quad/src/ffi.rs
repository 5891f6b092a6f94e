//! Raw bindings to the VideoCore userland libraries and the trait
//! implementations over them.
//!
//! Everything here is a thin unsafe shim; status checking and sequencing
//! live in [`crate::display`] and [`crate::renderer`]. Only available with
//! the `broadcom` feature, which links libbcm_host, libEGL and libGLESv2.

#![allow(non_snake_case)]

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr;

use crate::driver::{
    DispmanxDisplay, DispmanxElement, DispmanxUpdate, EglApi, EglConfig, EglContext, EglDisplay,
    EglSurface, GlApi, HostApi, NativeWindow, Rect,
};

/// Bounded size for shader and program info logs.
const INFO_LOG_BYTES: usize = 1024;

const DISPMANX_PROTECTION_NONE: u32 = 0;
const DISPMANX_NO_ROTATE: u32 = 0;

#[repr(C)]
struct VcRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl From<&Rect> for VcRect {
    fn from(r: &Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

/// EGL_DISPMANX_WINDOW_T from <EGL/eglplatform.h>.
#[repr(C)]
struct DispmanxWindow {
    element: u32,
    width: i32,
    height: i32,
}

#[link(name = "bcm_host")]
extern "C" {
    fn bcm_host_init();
    fn graphics_get_display_size(display_number: u16, width: *mut u32, height: *mut u32) -> i32;
    fn vc_dispmanx_display_open(device: u32) -> u32;
    fn vc_dispmanx_update_start(priority: i32) -> u32;
    fn vc_dispmanx_element_add(
        update: u32,
        display: u32,
        layer: i32,
        dest_rect: *const VcRect,
        src: u32,
        src_rect: *const VcRect,
        protection: u32,
        alpha: *const c_void,
        clamp: *const c_void,
        transform: u32,
    ) -> u32;
    fn vc_dispmanx_update_submit_sync(update: u32) -> c_int;
}

#[link(name = "EGL")]
extern "C" {
    fn eglGetDisplay(display_id: *mut c_void) -> *mut c_void;
    fn eglInitialize(dpy: *mut c_void, major: *mut i32, minor: *mut i32) -> c_uint;
    fn eglChooseConfig(
        dpy: *mut c_void,
        attrib_list: *const i32,
        configs: *mut *mut c_void,
        config_size: i32,
        num_config: *mut i32,
    ) -> c_uint;
    fn eglBindAPI(api: c_uint) -> c_uint;
    fn eglCreateContext(
        dpy: *mut c_void,
        config: *mut c_void,
        share_context: *mut c_void,
        attrib_list: *const i32,
    ) -> *mut c_void;
    fn eglCreateWindowSurface(
        dpy: *mut c_void,
        config: *mut c_void,
        win: *mut c_void,
        attrib_list: *const i32,
    ) -> *mut c_void;
    fn eglMakeCurrent(
        dpy: *mut c_void,
        draw: *mut c_void,
        read: *mut c_void,
        ctx: *mut c_void,
    ) -> c_uint;
    fn eglSwapBuffers(dpy: *mut c_void, surface: *mut c_void) -> c_uint;
}

#[link(name = "GLESv2")]
extern "C" {
    fn glCreateShader(kind: c_uint) -> c_uint;
    fn glShaderSource(
        shader: c_uint,
        count: c_int,
        string: *const *const c_char,
        length: *const c_int,
    );
    fn glCompileShader(shader: c_uint);
    fn glGetShaderInfoLog(
        shader: c_uint,
        max_length: c_int,
        length: *mut c_int,
        info_log: *mut c_char,
    );
    fn glCreateProgram() -> c_uint;
    fn glAttachShader(program: c_uint, shader: c_uint);
    fn glLinkProgram(program: c_uint);
    fn glGetProgramInfoLog(
        program: c_uint,
        max_length: c_int,
        length: *mut c_int,
        info_log: *mut c_char,
    );
    fn glGetUniformLocation(program: c_uint, name: *const c_char) -> c_int;
    fn glGetAttribLocation(program: c_uint, name: *const c_char) -> c_int;
    fn glClearColor(r: f32, g: f32, b: f32, a: f32);
    fn glGenBuffers(n: c_int, buffers: *mut c_uint);
    fn glViewport(x: c_int, y: c_int, width: c_int, height: c_int);
    fn glUseProgram(program: c_uint);
    fn glBindBuffer(target: c_uint, buffer: c_uint);
    fn glBufferData(target: c_uint, size: isize, data: *const c_void, usage: c_uint);
    fn glVertexAttribPointer(
        index: c_uint,
        size: c_int,
        ty: c_uint,
        normalized: u8,
        stride: c_int,
        pointer: *const c_void,
    );
    fn glEnableVertexAttribArray(index: c_uint);
    fn glClear(mask: c_uint);
    fn glUniform4f(location: c_int, x: f32, y: f32, z: f32, w: f32);
    fn glDrawArrays(mode: c_uint, first: c_int, count: c_int);
    fn glGetError() -> c_uint;
}

fn read_bounded_log(fetch: impl FnOnce(&mut [u8; INFO_LOG_BYTES]) -> i32) -> String {
    let mut buf = [0u8; INFO_LOG_BYTES];
    let len = fetch(&mut buf);
    let len = len.clamp(0, INFO_LOG_BYTES as i32) as usize;
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

/// libbcm_host entry points.
pub struct BcmHost;

impl HostApi for BcmHost {
    fn host_init(&self) -> i32 {
        // The symbol returns void; reaching the next statement is success.
        unsafe { bcm_host_init() };
        0
    }

    fn graphics_display_size(&self, screen: u16) -> (i32, u32, u32) {
        let mut width = 0u32;
        let mut height = 0u32;
        let status = unsafe { graphics_get_display_size(screen, &mut width, &mut height) };
        (status, width, height)
    }

    fn dispmanx_display_open(&self, screen: u32) -> DispmanxDisplay {
        DispmanxDisplay(unsafe { vc_dispmanx_display_open(screen) } as usize)
    }

    fn dispmanx_update_start(&self, priority: i32) -> DispmanxUpdate {
        DispmanxUpdate(unsafe { vc_dispmanx_update_start(priority) } as usize)
    }

    fn dispmanx_element_add(
        &self,
        update: DispmanxUpdate,
        display: DispmanxDisplay,
        layer: i32,
        dst: &Rect,
        src: &Rect,
    ) -> DispmanxElement {
        let dst = VcRect::from(dst);
        let src = VcRect::from(src);
        let element = unsafe {
            vc_dispmanx_element_add(
                update.0 as u32,
                display.0 as u32,
                layer,
                &dst,
                0,
                &src,
                DISPMANX_PROTECTION_NONE,
                ptr::null(),
                ptr::null(),
                DISPMANX_NO_ROTATE,
            )
        };
        DispmanxElement(element as usize)
    }

    fn dispmanx_update_submit_sync(&self, update: DispmanxUpdate) -> i32 {
        unsafe { vc_dispmanx_update_submit_sync(update.0 as u32) }
    }
}

/// libEGL entry points.
pub struct LibEgl;

impl EglApi for LibEgl {
    fn get_default_display(&self) -> EglDisplay {
        // EGL_DEFAULT_DISPLAY is the null pointer.
        EglDisplay(unsafe { eglGetDisplay(ptr::null_mut()) } as usize)
    }

    fn initialize(&self, display: EglDisplay) -> bool {
        unsafe { eglInitialize(display.0 as *mut c_void, ptr::null_mut(), ptr::null_mut()) } != 0
    }

    fn choose_config(&self, display: EglDisplay, attribs: &[i32]) -> Option<EglConfig> {
        let mut config: *mut c_void = ptr::null_mut();
        let mut num_config: i32 = 0;
        let ok = unsafe {
            eglChooseConfig(
                display.0 as *mut c_void,
                attribs.as_ptr(),
                &mut config,
                1,
                &mut num_config,
            )
        };
        if ok != 0 && num_config >= 1 {
            Some(EglConfig(config as usize))
        } else {
            None
        }
    }

    fn bind_api(&self, api: u32) -> bool {
        unsafe { eglBindAPI(api) } != 0
    }

    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        client_version: i32,
    ) -> EglContext {
        let attribs = [
            crate::driver::EGL_CONTEXT_CLIENT_VERSION,
            client_version,
            crate::driver::EGL_NONE,
        ];
        let context = unsafe {
            eglCreateContext(
                display.0 as *mut c_void,
                config.0 as *mut c_void,
                ptr::null_mut(),
                attribs.as_ptr(),
            )
        };
        EglContext(context as usize)
    }

    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: &NativeWindow,
    ) -> EglSurface {
        // EGL keeps the window pointer for the surface's lifetime, and this
        // process never destroys the surface, so the descriptor is leaked.
        let native: &'static mut DispmanxWindow = Box::leak(Box::new(DispmanxWindow {
            element: window.element.0 as u32,
            width: window.width,
            height: window.height,
        }));
        let surface = unsafe {
            eglCreateWindowSurface(
                display.0 as *mut c_void,
                config.0 as *mut c_void,
                native as *mut DispmanxWindow as *mut c_void,
                ptr::null(),
            )
        };
        EglSurface(surface as usize)
    }

    fn make_current(
        &self,
        display: EglDisplay,
        draw: EglSurface,
        read: EglSurface,
        context: EglContext,
    ) -> bool {
        unsafe {
            eglMakeCurrent(
                display.0 as *mut c_void,
                draw.0 as *mut c_void,
                read.0 as *mut c_void,
                context.0 as *mut c_void,
            )
        } != 0
    }

    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> bool {
        unsafe { eglSwapBuffers(display.0 as *mut c_void, surface.0 as *mut c_void) } != 0
    }
}

/// libGLESv2 entry points.
pub struct LibGles;

impl GlApi for LibGles {
    fn create_shader(&self, kind: u32) -> u32 {
        unsafe { glCreateShader(kind) }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let source = CString::new(source).unwrap();
        let strings = [source.as_ptr()];
        unsafe { glShaderSource(shader, 1, strings.as_ptr(), ptr::null()) };
    }

    fn compile_shader(&self, shader: u32) {
        unsafe { glCompileShader(shader) };
    }

    fn shader_info_log(&self, shader: u32) -> String {
        read_bounded_log(|buf| {
            let mut len: c_int = 0;
            unsafe {
                glGetShaderInfoLog(
                    shader,
                    buf.len() as c_int,
                    &mut len,
                    buf.as_mut_ptr() as *mut c_char,
                )
            };
            len
        })
    }

    fn create_program(&self) -> u32 {
        unsafe { glCreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { glAttachShader(program, shader) };
    }

    fn link_program(&self, program: u32) {
        unsafe { glLinkProgram(program) };
    }

    fn program_info_log(&self, program: u32) -> String {
        read_bounded_log(|buf| {
            let mut len: c_int = 0;
            unsafe {
                glGetProgramInfoLog(
                    program,
                    buf.len() as c_int,
                    &mut len,
                    buf.as_mut_ptr() as *mut c_char,
                )
            };
            len
        })
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        let name = CString::new(name).unwrap();
        unsafe { glGetUniformLocation(program, name.as_ptr()) }
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        let name = CString::new(name).unwrap();
        unsafe { glGetAttribLocation(program, name.as_ptr()) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { glClearColor(r, g, b, a) };
    }

    fn gen_buffer(&self) -> u32 {
        let mut buffer: c_uint = 0;
        unsafe { glGenBuffers(1, &mut buffer) };
        buffer
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { glViewport(x, y, width, height) };
    }

    fn use_program(&self, program: u32) {
        unsafe { glUseProgram(program) };
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        unsafe { glBindBuffer(target, buffer) };
    }

    fn buffer_data(&self, target: u32, data: &[f32], usage: u32) {
        unsafe {
            glBufferData(
                target,
                std::mem::size_of_val(data) as isize,
                data.as_ptr() as *const c_void,
                usage,
            )
        };
    }

    fn vertex_attrib_pointer(
        &self,
        location: i32,
        size: i32,
        ty: u32,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) {
        // An unresolved location (-1) is forwarded as-is; the driver flags
        // it and the final error report picks it up.
        unsafe {
            glVertexAttribPointer(
                location as c_uint,
                size,
                ty,
                normalized as u8,
                stride,
                offset as *const c_void,
            )
        };
    }

    fn enable_vertex_attrib_array(&self, location: i32) {
        unsafe { glEnableVertexAttribArray(location as c_uint) };
    }

    fn clear(&self, mask: u32) {
        unsafe { glClear(mask) };
    }

    fn uniform4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        unsafe { glUniform4f(location, x, y, z, w) };
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { glDrawArrays(mode, first, count) };
    }

    fn get_error(&self) -> u32 {
        unsafe { glGetError() }
    }
}
