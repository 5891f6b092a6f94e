//! Recording driver used by the integration tests: implements the three
//! native-API traits over shared state, logs every call in order, and flags
//! GL usage while no context is current.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use rpi_gles_quad::driver::{
    DispmanxDisplay, DispmanxElement, DispmanxUpdate, EglApi, EglConfig, EglContext, EglDisplay,
    EglSurface, GlApi, HostApi, NativeWindow, Rect, GL_FRAGMENT_SHADER, GL_NO_ERROR,
};

const GL_INVALID_OPERATION: u32 = 0x0502;

#[derive(Debug, Default)]
pub struct DriverState {
    /// Every trait call, in issue order.
    pub calls: Vec<String>,
    /// Usage-order problems: GL calls without a current context, buffer
    /// uploads with nothing bound, surfaces created before the compositor
    /// commit.
    pub violations: Vec<String>,

    // Failure-injection knobs.
    pub host_init_status: i32,
    pub deny_config: bool,
    pub deny_make_current: bool,
    pub fail_fragment_compile: bool,

    pub display_size: (u32, u32),
    pub context_current: bool,
    pub chosen_attribs: Vec<i32>,
    pub native_window: Option<NativeWindow>,
    pub element_rects: Option<(Rect, Rect)>,
    pub presents: u32,

    next_object: u32,
    pub shader_kinds: HashMap<u32, u32>,
    pub shader_sources: HashMap<u32, String>,
    pub broken_shaders: HashSet<u32>,
    pub program_shaders: HashMap<u32, Vec<u32>>,
    pub broken_programs: HashSet<u32>,
    pub current_program: u32,
    pub bound_buffer: u32,
    pub buffers_generated: u32,
    pub uploads: Vec<Vec<f32>>,
    pub uniforms: Vec<(i32, [f32; 4])>,
    pub enabled_attribs: HashSet<i32>,
    pub viewports: Vec<(i32, i32, i32, i32)>,
    pub clear_color: Option<[f32; 4]>,
    pub clears: u32,
    pub draws: Vec<(u32, i32, i32)>,
    pub pending_error: u32,
}

impl DriverState {
    pub fn call_index(&self, name: &str) -> Option<usize> {
        self.calls.iter().position(|c| c == name)
    }
}

pub struct MockDriver {
    state: Rc<RefCell<DriverState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::with_display_size(1920, 1080)
    }

    pub fn with_display_size(width: u32, height: u32) -> Self {
        let state = DriverState {
            display_size: (width, height),
            ..DriverState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn state(&self) -> Rc<RefCell<DriverState>> {
        Rc::clone(&self.state)
    }

    fn record(&self, call: &str) {
        self.state.borrow_mut().calls.push(call.to_owned());
    }

    /// Record a GL entry point, flagging it if no context is current.
    fn gl_call(&self, call: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push(call.to_owned());
        if !state.context_current {
            state
                .violations
                .push(format!("{call} issued with no current context"));
        }
    }

    fn next_object(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_object += 1;
        state.next_object
    }
}

impl HostApi for MockDriver {
    fn host_init(&self) -> i32 {
        self.record("host_init");
        self.state.borrow().host_init_status
    }

    fn graphics_display_size(&self, _screen: u16) -> (i32, u32, u32) {
        self.record("graphics_display_size");
        let (width, height) = self.state.borrow().display_size;
        (0, width, height)
    }

    fn dispmanx_display_open(&self, _screen: u32) -> DispmanxDisplay {
        self.record("dispmanx_display_open");
        DispmanxDisplay(0x11)
    }

    fn dispmanx_update_start(&self, _priority: i32) -> DispmanxUpdate {
        self.record("dispmanx_update_start");
        DispmanxUpdate(0x22)
    }

    fn dispmanx_element_add(
        &self,
        _update: DispmanxUpdate,
        _display: DispmanxDisplay,
        _layer: i32,
        dst: &Rect,
        src: &Rect,
    ) -> DispmanxElement {
        self.record("dispmanx_element_add");
        self.state.borrow_mut().element_rects = Some((*dst, *src));
        DispmanxElement(0x33)
    }

    fn dispmanx_update_submit_sync(&self, _update: DispmanxUpdate) -> i32 {
        self.record("dispmanx_update_submit_sync");
        0
    }
}

impl EglApi for MockDriver {
    fn get_default_display(&self) -> EglDisplay {
        self.record("get_default_display");
        EglDisplay(0x01)
    }

    fn initialize(&self, _display: EglDisplay) -> bool {
        self.record("initialize");
        true
    }

    fn choose_config(&self, _display: EglDisplay, attribs: &[i32]) -> Option<EglConfig> {
        self.record("choose_config");
        let mut state = self.state.borrow_mut();
        state.chosen_attribs = attribs.to_vec();
        if state.deny_config {
            None
        } else {
            Some(EglConfig(0x02))
        }
    }

    fn bind_api(&self, _api: u32) -> bool {
        self.record("bind_api");
        true
    }

    fn create_context(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        _client_version: i32,
    ) -> EglContext {
        self.record("create_context");
        EglContext(0x03)
    }

    fn create_window_surface(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        window: &NativeWindow,
    ) -> EglSurface {
        let mut state = self.state.borrow_mut();
        if !state.calls.iter().any(|c| c == "dispmanx_update_submit_sync") {
            state
                .violations
                .push("window surface created before compositor commit".to_owned());
        }
        state.calls.push("create_window_surface".to_owned());
        state.native_window = Some(*window);
        EglSurface(0x04)
    }

    fn make_current(
        &self,
        _display: EglDisplay,
        _draw: EglSurface,
        _read: EglSurface,
        _context: EglContext,
    ) -> bool {
        self.record("make_current");
        let mut state = self.state.borrow_mut();
        if state.deny_make_current {
            false
        } else {
            state.context_current = true;
            true
        }
    }

    fn swap_buffers(&self, _display: EglDisplay, _surface: EglSurface) -> bool {
        self.record("swap_buffers");
        self.state.borrow_mut().presents += 1;
        true
    }
}

impl GlApi for MockDriver {
    fn create_shader(&self, kind: u32) -> u32 {
        self.gl_call("create_shader");
        let shader = self.next_object();
        self.state.borrow_mut().shader_kinds.insert(shader, kind);
        shader
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.gl_call("shader_source");
        self.state
            .borrow_mut()
            .shader_sources
            .insert(shader, source.to_owned());
    }

    fn compile_shader(&self, shader: u32) {
        self.gl_call("compile_shader");
        let mut state = self.state.borrow_mut();
        let kind = state.shader_kinds.get(&shader).copied().unwrap_or(0);
        if state.fail_fragment_compile && kind == GL_FRAGMENT_SHADER {
            state.broken_shaders.insert(shader);
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.gl_call("shader_info_log");
        if self.state.borrow().broken_shaders.contains(&shader) {
            "ERROR: 0:1: compile failed".to_owned()
        } else {
            String::new()
        }
    }

    fn create_program(&self) -> u32 {
        self.gl_call("create_program");
        let program = self.next_object();
        self.state
            .borrow_mut()
            .program_shaders
            .insert(program, Vec::new());
        program
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.gl_call("attach_shader");
        self.state
            .borrow_mut()
            .program_shaders
            .entry(program)
            .or_default()
            .push(shader);
    }

    fn link_program(&self, program: u32) {
        self.gl_call("link_program");
        let mut state = self.state.borrow_mut();
        let broken = state
            .program_shaders
            .get(&program)
            .map(|shaders| shaders.iter().any(|s| state.broken_shaders.contains(s)))
            .unwrap_or(true);
        if broken {
            state.broken_programs.insert(program);
        }
    }

    fn program_info_log(&self, program: u32) -> String {
        self.gl_call("program_info_log");
        if self.state.borrow().broken_programs.contains(&program) {
            "ERROR: link failed: missing fragment stage".to_owned()
        } else {
            String::new()
        }
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        self.gl_call("uniform_location");
        let state = self.state.borrow();
        if !state.broken_programs.contains(&program) && name == "color" {
            7
        } else {
            -1
        }
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        self.gl_call("attrib_location");
        let state = self.state.borrow();
        if !state.broken_programs.contains(&program) && name == "vertex" {
            2
        } else {
            -1
        }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl_call("clear_color");
        self.state.borrow_mut().clear_color = Some([r, g, b, a]);
    }

    fn gen_buffer(&self) -> u32 {
        self.gl_call("gen_buffer");
        let buffer = self.next_object();
        self.state.borrow_mut().buffers_generated += 1;
        buffer
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl_call("viewport");
        self.state.borrow_mut().viewports.push((x, y, width, height));
    }

    fn use_program(&self, program: u32) {
        self.gl_call("use_program");
        self.state.borrow_mut().current_program = program;
    }

    fn bind_buffer(&self, _target: u32, buffer: u32) {
        self.gl_call("bind_buffer");
        self.state.borrow_mut().bound_buffer = buffer;
    }

    fn buffer_data(&self, _target: u32, data: &[f32], _usage: u32) {
        self.gl_call("buffer_data");
        let mut state = self.state.borrow_mut();
        if state.bound_buffer == 0 {
            state
                .violations
                .push("buffer_data issued with no buffer bound".to_owned());
        }
        state.uploads.push(data.to_vec());
    }

    fn vertex_attrib_pointer(
        &self,
        _location: i32,
        _size: i32,
        _ty: u32,
        _normalized: bool,
        _stride: i32,
        _offset: usize,
    ) {
        self.gl_call("vertex_attrib_pointer");
    }

    fn enable_vertex_attrib_array(&self, location: i32) {
        self.gl_call("enable_vertex_attrib_array");
        self.state.borrow_mut().enabled_attribs.insert(location);
    }

    fn clear(&self, _mask: u32) {
        self.gl_call("clear");
        self.state.borrow_mut().clears += 1;
    }

    fn uniform4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        self.gl_call("uniform4f");
        self.state.borrow_mut().uniforms.push((location, [x, y, z, w]));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.gl_call("draw_arrays");
        let mut state = self.state.borrow_mut();
        state.draws.push((mode, first, count));
        // Drawing with a program whose fragment stage never compiled raises
        // INVALID_OPERATION, observable only through get_error.
        if state.broken_programs.contains(&state.current_program)
            && state.pending_error == GL_NO_ERROR
        {
            state.pending_error = GL_INVALID_OPERATION;
        }
    }

    fn get_error(&self) -> u32 {
        self.record("get_error");
        let mut state = self.state.borrow_mut();
        std::mem::replace(&mut state.pending_error, GL_NO_ERROR)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
