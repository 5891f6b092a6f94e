//! Full-screen shader quad demo for the Raspberry Pi VideoCore display
//! stack.
//!
//! One-shot bring-up of a dispmanx-backed EGL window surface spanning the
//! physical display, followed by a single OpenGL ES 2.0 draw: the embedded
//! vertex/fragment pair rasterizes one flat-colored quad as a triangle fan,
//! and the result is presented with a buffer swap.
//!
//! The platform libraries sit behind the traits in [`driver`], so the whole
//! sequence is exercisable against a recording driver without VideoCore
//! hardware. The real bindings live in [`ffi`] behind the `broadcom`
//! feature, together with the `quad-demo` binary.

pub mod display;
pub mod driver;
pub mod error;
#[cfg(feature = "broadcom")]
pub mod ffi;
pub mod renderer;

pub use display::DisplayContext;
pub use error::{QuadError, Result};
pub use renderer::QuadRenderer;
