use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rpi_gles_quad::display::DisplayContext;
use rpi_gles_quad::ffi::{BcmHost, LibEgl, LibGles};
use rpi_gles_quad::renderer::{report_gl_error, QuadRenderer};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = BcmHost;
    let egl = LibEgl;
    let gl = LibGles;

    let ctx = DisplayContext::initialize(&host, &egl).context("display bring-up failed")?;
    let renderer = QuadRenderer::new(&gl);
    renderer.draw(&gl, &egl, &ctx);

    // Final health report. A shader that failed to compile shows up here
    // and nowhere else.
    let code = report_gl_error(&gl);
    println!("{code:#x}");
    Ok(())
}
