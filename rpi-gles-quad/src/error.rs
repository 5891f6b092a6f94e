use thiserror::Error;

/// A specialized `Result` type for display bring-up operations.
pub type Result<T> = std::result::Result<T, QuadError>;

/// The error type for the one-shot display bring-up.
///
/// One variant per fatal call site. There is no recovery path anywhere in
/// the crate: the first error aborts the run, and no native resource
/// acquired up to that point is released (process exit reclaims them).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuadError {
    #[error("bcm host init failed with status {0}")]
    HostInit(i32),
    #[error("no default EGL display available")]
    NoDisplay,
    #[error("EGL display initialization failed")]
    DisplayInit,
    #[error("no EGL config satisfies RGBA8888 with window-surface support")]
    NoConfig,
    #[error("failed to bind the OpenGL ES API")]
    BindApi,
    #[error("EGL context creation returned EGL_NO_CONTEXT")]
    NoContext,
    #[error("physical display size query failed with status {0}")]
    DisplaySize(i32),
    #[error("dispmanx display open failed")]
    CompositorDisplay,
    #[error("dispmanx update start failed")]
    CompositorUpdate,
    #[error("dispmanx element add failed")]
    CompositorElement,
    #[error("dispmanx update submit failed with status {0}")]
    CompositorSubmit(i32),
    #[error("EGL window surface creation returned EGL_NO_SURFACE")]
    NoSurface,
    #[error("eglMakeCurrent failed")]
    MakeCurrent,
}
