/// What the runtime should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the render can be retried.
    Reconfigured,
    /// Transient; drop this frame.
    SkipFrame,
    /// Out of memory; shut down.
    Fatal,
}
