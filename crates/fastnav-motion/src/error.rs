//! Motion controller error types.

/// Errors from capturing the current frame for the crossfade overlay.
///
/// None of these are fatal: the controller skips the crossfade and restores
/// full quality directly.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The render surface cannot read back its contents.
    #[error("frame capture is not supported by this surface")]
    Unsupported,

    /// The render surface has no area to capture.
    #[error("render surface has zero area ({width}x{height})")]
    EmptySurface { width: f32, height: f32 },

    /// The host reported a capture failure.
    #[error("frame capture failed: {0}")]
    Failed(String),
}
