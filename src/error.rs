//! Error types shared by every stage of the demo.
//!
//! Initialization errors ([`DemoError::SurfaceUnavailable`],
//! [`DemoError::InvalidTextureSize`]) abort startup. Per-frame errors such as
//! [`DemoError::SingularMatrix`] stop the [`AnimationLoop`](crate::AnimationLoop)
//! and are handed back to whoever drives it. [`DemoError::ResizeRace`] is the
//! only condition the loop recovers from on its own.

use crate::animation::LoopState;

/// Everything that can go wrong while building or running the scene.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f32 },

    #[error("invalid cube-map face size {0}, expected a positive edge length")]
    InvalidTextureSize(i64),

    #[error("surface reported transient size {width}x{height}")]
    ResizeRace { width: i64, height: i64 },

    #[error("lit shading program rendered without lighting uniforms")]
    MissingLighting,

    #[error("cannot {operation} while the loop is {state:?}")]
    InvalidLoopState {
        operation: &'static str,
        state: LoopState,
    },

    #[error("failed to parse label font: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, DemoError>;
