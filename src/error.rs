use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a render surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface is gone for good (window closed, context destroyed).
    #[error("render surface is no longer available")]
    Lost,

    /// Handing the finished frame to the host failed.
    #[error("failed to present frame: {0}")]
    Present(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("pixel buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("render surface lost: {0}")]
    SurfaceLost(#[source] SurfaceError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
