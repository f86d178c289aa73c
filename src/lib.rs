//! Real-time interference field of point wave sources, rasterized to RGBA.
//!
//! [`driver::FrameDriver`] turns host ticks into frames: it reads the latest
//! source parameters from a [`bridge::ParameterBridge`], samples the analytic
//! field from [`physics`] on a downsampled grid, and writes grayscale pixels
//! into any [`renderer::RenderSurface`].

pub mod bridge;
pub mod config;
pub mod driver;
pub mod error;
pub mod overlay;
pub mod physics;
pub mod renderer;
pub mod state;

pub use bridge::{Controls, ParameterBridge};
pub use driver::{DriverConfig, DriverState, FrameDriver, FrameReport, SkipReason, TickOutcome};
pub use error::{ConfigError, DriverError, RenderError, SurfaceError};
pub use renderer::{Canvas, FieldGrid, FieldStats, RenderSurface};
pub use state::WaveSource;
