use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::bridge::ParameterBridge;
use crate::error::{DriverError, SurfaceError};
use crate::physics::WAVE_SPEED;
use crate::renderer::{marker_style, render_field, FieldGrid, FieldStats, RenderSurface, DEFAULT_SCALE};
use crate::state::WaveSource;

/// Base marker ring radius in pixels.
const MARKER_RADIUS: f64 = 5.0;
/// Pulse amplitude of the marker ring, in pixels.
const MARKER_PULSE: f64 = 1.0;
/// Pulse phase advance per rendered frame.
const MARKER_PULSE_RATE: f64 = 0.1;
/// Label offset from the source centre.
const LABEL_OFFSET: (f64, f64) = (10.0, -10.0);

/// Simulation time in seconds. Only moves forward, except on reset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationClock {
    time: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advance by `dt` seconds. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverConfig {
    /// Frame rate cap. 0 disables throttling.
    pub target_fps: u32,
    /// Downsampling factor N: one field sample per N x N pixel block.
    pub scale: usize,
    pub wave_speed: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            scale: DEFAULT_SCALE,
            wave_speed: WAVE_SPEED,
        }
    }
}

impl DriverConfig {
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.target_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.target_fps as f64))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Paused,
    /// The surface is gone; every later tick is a no-op.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Width or height is 0. Retried next tick.
    EmptySurface,
    /// The frame was drawn but the host could not show it.
    PresentFailed,
}

/// Summary of one rendered frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Simulation time the field was sampled at.
    pub time: f64,
    pub grid: FieldGrid,
    pub stats: FieldStats,
    /// Zero-based index of this frame.
    pub frame: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Rendered(FrameReport),
    /// Too early for the next frame; elapsed time was banked.
    Throttled,
    Skipped(SkipReason),
    Stopped,
}

/// Owns the simulation clock and turns host ticks into frames.
pub struct FrameDriver {
    bridge: ParameterBridge,
    config: DriverConfig,
    clock: SimulationClock,
    state: DriverState,
    grid: Option<FieldGrid>,
    /// Wall time since the last rendered frame, paused or not.
    since_frame: Duration,
    /// Running time not yet applied to the clock.
    pending: Duration,
    frames: u64,
    seen_epoch: u64,
    last_skipped: usize,
}

impl FrameDriver {
    pub fn new(bridge: ParameterBridge, config: DriverConfig) -> Self {
        let controls = bridge.snapshot();
        let state = if controls.paused { DriverState::Paused } else { DriverState::Running };
        let seen_epoch = controls.reset_epoch;
        Self {
            bridge,
            config,
            clock: SimulationClock::new(),
            state,
            grid: None,
            since_frame: Duration::ZERO,
            pending: Duration::ZERO,
            frames: 0,
            seen_epoch,
            last_skipped: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Grid of the last rendered frame. `None` before the first frame or after a stop.
    pub fn grid(&self) -> Option<FieldGrid> {
        self.grid
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn bridge(&self) -> &ParameterBridge {
        &self.bridge
    }

    /// Handle one host callback. `elapsed` is the real time since the previous tick.
    pub fn tick<S: RenderSurface + ?Sized>(&mut self, elapsed: Duration, surface: &mut S) -> Result<TickOutcome, DriverError> {
        if self.state == DriverState::Stopped {
            return Ok(TickOutcome::Stopped);
        }

        let controls = self.bridge.snapshot();
        self.state = if controls.paused { DriverState::Paused } else { DriverState::Running };

        self.since_frame = self.since_frame.saturating_add(elapsed);
        if self.state == DriverState::Running {
            self.pending = self.pending.saturating_add(elapsed);
        }

        if controls.reset_epoch != self.seen_epoch {
            self.seen_epoch = controls.reset_epoch;
            self.clock.reset();
            self.pending = Duration::ZERO;
            info!(epoch = controls.reset_epoch, "clock reset");
        }

        if let Some(interval) = self.config.frame_interval() {
            if self.frames > 0 && self.since_frame < interval {
                return Ok(TickOutcome::Throttled);
            }
        }

        let (width, height) = match surface.size() {
            Ok(size) => size,
            Err(err) => return Err(self.stop(err)),
        };
        let Some(grid) = FieldGrid::new(width, height, self.config.scale) else {
            return Ok(TickOutcome::Skipped(SkipReason::EmptySurface));
        };
        if self.grid != Some(grid) {
            debug!(width, height, cols = grid.cols, rows = grid.rows, "field grid recomputed");
            self.grid = Some(grid);
        }

        self.clock.advance(self.pending.as_secs_f64());
        self.pending = Duration::ZERO;
        self.since_frame = self.frame_remainder();

        let time = self.clock.time();
        surface.begin_frame(time);
        let stats = render_field(surface.pixels_mut(), &grid, time, &controls.sources, self.config.wave_speed)?;
        self.note_skipped(stats.skipped);

        let frame = self.frames;
        draw_markers(surface, &controls.sources, frame);
        self.frames += 1;

        match surface.present() {
            Ok(()) => Ok(TickOutcome::Rendered(FrameReport { time, grid, stats, frame })),
            Err(SurfaceError::Lost) => Err(self.stop(SurfaceError::Lost)),
            Err(err) => {
                warn!(error = %err, frame, "frame not presented");
                Ok(TickOutcome::Skipped(SkipReason::PresentFailed))
            }
        }
    }

    /// Overshoot past one frame interval, carried into the next. A backlog of a
    /// full interval or more is dropped.
    fn frame_remainder(&self) -> Duration {
        let Some(interval) = self.config.frame_interval() else {
            return Duration::ZERO;
        };
        let carry = self.since_frame.saturating_sub(interval);
        if carry >= interval { Duration::ZERO } else { carry }
    }

    fn note_skipped(&mut self, skipped: usize) {
        if skipped == self.last_skipped {
            return;
        }
        if skipped > 0 {
            warn!(skipped, "active sources with invalid parameters are not rendered");
        } else {
            info!("all active sources valid again");
        }
        self.last_skipped = skipped;
    }

    fn stop(&mut self, err: SurfaceError) -> DriverError {
        error!(error = %err, frames = self.frames, "render surface lost, stopping");
        self.state = DriverState::Stopped;
        self.grid = None;
        DriverError::SurfaceLost(err)
    }
}

/// Ring plus `S<id>` label for each active source, coloured by list position.
fn draw_markers<S: RenderSurface + ?Sized>(surface: &mut S, sources: &[WaveSource], frame: u64) {
    let radius = MARKER_RADIUS + (frame as f64 * MARKER_PULSE_RATE).sin() * MARKER_PULSE;
    for (index, source) in sources.iter().enumerate() {
        if !source.active {
            continue;
        }
        let color = marker_style(index).color;
        surface.draw_ring(source.x, source.y, radius, color);
        surface.draw_label(source.x + LABEL_OFFSET.0, source.y + LABEL_OFFSET.1, &source.label(), color);
    }
}
