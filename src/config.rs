use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::driver::DriverConfig;
use crate::error::ConfigError;
use crate::physics::WAVE_SPEED;
use crate::renderer::DEFAULT_SCALE;
use crate::state::{default_sources, wrap_phase, WaveSource};

pub const CONFIG_FILE: &str = "wavarium.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub physics: PhysicsConfig,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: u32,
    /// Downsampling factor: pixels per field sample along each axis.
    pub scale: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub wave_speed: f64,
}

/// One entry of the `sources` list. Omitted parameters take the source defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub amplitude: Option<f64>,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub phase: Option<f64>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            physics: PhysicsConfig::default(),
            sources: default_sources().iter().map(SourceConfig::from).collect(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            target_fps: 30,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { wave_speed: WAVE_SPEED }
    }
}

impl From<&WaveSource> for SourceConfig {
    fn from(s: &WaveSource) -> Self {
        Self {
            id: s.id,
            x: s.x,
            y: s.y,
            amplitude: Some(s.amplitude),
            frequency: Some(s.frequency),
            phase: Some(s.phase),
            active: Some(s.active),
        }
    }
}

impl SourceConfig {
    pub fn to_source(&self) -> WaveSource {
        let base = WaveSource::new(self.id, self.x, self.y);
        WaveSource {
            amplitude: self.amplitude.unwrap_or(base.amplitude),
            frequency: self.frequency.unwrap_or(base.frequency),
            phase: self.phase.map(wrap_phase).unwrap_or(base.phase),
            active: self.active.unwrap_or(base.active),
            ..base
        }
    }
}

impl Config {
    /// Initial source set. Later entries that reuse an id are dropped.
    pub fn sources(&self) -> Vec<WaveSource> {
        let mut out: Vec<WaveSource> = Vec::with_capacity(self.sources.len());
        for entry in &self.sources {
            if out.iter().any(|s| s.id == entry.id) {
                warn!(id = entry.id, "duplicate source id in config; entry ignored");
                continue;
            }
            let source = entry.to_source();
            if !source.is_valid() {
                warn!(id = source.id, ?source, "source has invalid parameters and will not be rendered");
            }
            out.push(source);
        }
        out
    }

    pub fn driver_config(&self) -> DriverConfig {
        let wave_speed = if self.physics.wave_speed.is_finite() && self.physics.wave_speed > 0.0 {
            self.physics.wave_speed
        } else {
            warn!(wave_speed = self.physics.wave_speed, "wave_speed must be positive; using {WAVE_SPEED}");
            WAVE_SPEED
        };
        DriverConfig {
            target_fps: self.display.target_fps,
            scale: self.display.scale.max(1),
            wave_speed,
        }
    }
}

/// Read and parse a config file.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `wavarium.yaml` from the working directory, or defaults if it is missing or broken.
pub fn load() -> Config {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Config::default();
    }
    match load_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{e}; using defaults");
            Config::default()
        }
    }
}
