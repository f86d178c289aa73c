use std::f64::consts::TAU;

/// Parameter values restored by a reset.
pub struct SourceDefaults;

impl SourceDefaults {
    pub const AMPLITUDE: f64 = 5.0;
    pub const FREQUENCY: f64 = 1.5;
    pub const PHASE: f64 = 0.0;
    pub const ACTIVE: bool = true;
}

/// Editor-side ranges. The core never clamps against these; it only skips
/// sources that would break the field formula.
pub const AMPLITUDE_RANGE: (f64, f64) = (0.0, 10.0);
pub const FREQUENCY_RANGE: (f64, f64) = (0.5, 5.0);
pub const PHASE_RANGE: (f64, f64) = (0.0, TAU);

/// One idealized point emitter. Replaced wholesale by the editor, read-only
/// everywhere else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSource {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub amplitude: f64,
    pub frequency: f64,
    /// Radians, wrapped to [0, 2pi) by the editor.
    pub phase: f64,
    pub active: bool,
}

impl WaveSource {
    /// Source at (x, y) with default amplitude, frequency, phase and active flag.
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            amplitude: SourceDefaults::AMPLITUDE,
            frequency: SourceDefaults::FREQUENCY,
            phase: SourceDefaults::PHASE,
            active: SourceDefaults::ACTIVE,
        }
    }

    /// Copy with parameters restored to defaults; id and position are kept.
    pub fn with_default_params(&self) -> Self {
        Self::new(self.id, self.x, self.y)
    }

    /// Whether the parameters can be fed to the field formula.
    /// Says nothing about the active flag.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.amplitude.is_finite()
            && self.amplitude >= 0.0
            && self.frequency.is_finite()
            && self.frequency > 0.0
            && self.phase.is_finite()
    }

    /// Active and valid: this source takes part in the current frame.
    #[inline]
    pub fn contributes(&self) -> bool {
        self.active && self.is_valid()
    }

    /// Short label drawn next to the source marker.
    pub fn label(&self) -> String {
        format!("S{}", self.id)
    }
}

/// Wrap a phase angle into [0, 2pi).
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// The session's starting pair: two sources on a horizontal line of a 600x600 surface.
pub fn default_sources() -> Vec<WaveSource> {
    vec![WaveSource::new(1, 200.0, 300.0), WaveSource::new(2, 400.0, 300.0)]
}
