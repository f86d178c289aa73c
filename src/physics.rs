use std::f64::consts::TAU;

use crate::state::WaveSource;

/// Propagation speed shared by all sources, in pixels per simulation second.
pub const WAVE_SPEED: f64 = 100.0;

/// Displacement of a single source at (px, py) and time t:
/// `A * cos(k*r - w*t + phase)` with `k = 2pi / (speed / f)` and `w = 2pi * f`.
///
/// Pure and deterministic. The caller guarantees `source.frequency > 0`;
/// use [`WaveSource::contributes`] to filter first.
#[inline]
pub fn displacement(px: f64, py: f64, t: f64, source: &WaveSource, wave_speed: f64) -> f64 {
    let dx = px - source.x;
    let dy = py - source.y;
    let r = (dx * dx + dy * dy).sqrt();

    let wavelength = wave_speed / source.frequency;
    let k = TAU / wavelength;
    let omega = TAU * source.frequency;

    source.amplitude * (k * r - omega * t + source.phase).cos()
}

/// Sum of displacements and sum of amplitudes over the contributing sources.
pub fn superpose(px: f64, py: f64, t: f64, sources: &[WaveSource], wave_speed: f64) -> (f64, f64) {
    let mut total = 0.0;
    let mut max_amplitude = 0.0;
    for source in sources.iter().filter(|s| s.contributes()) {
        total += displacement(px, py, t, source, wave_speed);
        max_amplitude += source.amplitude;
    }
    (total, max_amplitude)
}

/// Divide by the amplitude sum, falling back to 1 when nothing contributes.
/// Result is in [-1, 1].
#[inline]
pub fn normalize(total: f64, max_amplitude: f64) -> f64 {
    let divisor = if max_amplitude > 0.0 { max_amplitude } else { 1.0 };
    (total / divisor).clamp(-1.0, 1.0)
}

/// Normalized superposed displacement at a point.
pub fn normalized(px: f64, py: f64, t: f64, sources: &[WaveSource], wave_speed: f64) -> f64 {
    let (total, max_amplitude) = superpose(px, py, t, sources, wave_speed);
    normalize(total, max_amplitude)
}

/// One source with its per-frame constants hoisted out of the cell loop.
/// Evaluates the same expression as [`displacement`], term for term.
#[derive(Clone, Copy, Debug)]
pub struct SourceTerm {
    x: f64,
    y: f64,
    amplitude: f64,
    k: f64,
    omega_t: f64,
    phase: f64,
}

impl SourceTerm {
    pub fn new(source: &WaveSource, t: f64, wave_speed: f64) -> Self {
        let wavelength = wave_speed / source.frequency;
        Self {
            x: source.x,
            y: source.y,
            amplitude: source.amplitude,
            k: TAU / wavelength,
            omega_t: TAU * source.frequency * t,
            phase: source.phase,
        }
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    #[inline]
    pub fn eval(&self, px: f64, py: f64) -> f64 {
        let dx = px - self.x;
        let dy = py - self.y;
        let r = (dx * dx + dy * dy).sqrt();
        self.amplitude * (self.k * r - self.omega_t + self.phase).cos()
    }
}

/// Precompute terms for the sources that contribute this frame.
/// Returns the terms and the number of active sources skipped as invalid.
pub fn frame_terms(sources: &[WaveSource], t: f64, wave_speed: f64) -> (Vec<SourceTerm>, usize) {
    let mut skipped = 0;
    let mut terms = Vec::with_capacity(sources.len());
    for source in sources.iter().filter(|s| s.active) {
        if source.is_valid() {
            terms.push(SourceTerm::new(source, t, wave_speed));
        } else {
            skipped += 1;
        }
    }
    (terms, skipped)
}
