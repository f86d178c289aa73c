use std::f64::consts::{PI, TAU};

use crate::renderer::{self, marker_style, FONT_HEIGHT};
use crate::state::{wrap_phase, SourceDefaults, WaveSource, AMPLITUDE_RANGE, FREQUENCY_RANGE, PHASE_RANGE};

/// Number of adjustable parameters per source.
const PARAM_COUNT: usize = 3;

/// Panel layout constants.
const GAUGE_WIDTH: usize = 8;

/// Parameter panel state: which source is being edited and which row is selected.
pub struct OverlayState {
    pub visible: bool,
    /// Index into the source list.
    pub source: usize,
    pub selected: usize,
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            visible: false,
            source: 0,
            selected: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn navigate(&mut self, delta: isize) {
        let count = PARAM_COUNT as isize;
        self.selected = ((self.selected as isize + delta).rem_euclid(count)) as usize;
    }

    /// Move to the next source, wrapping. `count` is the current source count.
    pub fn next_source(&mut self, count: usize) {
        self.source = if count == 0 { 0 } else { (self.source + 1) % count };
    }

    /// Selected source index, kept in range if the list shrank.
    pub fn source_index(&self, count: usize) -> Option<usize> {
        (count > 0).then(|| self.source.min(count - 1))
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Definition of an adjustable source parameter.
pub struct ParamDef {
    pub name: &'static str,
    pub short: &'static str,
    pub desc: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub fine_step: f64,
    pub default: f64,
    /// Wrap around instead of clamping at the ends.
    pub wrap: bool,
    pub get: fn(&WaveSource) -> f64,
    pub set: fn(&mut WaveSource, f64),
}

pub const PARAM_DEFS: [ParamDef; PARAM_COUNT] = [
    ParamDef {
        name: "amp",
        short: "amplitude",
        desc: "peak displacement of the source",
        min: AMPLITUDE_RANGE.0,
        max: AMPLITUDE_RANGE.1,
        step: 0.5,
        fine_step: 0.1,
        default: SourceDefaults::AMPLITUDE,
        wrap: false,
        get: |s| s.amplitude,
        set: |s, v| s.amplitude = v,
    },
    ParamDef {
        name: "freq",
        short: "frequency",
        desc: "cycles per second, sets the wavelength",
        min: FREQUENCY_RANGE.0,
        max: FREQUENCY_RANGE.1,
        step: 0.1,
        fine_step: 0.01,
        default: SourceDefaults::FREQUENCY,
        wrap: false,
        get: |s| s.frequency,
        set: |s, v| s.frequency = v,
    },
    ParamDef {
        name: "phase",
        short: "phase",
        desc: "phase offset in radians",
        min: PHASE_RANGE.0,
        max: PHASE_RANGE.1,
        step: PI / 16.0,
        fine_step: PI / 64.0,
        default: SourceDefaults::PHASE,
        wrap: true,
        get: |s| s.phase,
        set: |s, v| s.phase = v,
    },
];

/// Adjust a parameter by delta steps (positive = increase, negative = decrease).
/// If `fine` is true, use fine_step instead of step.
/// Returns true if the value actually changed.
pub fn adjust_param(source: &mut WaveSource, selected: usize, delta: i32, fine: bool) -> bool {
    let def = &PARAM_DEFS[selected];
    let old = (def.get)(source);
    let step = if fine { def.fine_step } else { def.step };
    let raw = old + delta as f64 * step;
    let new_val = if def.wrap { wrap_phase(raw) } else { raw.clamp(def.min, def.max) };
    (def.set)(source, new_val);
    (new_val - old).abs() > f64::EPSILON
}

/// Reset a parameter to its default value.
pub fn reset_param(source: &mut WaveSource, selected: usize) {
    let def = &PARAM_DEFS[selected];
    (def.set)(source, def.default);
}

pub fn toggle_active(source: &mut WaveSource) {
    source.active = !source.active;
}

/// Colors used in the overlay panel.
mod colors {
    pub const BORDER: [u8; 3] = [0x44, 0x44, 0x44];
    pub const LABEL_NORMAL: [u8; 3] = [0x88, 0x88, 0x88];
    pub const LABEL_SELECTED: [u8; 3] = [0xFF, 0xFF, 0xFF];
    pub const VALUE: [u8; 3] = [0xCC, 0xCC, 0xCC];
    pub const DESC_NORMAL: [u8; 3] = [0x66, 0x66, 0x66];
    pub const DESC_SELECTED: [u8; 3] = [0xAA, 0xAA, 0xAA];
    pub const HINT: [u8; 3] = [0x44, 0x88, 0x88];
    pub const INACTIVE: [u8; 3] = [0x77, 0x55, 0x55];
    pub const GAUGE_EMPTY: [u8; 3] = [0x22, 0x22, 0x22];
}

/// Darken a rectangular region of the buffer by multiplying RGB by `factor`.
fn darken_rect(buf: &mut [u8], frame_width: usize, x0: usize, y0: usize, w: usize, h: usize, factor: f64) {
    for y in y0..y0 + h {
        for x in x0..(x0 + w).min(frame_width) {
            let off = (y * frame_width + x) * 4;
            if off + 3 < buf.len() {
                for c in &mut buf[off..off + 3] {
                    *c = (*c as f64 * factor) as u8;
                }
            }
        }
    }
}

/// Draw a 1px border rectangle.
fn draw_rect_border(buf: &mut [u8], frame_width: usize, x0: usize, y0: usize, w: usize, h: usize, color: [u8; 3]) {
    if w == 0 || h == 0 {
        return;
    }
    let mut put = |x: usize, y: usize| {
        let off = (y * frame_width + x) * 4;
        if x < frame_width && off + 3 < buf.len() {
            buf[off..off + 4].copy_from_slice(&[color[0], color[1], color[2], 255]);
        }
    };
    for x in x0..x0 + w {
        put(x, y0);
        put(x, y0 + h - 1);
    }
    for y in y0..y0 + h {
        put(x0, y);
        put(x0 + w - 1, y);
    }
}

/// Gauge bar filled with a ramp of `accent`, from 40% to full brightness.
fn draw_gauge_scaled(buf: &mut [u8], frame_width: usize, x: usize, y: usize, ratio: f64, accent: [u8; 3], width_px: usize, height: usize) {
    let filled_px = ((ratio * width_px as f64).round() as usize).min(width_px);

    for dy in 0..height {
        for dx in 0..width_px {
            let px = x + dx;
            let off = ((y + dy) * frame_width + px) * 4;
            if px >= frame_width || off + 3 >= buf.len() {
                continue;
            }
            let rgb = if dx < filled_px {
                let t = 0.4 + 0.6 * dx as f64 / width_px as f64;
                accent.map(|c| (c as f64 * t) as u8)
            } else {
                colors::GAUGE_EMPTY
            };
            buf[off..off + 3].copy_from_slice(&rgb);
            buf[off + 3] = 255;
        }
    }
}

fn format_value(def: &ParamDef, val: f64) -> String {
    if def.wrap {
        // radians, then degrees
        format!("{:.2} {:>3.0}/360", val, val / TAU * 360.0)
    } else if def.step >= 0.5 {
        format!("{val:.1}")
    } else {
        format!("{val:.2}")
    }
}

/// Render the parameter panel for the selected source onto the frame buffer.
/// Does nothing if `state.visible` is false.
pub fn render_overlay(
    buf: &mut [u8],
    frame_width: usize,
    display_width: usize,
    display_height: usize,
    state: &OverlayState,
    sources: &[WaveSource],
) {
    if !state.visible {
        return;
    }

    // Font: 7x9 pixels (nearest-neighbor resize from 5x7)
    let cw: usize = 7;
    let ch: usize = 9;
    let sc = cw + cw / 5 + 1; // char step = 9px
    let row_h = ch + 4;
    let pad = 10;

    // "> freq   ########  1.50  frequency"
    let content_chars = 36;
    let panel_w = content_chars * sc + pad * 2;
    let panel_h = pad
        + row_h                         // header
        + 4                             // gap after header
        + PARAM_COUNT * row_h
        + 6                             // gap
        + row_h                         // description
        + 4                             // gap
        + (FONT_HEIGHT + 2)             // hints at 1x
        + pad;

    let panel_w = panel_w.min(display_width.saturating_sub(4));
    let panel_h = panel_h.min(display_height.saturating_sub(4));
    if panel_w < 2 * pad || panel_h < 2 * pad {
        return;
    }
    let px = display_width.saturating_sub(panel_w) / 2;
    let py = display_height.saturating_sub(panel_h) / 2;
    // Clip drawing to the panel so nothing spills into the status bar
    let clip = ((py + panel_h) * frame_width * 4).min(buf.len());
    let buf = &mut buf[..clip];

    darken_rect(buf, frame_width, px, py, panel_w, panel_h, 0.25);
    draw_rect_border(buf, frame_width, px, py, panel_w, panel_h, colors::BORDER);

    let left = px + pad;
    let mut cy = py + pad;

    let Some(index) = state.source_index(sources.len()) else {
        renderer::draw_text_sized(buf, frame_width, left, cy, "no sources", colors::LABEL_NORMAL, cw, ch);
        return;
    };
    let source = &sources[index];
    let accent = marker_style(index).color;

    // Header: "source s1  2/2  [on]"
    let mut cx = renderer::draw_text_sized(buf, frame_width, left, cy, "source ", colors::LABEL_NORMAL, cw, ch);
    cx = renderer::draw_text_sized(buf, frame_width, cx, cy, &source.label(), accent, cw, ch);
    let position = format!("  {}/{}  ", index + 1, sources.len());
    cx = renderer::draw_text_sized(buf, frame_width, cx, cy, &position, colors::DESC_NORMAL, cw, ch);
    let (flag, flag_color) = if source.active { ("[on]", accent) } else { ("[off]", colors::INACTIVE) };
    renderer::draw_text_sized(buf, frame_width, cx, cy, flag, flag_color, cw, ch);
    cy += row_h + 4;

    for (i, def) in PARAM_DEFS.iter().enumerate() {
        let is_sel = i == state.selected;
        let label_color = if is_sel { colors::LABEL_SELECTED } else { colors::LABEL_NORMAL };
        let desc_color = if is_sel { colors::DESC_SELECTED } else { colors::DESC_NORMAL };

        let mut cx = left;
        if is_sel {
            renderer::draw_text_sized(buf, frame_width, cx, cy, ">", accent, cw, ch);
        }
        cx += 2 * sc;

        renderer::draw_text_sized(buf, frame_width, cx, cy, def.name, label_color, cw, ch);
        cx = left + 8 * sc;

        let val = (def.get)(source);
        let ratio = if (def.max - def.min).abs() > f64::EPSILON {
            ((val - def.min) / (def.max - def.min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        draw_gauge_scaled(buf, frame_width, cx, cy, ratio, accent, GAUGE_WIDTH * sc, ch);
        cx += GAUGE_WIDTH * sc + sc;

        cx = renderer::draw_text_sized(buf, frame_width, cx, cy, &format_value(def, val), colors::VALUE, cw, ch);
        cx += sc;

        if !def.wrap {
            renderer::draw_text_sized(buf, frame_width, cx, cy, def.short, desc_color, cw, ch);
        }

        cy += row_h;
    }

    cy += 6;

    let sel_def = &PARAM_DEFS[state.selected.min(PARAM_COUNT - 1)];
    renderer::draw_text_sized(buf, frame_width, left, cy, sel_def.desc, colors::DESC_SELECTED, cw, ch);
    cy += row_h + 4;

    // Key hints (1x, smaller for visual hierarchy)
    renderer::draw_text(
        buf,
        frame_width,
        left,
        cy,
        "tab=src  ud=nav  lr=adj  ,.=fine  a=on/off  d=default",
        colors::HINT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::default_sources;

    // panel char step at 7x9
    const CHAR_STEP: usize = 9;

    fn source() -> WaveSource {
        WaveSource::new(1, 200.0, 300.0)
    }

    #[test]
    fn test_overlay_toggle() {
        let mut state = OverlayState::new();
        assert!(!state.visible);
        state.toggle();
        assert!(state.visible);
        state.toggle();
        assert!(!state.visible);
    }

    #[test]
    fn test_navigate_wraps() {
        let mut state = OverlayState::new();
        assert_eq!(state.selected, 0);
        state.navigate(-1);
        assert_eq!(state.selected, PARAM_COUNT - 1, "Should wrap to last");
        state.navigate(1);
        assert_eq!(state.selected, 0, "Should wrap back to first");
    }

    #[test]
    fn test_next_source_wraps() {
        let mut state = OverlayState::new();
        state.next_source(2);
        assert_eq!(state.source, 1);
        state.next_source(2);
        assert_eq!(state.source, 0);
        state.next_source(0);
        assert_eq!(state.source, 0);
    }

    #[test]
    fn test_source_index_clamps_to_list() {
        let state = OverlayState { source: 5, ..OverlayState::new() };
        assert_eq!(state.source_index(2), Some(1));
        assert_eq!(state.source_index(0), None);
    }

    #[test]
    fn test_param_get_set_roundtrip() {
        let mut s = source();
        for def in &PARAM_DEFS {
            let new_val = (def.min + def.max) / 2.0;
            (def.set)(&mut s, new_val);
            assert!(((def.get)(&s) - new_val).abs() < 1e-10, "param {} get/set roundtrip failed", def.name);
        }
    }

    #[test]
    fn test_param_defaults_match_source_defaults() {
        let defaults = source();
        for def in &PARAM_DEFS {
            let val = (def.get)(&defaults);
            assert!(
                (val - def.default).abs() < 1e-10,
                "PARAM_DEFS.default for {} ({}) doesn't match WaveSource::new ({})",
                def.name,
                def.default,
                val
            );
        }
    }

    #[test]
    fn test_adjust_clamps() {
        let mut s = source();

        s.amplitude = 0.0;
        assert!(!adjust_param(&mut s, 0, -1, false), "Should not change when at min");
        assert_eq!(s.amplitude, 0.0);

        s.amplitude = 10.0;
        assert!(!adjust_param(&mut s, 0, 1, false), "Should not change when at max");
        assert_eq!(s.amplitude, 10.0);

        s.frequency = 0.5;
        assert!(!adjust_param(&mut s, 1, -3, true));
        assert_eq!(s.frequency, 0.5);
    }

    #[test]
    fn test_adjust_steps() {
        let mut s = source();
        assert!(adjust_param(&mut s, 0, 1, false));
        assert!((s.amplitude - 5.5).abs() < 1e-12);
        assert!(adjust_param(&mut s, 1, -1, true));
        assert!((s.frequency - 1.49).abs() < 1e-12);
    }

    #[test]
    fn test_phase_wraps_instead_of_clamping() {
        let mut s = source();
        assert!(adjust_param(&mut s, 2, -1, false));
        assert!((s.phase - (TAU - PI / 16.0)).abs() < 1e-12);
        assert!(adjust_param(&mut s, 2, 1, false));
        // back at a full turn, wrapped to 0 or rounded just below 2pi
        assert!(s.phase < 1e-12 || TAU - s.phase < 1e-12, "phase = {}", s.phase);
    }

    #[test]
    fn test_reset_restores_default() {
        let mut s = source();
        s.frequency = 4.2;
        reset_param(&mut s, 1);
        assert_eq!(s.frequency, 1.5);
    }

    #[test]
    fn test_toggle_active() {
        let mut s = source();
        toggle_active(&mut s);
        assert!(!s.active);
        toggle_active(&mut s);
        assert!(s.active);
    }

    #[test]
    fn test_darken_reduces_brightness() {
        let w = 10;
        let h = 10;
        let mut buf = vec![128u8; w * h * 4];
        for i in 0..w * h {
            buf[i * 4 + 3] = 255;
        }

        darken_rect(&mut buf, w, 2, 2, 4, 4, 0.25);

        let off = (3 * w + 3) * 4;
        assert!(buf[off] < 40, "R should be darkened: got {}", buf[off]);
        assert_eq!(buf[off + 3], 255, "alpha is untouched");
        assert_eq!(buf[0], 128, "Outside area should be unchanged");
    }

    #[test]
    fn test_gauge_empty_full() {
        let w = 200;
        let h = 20;
        let mut buf_empty = vec![0u8; w * h * 4];
        let mut buf_full = vec![0u8; w * h * 4];
        let accent = [56, 189, 248];

        draw_gauge_scaled(&mut buf_empty, w, 4, 4, 0.0, accent, GAUGE_WIDTH * CHAR_STEP, FONT_HEIGHT);
        draw_gauge_scaled(&mut buf_full, w, 4, 4, 1.0, accent, GAUGE_WIDTH * CHAR_STEP, FONT_HEIGHT);

        let off = (4 * w + 4) * 4;
        assert_eq!(buf_empty[off], 0x22, "Empty gauge should be #22 at start");
        assert!(buf_full[off + 2] > 0x22, "Full gauge should carry the accent");
    }

    #[test]
    fn test_overlay_invisible_noop() {
        let (w, h) = (600, 600);
        let mut buf = vec![42u8; w * h * 4];
        let orig = buf.clone();
        let state = OverlayState::new();

        render_overlay(&mut buf, w, w, h, &state, &default_sources());

        assert_eq!(buf, orig, "Invisible overlay should not modify buffer");
    }

    #[test]
    fn test_overlay_stays_inside_display() {
        let (w, h, bar) = (600, 600, 12);
        let mut buf = vec![42u8; w * (h + bar) * 4];
        let state = OverlayState { visible: true, ..OverlayState::new() };

        render_overlay(&mut buf, w, w, h, &state, &default_sources());

        assert!(buf[..w * h * 4].iter().any(|&b| b != 42), "panel should be drawn");
        assert!(buf[w * h * 4..].iter().all(|&b| b == 42), "status bar rows untouched");
    }

    #[test]
    fn test_overlay_without_sources() {
        let (w, h) = (400, 300);
        let mut buf = vec![42u8; w * h * 4];
        let state = OverlayState { visible: true, ..OverlayState::new() };
        render_overlay(&mut buf, w, w, h, &state, &[]);
        assert!(buf.iter().any(|&b| b != 42));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&PARAM_DEFS[0], 5.0), "5.0");
        assert_eq!(format_value(&PARAM_DEFS[1], 1.5), "1.50");
        assert_eq!(format_value(&PARAM_DEFS[2], PI), "3.14 180/360");
    }
}
