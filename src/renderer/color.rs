/// Map a normalized displacement in [-1, 1] to a gray level.
/// -1 (trough) -> 0, 0 -> 127, +1 (crest) -> 255.
#[inline]
pub fn intensity(normalized: f64) -> u8 {
    let v = normalized.clamp(-1.0, 1.0);
    ((v + 1.0) * 127.5).floor() as u8
}

/// Opaque gray RGBA pixel.
#[inline]
pub fn gray_rgba(level: u8) -> [u8; 4] {
    [level, level, level, 255]
}

/// Per-source marker colors, indexed by position in the source list.
/// Sky and indigo for the first two sources, then four more accents.
pub(crate) const MARKER_PALETTE: [[u8; 3]; 6] = [
    [56, 189, 248],  // sky
    [129, 140, 248], // indigo
    [52, 211, 153],  // emerald
    [251, 191, 36],  // amber
    [244, 114, 182], // pink
    [248, 113, 113], // red
];

/// Visual style of one source marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerStyle {
    pub color: [u8; 3],
}

/// Style for the source at `index`. Indices past the palette wrap around.
pub fn marker_style(index: usize) -> MarkerStyle {
    MarkerStyle {
        color: MARKER_PALETTE[index % MARKER_PALETTE.len()],
    }
}

/// Legend swatch colors.
pub(crate) const CREST: [u8; 3] = [255, 255, 255];
pub(crate) const TROUGH: [u8; 3] = [0, 0, 0];
pub(crate) const SWATCH_BORDER: [u8; 3] = [0x77, 0x77, 0x77];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_extremes() {
        assert_eq!(intensity(-1.0), 0);
        assert_eq!(intensity(1.0), 255);
    }

    #[test]
    fn test_intensity_neutral_is_midpoint() {
        assert_eq!(intensity(0.0), 127);
        assert_eq!(intensity(-0.0), 127);
    }

    #[test]
    fn test_intensity_clamps_overshoot() {
        assert_eq!(intensity(1.0 + 1e-12), 255);
        assert_eq!(intensity(-1.5), 0);
    }

    #[test]
    fn test_intensity_monotonic() {
        let steps = 512;
        let mut prev = intensity(-1.0);
        for i in 1..=steps {
            let v = -1.0 + 2.0 * i as f64 / steps as f64;
            let cur = intensity(v);
            assert!(cur >= prev, "intensity dropped at v={v}: {prev} -> {cur}");
            prev = cur;
        }
    }

    #[test]
    fn test_gray_rgba_is_opaque() {
        assert_eq!(gray_rgba(42), [42, 42, 42, 255]);
    }

    #[test]
    fn test_first_two_marker_colors() {
        assert_eq!(marker_style(0).color, [56, 189, 248]);
        assert_eq!(marker_style(1).color, [129, 140, 248]);
    }

    #[test]
    fn test_marker_style_wraps() {
        let n = MARKER_PALETTE.len();
        assert_eq!(marker_style(n), marker_style(0));
        assert_eq!(marker_style(n + 3), marker_style(3));
    }

    #[test]
    fn test_marker_palette_distinct() {
        for i in 0..MARKER_PALETTE.len() {
            for j in (i + 1)..MARKER_PALETTE.len() {
                assert_ne!(MARKER_PALETTE[i], MARKER_PALETTE[j]);
            }
        }
    }
}
