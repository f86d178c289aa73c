mod canvas;
mod color;
mod font;

// Re-export public API
pub use canvas::Canvas;
pub use color::{gray_rgba, intensity, marker_style, MarkerStyle};
pub use font::STATUS_BAR_HEIGHT;
pub(crate) use font::{draw_text, draw_text_sized, FONT_HEIGHT};

use std::ops::Range;

use crate::error::{RenderError, SurfaceError};
use crate::physics::{frame_terms, normalize};
use crate::state::WaveSource;

/// Default downsampling factor: one field sample per 4x4 pixel block.
pub const DEFAULT_SCALE: usize = 4;

/// Something the frame driver can draw into and hand back to the host.
///
/// `pixels_mut` must expose exactly `width * height * 4` RGBA bytes for the
/// size last returned by `size`, row-major with no padding.
pub trait RenderSurface {
    /// Current pixel size. `Err(SurfaceError::Lost)` means the surface is gone for good.
    fn size(&mut self) -> Result<(usize, usize), SurfaceError>;

    /// Called once per frame, before any drawing, with the simulation time the frame samples.
    fn begin_frame(&mut self, _time: f64) {}

    fn pixels_mut(&mut self) -> &mut [u8];

    /// Stroke a circle centred on (cx, cy). Pixels outside the surface are dropped.
    fn draw_ring(&mut self, cx: f64, cy: f64, radius: f64, color: [u8; 3]);

    /// Draw `text` with its baseline-left corner at (x, y).
    fn draw_label(&mut self, x: f64, y: f64, text: &str, color: [u8; 3]);

    fn present(&mut self) -> Result<(), SurfaceError>;
}

/// Sampling grid for one surface size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldGrid {
    pub width: usize,
    pub height: usize,
    pub scale: usize,
    pub cols: usize,
    pub rows: usize,
}

impl FieldGrid {
    /// Grid for a `width` x `height` surface. `None` for a zero-sized surface.
    /// A scale of 0 is treated as 1.
    pub fn new(width: usize, height: usize, scale: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let scale = scale.max(1);
        Some(Self {
            width,
            height,
            scale,
            cols: width / scale,
            rows: height / scale,
        })
    }

    /// Bytes needed for an RGBA buffer of this size.
    pub fn pixel_len(&self) -> usize {
        self.width * self.height * 4
    }

    pub fn cells(&self) -> usize {
        self.cols * self.rows
    }

    /// Pixel columns filled by grid column `gx`. The last column absorbs the
    /// leftover pixels up to the right edge.
    fn col_span(&self, gx: usize) -> Range<usize> {
        let start = gx * self.scale;
        let end = if gx + 1 == self.cols { self.width } else { start + self.scale };
        start..end
    }

    fn row_span(&self, gy: usize) -> Range<usize> {
        let start = gy * self.scale;
        let end = if gy + 1 == self.rows { self.height } else { start + self.scale };
        start..end
    }
}

/// What one rasterized frame contained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldStats {
    pub cols: usize,
    pub rows: usize,
    pub cells: usize,
    /// Sources that fed the field this frame.
    pub contributing: usize,
    /// Active sources dropped for invalid parameters.
    pub skipped: usize,
}

/// Rasterize the interference field at time `t` into `buf`.
///
/// Every pixel of `grid.width` x `grid.height` is overwritten; bytes past
/// `grid.pixel_len()` are left alone.
pub fn render_field(
    buf: &mut [u8],
    grid: &FieldGrid,
    t: f64,
    sources: &[WaveSource],
    wave_speed: f64,
) -> Result<FieldStats, RenderError> {
    let needed = grid.pixel_len();
    if buf.len() < needed {
        return Err(RenderError::BufferTooSmall { needed, got: buf.len() });
    }
    Ok(fill_field(&mut buf[..needed], grid, t, sources, wave_speed))
}

fn fill_field(buf: &mut [u8], grid: &FieldGrid, t: f64, sources: &[WaveSource], wave_speed: f64) -> FieldStats {
    let (terms, skipped) = frame_terms(sources, t, wave_speed);
    let stats = FieldStats {
        cols: grid.cols,
        rows: grid.rows,
        cells: grid.cells(),
        contributing: terms.len(),
        skipped,
    };

    let max_amplitude: f64 = terms.iter().map(|term| term.amplitude()).sum();

    // Smaller than a single cell: the surface is one partial cell sampled at the origin
    if grid.cols == 0 || grid.rows == 0 {
        let total: f64 = terms.iter().map(|term| term.eval(0.0, 0.0)).sum();
        let rgba = gray_rgba(intensity(normalize(total, max_amplitude)));
        for px in buf.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        return stats;
    }

    let stride = grid.width * 4;

    for gy in 0..grid.rows {
        let rows = grid.row_span(gy);
        let first = rows.start * stride;
        let sy = (gy * grid.scale) as f64;

        // Fill the first pixel row of the block row, then replicate it downward
        for gx in 0..grid.cols {
            let sx = (gx * grid.scale) as f64;
            let total: f64 = terms.iter().map(|term| term.eval(sx, sy)).sum();
            let rgba = gray_rgba(intensity(normalize(total, max_amplitude)));

            let cols = grid.col_span(gx);
            let line = &mut buf[first + cols.start * 4..first + cols.end * 4];
            for px in line.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }

        for y in rows.start + 1..rows.end {
            buf.copy_within(first..first + stride, y * stride);
        }
    }

    stats
}

/// Rasterize into a freshly allocated buffer of `grid.pixel_len()` bytes.
pub fn render(grid: &FieldGrid, t: f64, sources: &[WaveSource], wave_speed: f64) -> Vec<u8> {
    let mut buf = vec![0u8; grid.pixel_len()];
    fill_field(&mut buf, grid, t, sources, wave_speed);
    buf
}
