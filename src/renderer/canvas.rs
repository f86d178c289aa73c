use super::color::{CREST, SWATCH_BORDER, TROUGH};
use super::font::{draw_char, draw_text, draw_text_clipped, text_width, FONT_HEIGHT, FONT_WIDTH, STATUS_BAR_HEIGHT, STATUS_PAD_TOP};
use super::RenderSurface;
use crate::error::SurfaceError;

/// Ring stroke half-width in pixels.
const RING_HALF_STROKE: f64 = 1.0;

/// In-memory RGBA surface: the field area on top, an optional status bar below.
///
/// The field area is what [`RenderSurface`] exposes; the status bar and legend
/// are drawn by the host between ticks.
pub struct Canvas {
    width: usize,
    height: usize,
    status_bar: bool,
    buf: Vec<u8>,
    presented: u64,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self::build(width, height, false)
    }

    /// Canvas with a status bar of `STATUS_BAR_HEIGHT` rows under the field.
    pub fn with_status_bar(width: usize, height: usize) -> Self {
        Self::build(width, height, true)
    }

    fn build(width: usize, height: usize, status_bar: bool) -> Self {
        let mut canvas = Self {
            width,
            height,
            status_bar,
            buf: Vec::new(),
            presented: 0,
        };
        canvas.buf.resize(canvas.frame_len(), 0);
        canvas
    }

    /// Resize the field area. Existing content is cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let len = self.frame_len();
        self.buf.clear();
        self.buf.resize(len, 0);
    }

    /// Resize so the whole frame, status bar included, is `frame_width` x `frame_height`.
    pub fn resize_frame(&mut self, frame_width: usize, frame_height: usize) {
        let bar = if self.status_bar { STATUS_BAR_HEIGHT } else { 0 };
        self.resize(frame_width, frame_height.saturating_sub(bar));
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the field area.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height of the whole frame, status bar included.
    pub fn frame_height(&self) -> usize {
        if self.status_bar { self.height + STATUS_BAR_HEIGHT } else { self.height }
    }

    fn frame_len(&self) -> usize {
        self.width * self.frame_height() * 4
    }

    fn field_len(&self) -> usize {
        self.width * self.height * 4
    }

    /// The whole RGBA frame, status bar included.
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Number of successful `present` calls.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.frame_height() {
            return None;
        }
        let off = (y * self.width + x) * 4;
        Some([self.buf[off], self.buf[off + 1], self.buf[off + 2], self.buf[off + 3]])
    }

    fn put_field_pixel(&mut self, x: usize, y: usize, color: [u8; 3]) {
        if x < self.width && y < self.height {
            let off = (y * self.width + x) * 4;
            self.buf[off..off + 4].copy_from_slice(&[color[0], color[1], color[2], 255]);
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.put_field_pixel(px, py, color);
            }
        }
    }

    /// Draw the status line into the bar under the field. No-op without a status bar.
    pub fn render_status(&mut self, text: &str) {
        if !self.status_bar {
            return;
        }
        let fw = self.width;
        let y_start = self.height;
        let frame_height = self.frame_height();
        let buf = &mut self.buf;

        // Fill status bar background (#0D0D0D)
        for px in buf[y_start * fw * 4..frame_height * fw * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&[0x0D, 0x0D, 0x0D, 255]);
        }

        // Separator line (#333333)
        for px in buf[y_start * fw * 4..(y_start + 1) * fw * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&[0x33, 0x33, 0x33, 255]);
        }

        let text_y = y_start + STATUS_PAD_TOP;
        let text_color: [u8; 3] = [0x88, 0x88, 0x88];
        let char_step = FONT_WIDTH + 1;
        let mut cx = 4;
        for &ch in text.as_bytes() {
            if cx + FONT_WIDTH > fw {
                break;
            }
            draw_char(buf, fw, cx, text_y, ch, text_color);
            cx += char_step;
        }
    }

    /// Crest/trough key in the top-right corner of the field.
    pub fn render_legend(&mut self) {
        const SWATCH: usize = FONT_HEIGHT;
        const PAD: usize = 4;
        let entries: [(&str, [u8; 3]); 2] = [("crest +a", CREST), ("trough -a", TROUGH)];

        let label_w = entries.iter().map(|(label, _)| text_width(label)).max().unwrap_or(0);
        let box_w = PAD + SWATCH + PAD + label_w + PAD;
        let box_h = PAD + entries.len() * (SWATCH + PAD);
        if box_w + PAD > self.width || box_h + PAD > self.height {
            return;
        }
        let x0 = self.width - box_w - PAD;
        let y0 = PAD;

        self.fill_rect(x0, y0, box_w, box_h, [0x16, 0x16, 0x1E]);
        for (i, (label, color)) in entries.iter().enumerate() {
            let sy = y0 + PAD + i * (SWATCH + PAD);
            let sx = x0 + PAD;
            self.fill_rect(sx, sy, SWATCH, SWATCH, SWATCH_BORDER);
            self.fill_rect(sx + 1, sy + 1, SWATCH - 2, SWATCH - 2, *color);
            let field_len = self.field_len();
            draw_text(&mut self.buf[..field_len], self.width, sx + SWATCH + PAD, sy, label, [0xC0, 0xC0, 0xC0]);
        }
    }
}

impl RenderSurface for Canvas {
    fn size(&mut self) -> Result<(usize, usize), SurfaceError> {
        Ok((self.width, self.height))
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        let len = self.field_len();
        &mut self.buf[..len]
    }

    fn draw_ring(&mut self, cx: f64, cy: f64, radius: f64, color: [u8; 3]) {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || radius < 0.0 {
            return;
        }
        let outer = radius + RING_HALF_STROKE;
        let x_min = (cx - outer).floor().max(0.0) as usize;
        let y_min = (cy - outer).floor().max(0.0) as usize;
        let x_max = ((cx + outer).ceil().max(0.0) as usize).min(self.width);
        let y_max = ((cy + outer).ceil().max(0.0) as usize).min(self.height);

        for y in y_min..y_max {
            for x in x_min..x_max {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if (d - radius).abs() <= RING_HALF_STROKE {
                    self.put_field_pixel(x, y, color);
                }
            }
        }
    }

    fn draw_label(&mut self, x: f64, y: f64, text: &str, color: [u8; 3]) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let left = x.floor();
        let top = (y - FONT_HEIGHT as f64).floor();
        if left >= self.width as f64 || top >= self.height as f64 {
            return;
        }
        let field_len = self.field_len();
        draw_text_clipped(&mut self.buf[..field_len], self.width, left as i64, top as i64, text, color);
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];

    #[test]
    fn test_buffer_sizes() {
        let canvas = Canvas::new(30, 20);
        assert_eq!(canvas.frame().len(), 30 * 20 * 4);

        let mut canvas = Canvas::with_status_bar(30, 20);
        assert_eq!(canvas.frame_height(), 20 + STATUS_BAR_HEIGHT);
        assert_eq!(canvas.pixels_mut().len(), 30 * 20 * 4);
        assert_eq!(canvas.frame().len(), 30 * (20 + STATUS_BAR_HEIGHT) * 4);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut canvas = Canvas::with_status_bar(10, 10);
        canvas.resize(40, 25);
        assert_eq!(canvas.size().unwrap(), (40, 25));
        assert_eq!(canvas.frame().len(), 40 * (25 + STATUS_BAR_HEIGHT) * 4);
    }

    #[test]
    fn test_resize_frame_reserves_status_bar() {
        let mut canvas = Canvas::with_status_bar(10, 10);
        canvas.resize_frame(300, 212);
        assert_eq!(canvas.size().unwrap(), (300, 212 - STATUS_BAR_HEIGHT));
        assert_eq!(canvas.frame_height(), 212);

        // a window shorter than the bar leaves an empty field
        canvas.resize_frame(300, 5);
        assert_eq!(canvas.size().unwrap(), (300, 0));
    }

    #[test]
    fn test_ring_stroke_hits_radius() {
        let mut canvas = Canvas::new(40, 40);
        canvas.draw_ring(20.0, 20.0, 5.0, RED);
        assert_eq!(canvas.pixel(25, 20), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(20, 15), Some([255, 0, 0, 255]));
        // centre stays empty
        assert_eq!(canvas.pixel(20, 20), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_ring_clipped_at_edges() {
        let mut canvas = Canvas::with_status_bar(10, 10);
        canvas.draw_ring(0.0, 9.0, 6.0, RED);
        canvas.draw_ring(-50.0, -50.0, 3.0, RED);
        // the status bar rows are outside the field and never touched
        for y in 10..canvas.frame_height() {
            for x in 0..10 {
                assert_eq!(canvas.pixel(x, y), Some([0, 0, 0, 0]));
            }
        }
    }

    #[test]
    fn test_label_drawn_above_anchor() {
        let mut canvas = Canvas::new(60, 30);
        canvas.draw_label(10.0, 20.0, "S1", RED);
        let lit: Vec<(usize, usize)> = (0..30)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some([255, 0, 0, 255]))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| x >= 10 && (13..20).contains(&y)));
    }

    #[test]
    fn test_label_partly_left_of_surface_is_clipped() {
        let mut clipped = Canvas::new(60, 30);
        clipped.draw_label(-6.0, 20.0, "11", RED);
        let mut expected = Canvas::new(60, 30);
        expected.draw_label(0.0, 20.0, "1", RED);
        assert_eq!(clipped.frame(), expected.frame());
    }

    #[test]
    fn test_label_off_surface_is_ignored() {
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_label(500.0, 10.0, "S1", RED);
        canvas.draw_label(f64::NAN, 10.0, "S1", RED);
        canvas.draw_label(-40.0, 10.0, "S1", RED);
        canvas.draw_label(5.0, -2.0, "S1", RED);
        assert!(canvas.frame().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_status_bar_background_and_separator() {
        let mut canvas = Canvas::with_status_bar(80, 10);
        canvas.render_status("running");
        assert_eq!(canvas.pixel(0, 10), Some([0x33, 0x33, 0x33, 255]));
        assert_eq!(canvas.pixel(79, 10 + STATUS_BAR_HEIGHT - 1), Some([0x0D, 0x0D, 0x0D, 255]));
        // field untouched
        assert_eq!(canvas.pixel(0, 9), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_status_without_bar_is_noop() {
        let mut canvas = Canvas::new(80, 10);
        canvas.render_status("running");
        assert!(canvas.frame().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_legend_has_crest_and_trough_swatches() {
        let mut canvas = Canvas::new(200, 100);
        canvas.render_legend();
        let mut has_crest = false;
        let mut has_trough = false;
        for y in 0..40 {
            for x in 100..200 {
                match canvas.pixel(x, y) {
                    Some([255, 255, 255, 255]) => has_crest = true,
                    Some([0, 0, 0, 255]) => has_trough = true,
                    _ => {}
                }
            }
        }
        assert!(has_crest && has_trough);
    }

    #[test]
    fn test_legend_skipped_on_tiny_canvas() {
        let mut canvas = Canvas::new(12, 12);
        canvas.render_legend();
        assert!(canvas.frame().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_present_counts() {
        let mut canvas = Canvas::new(4, 4);
        canvas.present().unwrap();
        canvas.present().unwrap();
        assert_eq!(canvas.presented(), 2);
    }
}
