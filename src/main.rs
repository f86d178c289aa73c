use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wavarium::overlay::{self, OverlayState};
use wavarium::renderer::STATUS_BAR_HEIGHT;
use wavarium::{config, Canvas, Controls, DriverError, FrameDriver, ParameterBridge, RenderSurface, SurfaceError, TickOutcome, WaveSource};

/// How often the window is polled for input. The driver throttles rendering on its own.
const POLL_FPS: usize = 120;

/// Convert RGBA &[u8] buffer to 0RGB &[u32] buffer for minifb.
fn rgba_to_argb(rgba: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

fn format_status(controls: &Controls, time: f64, panel_visible: bool) -> String {
    let run = if controls.paused { "paused " } else { "running" };
    let mut status = format!("{run}  t={time:.1}");
    for s in &controls.sources {
        if s.active {
            status.push_str(&format!("  {} a={:.1} f={:.2} p={:.2}", s.label(), s.amplitude, s.frequency, s.phase));
        } else {
            status.push_str(&format!("  {} off", s.label()));
        }
    }
    if !panel_visible {
        status.push_str("  | space=panel p=pause r=reset");
    }
    status
}

/// minifb window as a render surface. Status bar, legend and parameter panel
/// are composited on present.
struct WindowSurface {
    window: Window,
    canvas: Canvas,
    argb: Vec<u32>,
    bridge: ParameterBridge,
    overlay: OverlayState,
    status: String,
}

impl WindowSurface {
    fn new(window: Window, bridge: ParameterBridge) -> Self {
        let (w, h) = window.get_size();
        let mut canvas = Canvas::with_status_bar(0, 0);
        canvas.resize_frame(w, h);
        Self {
            window,
            argb: vec![0; canvas.width() * canvas.frame_height()],
            canvas,
            bridge,
            overlay: OverlayState::new(),
            status: String::new(),
        }
    }
}

impl RenderSurface for WindowSurface {
    fn size(&mut self) -> Result<(usize, usize), SurfaceError> {
        if !self.window.is_open() {
            return Err(SurfaceError::Lost);
        }
        let (w, h) = self.window.get_size();
        if w != self.canvas.width() || h != self.canvas.frame_height() {
            self.canvas.resize_frame(w, h);
            self.argb.resize(self.canvas.width() * self.canvas.frame_height(), 0);
        }
        Ok((self.canvas.width(), self.canvas.height()))
    }

    fn begin_frame(&mut self, time: f64) {
        self.status = format_status(&self.bridge.snapshot(), time, self.overlay.visible);
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        self.canvas.pixels_mut()
    }

    fn draw_ring(&mut self, cx: f64, cy: f64, radius: f64, color: [u8; 3]) {
        self.canvas.draw_ring(cx, cy, radius, color);
    }

    fn draw_label(&mut self, x: f64, y: f64, text: &str, color: [u8; 3]) {
        self.canvas.draw_label(x, y, text, color);
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if !self.window.is_open() {
            return Err(SurfaceError::Lost);
        }
        let controls = self.bridge.snapshot();
        let (w, h) = (self.canvas.width(), self.canvas.height());

        self.canvas.render_legend();
        self.canvas.render_status(&self.status);
        overlay::render_overlay(self.canvas.frame_mut(), w, w, h, &self.overlay, &controls.sources);

        rgba_to_argb(self.canvas.frame(), &mut self.argb);
        self.window
            .update_with_buffer(&self.argb, w, self.canvas.frame_height())
            .map_err(|e| SurfaceError::Present(e.to_string()))
    }
}

/// Apply `edit` to a copy of the source selected in the panel and publish it if it changed.
fn edit_selected(bridge: &ParameterBridge, panel: &OverlayState, edit: impl FnOnce(&mut WaveSource) -> bool) {
    let controls = bridge.snapshot();
    let Some(index) = panel.source_index(controls.sources.len()) else {
        return;
    };
    let mut source = controls.sources[index];
    if edit(&mut source) {
        bridge.replace_source(source);
    }
}

/// Returns false when the app should quit.
fn handle_keys(surface: &mut WindowSurface, bridge: &ParameterBridge) -> bool {
    let window = &surface.window;
    let panel = &mut surface.overlay;

    // Escape: close panel first, then quit app
    if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
        if panel.visible {
            panel.visible = false;
        } else {
            return false;
        }
    }

    if window.is_key_pressed(Key::Space, KeyRepeat::No) {
        panel.toggle();
    }
    if window.is_key_pressed(Key::P, KeyRepeat::No) {
        bridge.toggle_paused();
    }
    if window.is_key_pressed(Key::R, KeyRepeat::No) {
        bridge.reset();
    }

    if !panel.visible {
        return true;
    }

    if window.is_key_pressed(Key::Tab, KeyRepeat::No) {
        panel.next_source(bridge.snapshot().sources.len());
    }
    if window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
        panel.navigate(-1);
    }
    if window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
        panel.navigate(1);
    }

    let selected = panel.selected;
    let adjustments = [(Key::Left, -1, false), (Key::Right, 1, false), (Key::Comma, -1, true), (Key::Period, 1, true)];
    for (key, delta, fine) in adjustments {
        if window.is_key_pressed(key, KeyRepeat::Yes) {
            edit_selected(bridge, panel, |s| overlay::adjust_param(s, selected, delta, fine));
        }
    }

    if window.is_key_pressed(Key::A, KeyRepeat::No) {
        edit_selected(bridge, panel, |s| {
            overlay::toggle_active(s);
            true
        });
    }
    if window.is_key_pressed(Key::D, KeyRepeat::No) {
        edit_selected(bridge, panel, |s| {
            overlay::reset_param(s, selected);
            true
        });
    }

    true
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cfg = config::load();
    let bridge = ParameterBridge::new(cfg.sources());
    let driver_cfg = cfg.driver_config();
    let mut driver = FrameDriver::new(bridge.clone(), driver_cfg);

    let mut window = Window::new(
        "wavarium",
        cfg.display.width,
        cfg.display.height + STATUS_BAR_HEIGHT,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(POLL_FPS);

    // Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    info!(
        width = cfg.display.width,
        height = cfg.display.height,
        target_fps = driver_cfg.target_fps,
        scale = driver_cfg.scale,
        sources = bridge.snapshot().sources.len(),
        "starting"
    );

    let mut surface = WindowSurface::new(window, bridge.clone());
    let mut last_tick = Instant::now();
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();

    while running.load(Ordering::SeqCst) {
        if !handle_keys(&mut surface, &bridge) {
            break;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;

        match driver.tick(elapsed, &mut surface) {
            Ok(TickOutcome::Rendered(_)) => frame_count += 1,
            Ok(TickOutcome::Stopped) | Err(DriverError::SurfaceLost(_)) => break,
            // Nothing was presented; keep the window pumping input events
            Ok(TickOutcome::Throttled | TickOutcome::Skipped(_)) => surface.window.update(),
            Err(e) => return Err(e.into()),
        }

        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let display_fps = frame_count;
            frame_count = 0;
            last_fps_time = now;
            surface.window.set_title(&format!("wavarium - {display_fps} fps"));
        }
    }

    info!(frames = driver.frame_count(), time = driver.time(), "shutting down");
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_argb() {
        let rgba = [0x11, 0x22, 0x33, 0xFF, 0xAA, 0xBB, 0xCC, 0x00];
        let mut out = [0u32; 2];
        rgba_to_argb(&rgba, &mut out);
        assert_eq!(out, [0x112233, 0xAABBCC]);
    }

    #[test]
    fn test_format_status_running() {
        let controls = Controls::default();
        let status = format_status(&controls, 12.34, false);
        assert!(status.starts_with("running  t=12.3"));
        assert!(status.contains("S1 a=5.0 f=1.50 p=0.00"));
        assert!(status.contains("S2 a=5.0"));
        assert!(status.ends_with("space=panel p=pause r=reset"));
    }

    #[test]
    fn test_format_status_paused_inactive_panel() {
        let mut controls = Controls::default();
        controls.paused = true;
        controls.sources[1].active = false;
        let status = format_status(&controls, 0.0, true);
        assert!(status.starts_with("paused"));
        assert!(status.contains("S2 off"));
        assert!(!status.contains("space=panel"));
    }

    #[test]
    fn test_status_uses_only_drawable_glyphs() {
        let status = format_status(&Controls::default(), 3.0, false);
        assert!(status.bytes().all(|b| b == b' ' || b == b'S' || b.is_ascii_lowercase() || b.is_ascii_digit() || b"=.|".contains(&b)));
    }

    #[test]
    fn test_edit_selected_publishes_whole_record() {
        let bridge = ParameterBridge::default();
        let mut panel = OverlayState::new();
        panel.next_source(2);
        edit_selected(&bridge, &panel, |s| overlay::adjust_param(s, 0, 1, false));
        let snap = bridge.snapshot();
        assert_eq!(snap.sources[0].amplitude, 5.0);
        assert_eq!(snap.sources[1].amplitude, 5.5);
    }

    #[test]
    fn test_edit_selected_skips_unchanged() {
        let bridge = ParameterBridge::default();
        let before = bridge.snapshot();
        let panel = OverlayState::new();
        edit_selected(&bridge, &panel, |_| false);
        assert!(Arc::ptr_eq(&before, &bridge.snapshot()));
    }
}
