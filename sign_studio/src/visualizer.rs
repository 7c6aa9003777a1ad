//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ POSE / HANDS / ACTIVE …                    [cooldown bar]   │
//! │                                                             │
//! │        [hand skeleton + target brackets]                    │
//! │        [technique overlay, composited additively]           │
//! │                                                             │
//! │ status bar                                                  │
//! │ key legend                                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::anyhow;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use hand_model::synth::HandShape;
use hand_model::{Hand, TimeMs};

use crate::app::{AppConfig, AppState};
use crate::tracking::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR: u32 = 0xFF10101C;
const HUD_TEXT: u32 = 0xFFEAEAEA;
const HUD_DIM: u32 = 0xFF8A8A9A;
const ACCENT: u32 = 0xFF00E5FF;
const BAR_BG: u32 = 0xFF25253A;
const BAR_FILL: u32 = 0xFFFFC832;
const SKELETON: u32 = 0xFF2E8B57;
const JOINT: u32 = 0xFF00CCCC;
const STATUS_BG: u32 = 0xFF181830;

/// Bone list for the 21-landmark topology: thumb, index, middle, ring,
/// pinky chains plus the palm arcs.
const BONES: [(usize, usize); 23] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (0, 9), (9, 10), (10, 11), (11, 12),
    (0, 13), (13, 14), (14, 15), (15, 16),
    (0, 17), (17, 18), (18, 19), (19, 20),
    (5, 9), (9, 13), (13, 17),
];

/// What one round of input polling asked the app to do.
#[derive(Debug, Default)]
pub struct InputPoll {
    pub quit: bool,
    pub stop_all: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    width: usize,
    height: usize,
    sim_tx: Sender<SimInput>,
    show_skeleton: bool,

    // fps bookkeeping
    frames: u32,
    fps: u32,
    fps_mark: Instant,
}

impl Visualizer {
    pub fn new(cfg: &AppConfig, sim_tx: Sender<SimInput>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Sign Studio",
            cfg.width,
            cfg.height,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| anyhow!("{e}"))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; cfg.width * cfg.height],
            width: cfg.width,
            height: cfg.height,
            sim_tx,
            show_skeleton: cfg.show_skeleton,
            frames: 0,
            fps: 0,
            fps_mark: Instant::now(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input: shape keys feed the simulation channel, the
    /// rest come back as app commands.
    pub fn poll_input(&mut self) -> InputPoll {
        let mut poll = InputPoll::default();
        if !self.window.is_open() {
            poll.quit = true;
            return poll;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if one_shot(&self.window, Key::Q) {
            poll.quit = true;
            return poll;
        }
        if one_shot(&self.window, Key::D) {
            self.show_skeleton = !self.show_skeleton;
        }
        if one_shot(&self.window, Key::X) {
            poll.stop_all = true;
        }

        let shape_keys = [
            (Key::Key1, Some(HandShape::Fist)),
            (Key::Key2, Some(HandShape::TwoFingers)),
            (Key::Key3, Some(HandShape::Open)),
            (Key::Key4, Some(HandShape::Pinch)),
            (Key::Key0, None),
        ];
        for (key, shape) in shape_keys {
            if one_shot(&self.window, key) {
                let _ = self.sim_tx.send(SimInput::SetShape(shape));
            }
        }

        poll
    }

    /// Render one frame: backdrop, skeleton overlay, technique canvas, HUD.
    pub fn render(&mut self, app: &AppState, now: TimeMs) {
        self.frames += 1;
        if self.fps_mark.elapsed().as_secs_f32() >= 1.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.fps_mark = Instant::now();
        }

        self.buf.fill(BG_COLOR);

        if self.show_skeleton {
            for hand in &app.frame().hands {
                self.draw_skeleton(hand);
            }
        }

        // Technique overlay, composited additively so glows stack on the
        // backdrop instead of punching holes in it.
        let overlay = app.canvas().buf();
        for (dst, &src) in self.buf.iter_mut().zip(overlay) {
            if src != 0 {
                *dst = add_argb(*dst, src);
            }
        }

        self.draw_hud(app, now);

        self.window
            .update_with_buffer(&self.buf, self.width, self.height)
            .ok();
    }

    // ── skeleton overlay ──────────────────────────────────────────────────

    fn draw_skeleton(&mut self, hand: &Hand) {
        if hand.landmarks.len() < 21 {
            return;
        }
        let w = self.width as f32;
        let h = self.height as f32;

        for (a, b) in BONES {
            let p = hand.landmarks[a];
            let q = hand.landmarks[b];
            self.draw_seg(p.x * w, p.y * h, q.x * w, q.y * h, SKELETON);
        }
        for p in &hand.landmarks {
            let x = (p.x * w) as i32;
            let y = (p.y * h) as i32;
            self.fill_rect(x - 1, y - 1, 2, 2, JOINT);
        }

        // Target brackets around the hand's padded bounding box.
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (1.0f32, 1.0f32, 0.0f32, 0.0f32);
        for p in &hand.landmarks {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let pad = 0.05;
        let bx = ((min_x - pad).max(0.0) * w) as i32;
        let by = ((min_y - pad).max(0.0) * h) as i32;
        let bw = (((max_x + pad).min(1.0) - (min_x - pad).max(0.0)) * w) as i32;
        let bh = (((max_y + pad).min(1.0) - (min_y - pad).max(0.0)) * h) as i32;
        self.draw_brackets(bx, by, bw, bh, 14, ACCENT);
        self.draw_label(
            &format!("TARGET: {}", hand.handedness.label()),
            bx,
            by - 8,
            ACCENT,
        );
    }

    fn draw_brackets(&mut self, x: i32, y: i32, w: i32, h: i32, len: i32, color: u32) {
        for d in 0..len {
            // Top-left
            self.set_pixel(x + d, y, color);
            self.set_pixel(x, y + d, color);
            // Top-right
            self.set_pixel(x + w - d, y, color);
            self.set_pixel(x + w, y + d, color);
            // Bottom-left
            self.set_pixel(x + d, y + h, color);
            self.set_pixel(x, y + h - d, color);
            // Bottom-right
            self.set_pixel(x + w - d, y + h, color);
            self.set_pixel(x + w, y + h - d, color);
        }
    }

    // ── HUD ───────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, app: &AppState, now: TimeMs) {
        let hud = app.hud(now);

        let pose = hud.pose.unwrap_or("None");
        self.draw_label(&format!("POSE: {pose}"), 10, 10, HUD_TEXT);
        self.draw_label(&format!("HANDS: {}", hud.hand_count), 10, 20, HUD_TEXT);
        self.draw_label(&format!("FPS: {}", self.fps), 10, 30, HUD_DIM);

        let active = if hud.active.is_empty() {
            "-".to_string()
        } else {
            hud.active.join(" ")
        };
        self.draw_label(&format!("ACTIVE: {active}"), 10, 40, HUD_TEXT);
        self.draw_label(
            &format!("LAST: {}", hud.last_technique.unwrap_or("-")),
            10,
            50,
            HUD_DIM,
        );
        self.draw_label(&format!("NOW: {}", hud.displayed), 10, 60, ACCENT);

        // Global cooldown bar, top-right; drains left as the window expires.
        let bar_w = 140i32;
        let bar_x = self.width as i32 - bar_w - 10;
        self.fill_rect(bar_x, 10, bar_w as u32, 8, BAR_BG);
        let frac = (hud.cooldown_ms / hud.cooldown_total_ms).clamp(0.0, 1.0);
        let fill = (bar_w as f64 * frac) as u32;
        if fill > 0 {
            self.fill_rect(bar_x, 10, fill, 8, BAR_FILL);
        }
        self.draw_label("COOLDOWN", bar_x, 22, HUD_DIM);

        // Status bar and key legend.
        let status_y = self.height as i32 - 30;
        self.fill_rect(0, status_y, self.width as u32, 14, STATUS_BG);
        self.draw_label(&app.status, 10, status_y + 4, HUD_TEXT);
        self.draw_label(
            "1=FIST 2=TWO 3=OPEN 4=PINCH 0=NONE D=DEBUG X=STOP Q=QUIT",
            10,
            self.height as i32 - 12,
            HUD_DIM,
        );
    }

    // ── primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32) {
        for row in y..y + h as i32 {
            for col in x..x + w as i32 {
                self.set_pixel(col, row, color);
            }
        }
    }

    fn draw_seg(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.set_pixel((x0 + dx * t) as i32, (y0 + dy * t) as i32, color);
        }
    }

    /// Minimal 3×5 bitmap font; each glyph is 15 row-major bits packed into
    /// a `u16` (bit 14 = top-left).
    fn draw_label(&mut self, text: &str, x: i32, y: i32, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let mask = glyph(ch);
            for row in 0..5usize {
                for col in 0..3usize {
                    if mask & (1u16 << (14 - (row * 3 + col))) != 0 {
                        self.set_pixel(cx + col as i32, y + row as i32, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.width as i32 {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        '0' => 0b111_101_101_101_111,
        '1' => 0b010_110_010_010_111,
        '2' => 0b111_001_111_100_111,
        '3' => 0b111_001_111_001_111,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_111_001_111,
        '6' => 0b111_100_111_101_111,
        '7' => 0b111_001_001_001_001,
        '8' => 0b111_101_111_101_111,
        '9' => 0b111_101_111_001_111,
        'A' => 0b111_101_111_101_101,
        'B' => 0b110_101_110_101_110,
        'C' => 0b111_100_100_100_111,
        'D' => 0b110_101_101_101_110,
        'E' => 0b111_100_111_100_111,
        'F' => 0b111_100_111_100_100,
        'G' => 0b111_100_101_101_111,
        'H' => 0b101_101_111_101_101,
        'I' => 0b111_010_010_010_111,
        'J' => 0b001_001_001_101_111,
        'K' => 0b101_101_110_101_101,
        'L' => 0b100_100_100_100_111,
        'M' => 0b101_111_101_101_101,
        'N' => 0b111_101_101_101_101,
        'O' => 0b111_101_101_101_111,
        'P' => 0b111_101_111_100_100,
        'Q' => 0b111_101_101_111_001,
        'R' => 0b110_101_110_101_101,
        'S' => 0b111_100_111_001_111,
        'T' => 0b111_010_010_010_010,
        'U' => 0b101_101_101_101_111,
        'V' => 0b101_101_101_010_010,
        'W' => 0b101_101_101_111_101,
        'X' => 0b101_101_010_101_101,
        'Y' => 0b101_101_111_010_010,
        'Z' => 0b111_001_010_100_111,
        '-' => 0b000_000_111_000_000,
        '_' => 0b000_000_000_000_111,
        '.' => 0b000_000_000_000_010,
        ',' => 0b000_000_000_010_100,
        ':' => 0b000_010_000_010_000,
        '=' => 0b000_111_000_111_000,
        '+' => 0b000_010_111_010_000,
        '/' => 0b001_001_010_100_100,
        '!' => 0b010_010_010_000_010,
        ' ' => 0b000_000_000_000_000,
        _ => 0b000_000_010_000_000, // fallback dot
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compositing
// ────────────────────────────────────────────────────────────────────────────

/// Saturating per-channel add of two ARGB pixels.
fn add_argb(a: u32, b: u32) -> u32 {
    let add = |x: u32, y: u32| (x + y).min(0xFF);
    let r = add((a >> 16) & 0xFF, (b >> 16) & 0xFF);
    let g = add((a >> 8) & 0xFF, (b >> 8) & 0xFF);
    let bl = add(a & 0xFF, b & 0xFF);
    0xFF00_0000 | (r << 16) | (g << 8) | bl
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
