//! Top-level application state machine.
//!
//! `AppState` owns the recognition pipeline and the overlay canvas, feeds
//! tracking frames through classification and matching, and arbitrates
//! which techniques start.  `run` drives the whole thing at ~60 fps:
//! detection runs once per delivered tracking frame, rendering runs every
//! tick regardless so effects stay smooth through tracking gaps.

use std::sync::mpsc::{self, TryRecvError};

use anyhow::Context as _;
use tracing::info;

use hand_model::features::extract_features;
use hand_model::{FeaturesFrame, HandFrame, TimeMs};
use sign_engine::{
    Canvas, CatalogError, FxContext, FxEngine, GestureId, Pipeline, PoseClassifier, PoseId,
    Registry, SequenceMatcher, GLOBAL_COOLDOWN_MS,
};
use sign_fx::FxState;

#[cfg(not(feature = "leap"))]
use crate::tracking::SimTrackingSource;
use crate::tracking::{spawn_tracking_source, Clock};
use crate::visualizer::Visualizer;

/// The exempt technique may not start within this window after a
/// non-exempt gesture trigger — discrete techniques win the overlay.
pub const AURA_HOLDOFF_MS: f64 = 2_000.0;

/// How long the "now playing" technique name stays on the HUD.
const DISPLAY_DECAY_MS: f64 = 2_000.0;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Window and overlay size in pixels.
    pub width: usize,
    pub height: usize,
    /// Draw the hand skeleton / debug overlay.
    pub show_skeleton: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { width: 960, height: 540, show_skeleton: true }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hud
// ════════════════════════════════════════════════════════════════════════════

/// Snapshot of everything the window's HUD shows.
pub struct Hud {
    pub pose: Option<&'static str>,
    pub hand_count: usize,
    pub active: Vec<&'static str>,
    pub cooldown_ms: f64,
    pub cooldown_total_ms: f64,
    pub last_technique: Option<&'static str>,
    /// Name shown in the "now playing" slot; decays back to `IDLE`.
    pub displayed: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── recognition pipeline ─────────────────────────────────────────────
    poses: PoseClassifier,
    gestures: SequenceMatcher,
    fx: FxEngine<FxState>,

    // ── per-frame context ────────────────────────────────────────────────
    canvas: Canvas,
    latest_frame: HandFrame,
    latest_features: FeaturesFrame,
    active_pose: Option<PoseId>,

    // ── arbitration ──────────────────────────────────────────────────────
    /// Last non-exempt gesture trigger, recorded even when the start is
    /// then rejected by the global cooldown.
    last_complex_trigger: Option<TimeMs>,
    displayed: Option<(&'static str, TimeMs)>,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Result<Self, CatalogError> {
        let mut registry = Registry::new();
        sign_fx::register_all(&mut registry);
        let Pipeline { poses, gestures, fx } = registry.build()?;

        Ok(AppState {
            poses,
            gestures,
            fx,
            canvas: Canvas::new(cfg.width, cfg.height),
            latest_frame: HandFrame::empty(0.0, cfg.width, cfg.height),
            latest_features: FeaturesFrame::default(),
            active_pose: None,
            last_complex_trigger: None,
            displayed: None,
            status: "Ready - hold a sign to begin".to_string(),
        })
    }

    // ── detection pass, once per delivered tracking frame ────────────────

    pub fn ingest(&mut self, frame: HandFrame) {
        let t = frame.t;
        let features = FeaturesFrame {
            t,
            hands: frame.hands.iter().map(extract_features).collect(),
        };

        let pose = self.poses.classify_frame(&features).map(|hit| hit.pose_id);
        if pose != self.active_pose {
            self.active_pose = pose;
            if let Some(p) = pose {
                self.status = format!("Pose: {}", self.poses.pose_name(p).unwrap_or(p));
            }
        }

        self.latest_frame = frame;
        self.latest_features = features;

        self.gestures.record(t, pose);
        let triggered = self.gestures.try_match(t);
        if let Some(gesture_id) = triggered {
            self.on_gesture(t, gesture_id);
        }

        // The aura is pose-driven: the moment the open hand is gone and the
        // trigger stopped firing, shut it down.  No-op while it is idle.
        if pose != Some(sign_fx::OPEN_HAND_POSE) && triggered != Some(sign_fx::AURA_GESTURE) {
            let mut ctx = FxContext {
                now: t,
                frame: &self.latest_frame,
                features: &self.latest_features,
                canvas: &mut self.canvas,
            };
            self.fx.stop(sign_fx::AURA_TECHNIQUE, &mut ctx);
        }
    }

    fn on_gesture(&mut self, now: TimeMs, gesture_id: GestureId) {
        let Some(tech_id) = self.fx.technique_for_gesture(gesture_id) else {
            return;
        };

        if self.fx.is_exempt(tech_id) {
            if let Some(t0) = self.last_complex_trigger {
                if now - t0 < AURA_HOLDOFF_MS {
                    return;
                }
            }
        } else {
            self.last_complex_trigger = Some(now);
        }

        let name = self.fx.technique_name(tech_id).unwrap_or(tech_id);
        let mut ctx = FxContext {
            now,
            frame: &self.latest_frame,
            features: &self.latest_features,
            canvas: &mut self.canvas,
        };
        if self.fx.start(tech_id, &mut ctx) {
            self.displayed = Some((name, now));
            self.status = format!("{name}!");
            info!("`{}` started by `{}`", tech_id, gesture_id);
        }
    }

    // ── render pass, every tick ──────────────────────────────────────────

    pub fn tick(&mut self, now: TimeMs) {
        if let Some((_, t0)) = self.displayed {
            if now - t0 >= DISPLAY_DECAY_MS {
                self.displayed = None;
            }
        }
        let mut ctx = FxContext {
            now,
            frame: &self.latest_frame,
            features: &self.latest_features,
            canvas: &mut self.canvas,
        };
        self.fx.update(&mut ctx);
    }

    /// Stop every active technique (the window's panic key).
    pub fn stop_all(&mut self, now: TimeMs) {
        for id in self.fx.active_ids() {
            let mut ctx = FxContext {
                now,
                frame: &self.latest_frame,
                features: &self.latest_features,
                canvas: &mut self.canvas,
            };
            self.fx.stop(id, &mut ctx);
        }
        self.status = "All techniques stopped".to_string();
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn frame(&self) -> &HandFrame {
        &self.latest_frame
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn fx(&self) -> &FxEngine<FxState> {
        &self.fx
    }

    pub fn active_pose(&self) -> Option<PoseId> {
        self.active_pose
    }

    pub fn hud(&self, now: TimeMs) -> Hud {
        Hud {
            pose: self.active_pose.and_then(|p| self.poses.pose_name(p)),
            hand_count: self.latest_frame.hands.len(),
            active: self.fx.active_ids(),
            cooldown_ms: self.fx.cooldown_remaining(now),
            cooldown_total_ms: GLOBAL_COOLDOWN_MS,
            last_technique: self.fx.last_started_name(),
            displayed: self.displayed.map(|(n, _)| n).unwrap_or("IDLE"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer window, spawns the tracking source (simulation by
/// default, hardware with `--features leap`), and drives the detect/render
/// loop at ~60 fps.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let clock = Clock::start();

    let (sim_tx, sim_rx) = mpsc::channel();

    #[cfg(not(feature = "leap"))]
    let frame_rx =
        spawn_tracking_source(SimTrackingSource::new(sim_rx, clock, cfg.width, cfg.height));

    #[cfg(feature = "leap")]
    let frame_rx = {
        drop(sim_rx);
        spawn_tracking_source(crate::tracking::LeapTrackingSource {
            clock,
            width: cfg.width,
            height: cfg.height,
        })
    };

    let mut vis = Visualizer::new(&cfg, sim_tx).context("opening the visualizer window")?;
    let mut app = AppState::new(&cfg).context("building the sign catalog")?;

    while vis.is_open() {
        // 1. Window input → simulated shapes / app commands.
        let input = vis.poll_input();
        if input.quit {
            break;
        }
        if input.stop_all {
            app.stop_all(clock.now_ms());
        }

        // 2. Detection: each freshly delivered frame, at most once.
        loop {
            match frame_rx.try_recv() {
                Ok(frame) => app.ingest(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        // 3. Render pass — unconditional for smooth effects.
        let now = clock.now_ms();
        app.tick(now);
        vis.render(&app, now);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_model::synth::{frame, HandShape};
    use sign_fx::{AURA_TECHNIQUE, FIREBALL_TECHNIQUE, SLASH_TECHNIQUE};

    fn make_app() -> AppState {
        AppState::new(&AppConfig { width: 160, height: 120, show_skeleton: false }).unwrap()
    }

    fn ingest(app: &mut AppState, t: TimeMs, shape: Option<HandShape>) {
        app.ingest(frame(t, 160, 120, shape));
    }

    #[test]
    fn held_open_hand_starts_the_aura() {
        let mut app = make_app();
        ingest(&mut app, 100.0, Some(HandShape::Open));
        assert!(app.fx().is_active(AURA_TECHNIQUE));
        // Exempt start leaves the global cooldown untouched.
        assert_eq!(app.fx().cooldown_remaining(100.0), 0.0);
    }

    #[test]
    fn aura_stops_once_the_pose_is_gone() {
        let mut app = make_app();
        ingest(&mut app, 100.0, Some(HandShape::Open));
        assert!(app.fx().is_active(AURA_TECHNIQUE));
        // Long enough after the open-hand transition that its trigger no
        // longer fires, with a different pose in view.
        ingest(&mut app, 1200.0, Some(HandShape::Fist));
        assert!(!app.fx().is_active(AURA_TECHNIQUE));
    }

    #[test]
    fn fist_then_two_fingers_fires_the_slash() {
        let mut app = make_app();
        ingest(&mut app, 0.0, Some(HandShape::Fist));
        assert!(!app.fx().is_active(SLASH_TECHNIQUE));
        ingest(&mut app, 400.0, Some(HandShape::TwoFingers));
        assert!(app.fx().is_active(SLASH_TECHNIQUE));
        assert_eq!(app.fx().last_started_name(), Some("Slash"));
        assert_eq!(app.hud(400.0).displayed, "Slash");
    }

    #[test]
    fn tracking_gap_does_not_break_a_sequence() {
        let mut app = make_app();
        ingest(&mut app, 0.0, Some(HandShape::Fist));
        ingest(&mut app, 100.0, None);
        ingest(&mut app, 400.0, Some(HandShape::TwoFingers));
        assert!(app.fx().is_active(SLASH_TECHNIQUE));
    }

    #[test]
    fn aura_is_held_off_right_after_a_complex_trigger() {
        let mut app = make_app();
        ingest(&mut app, 0.0, Some(HandShape::Fist));
        ingest(&mut app, 400.0, Some(HandShape::TwoFingers));
        assert!(app.fx().is_active(SLASH_TECHNIQUE));
        // Open hand 200ms later: the aura trigger fires but the priority
        // window blocks the start.
        ingest(&mut app, 600.0, Some(HandShape::Open));
        assert!(!app.fx().is_active(AURA_TECHNIQUE));
        // Past the holdoff, a fresh open-hand transition brings the aura up.
        ingest(&mut app, 2300.0, Some(HandShape::Fist));
        ingest(&mut app, 2600.0, Some(HandShape::Open));
        assert!(app.fx().is_active(AURA_TECHNIQUE));
    }

    #[test]
    fn global_cooldown_rejects_a_prompt_second_technique() {
        let mut app = make_app();
        ingest(&mut app, 0.0, Some(HandShape::Fist));
        ingest(&mut app, 400.0, Some(HandShape::TwoFingers));
        assert!(app.fx().is_active(SLASH_TECHNIQUE));

        ingest(&mut app, 600.0, Some(HandShape::Pinch));
        ingest(&mut app, 900.0, Some(HandShape::Open));
        // The fireball gesture matched, but its start lost to the global
        // cooldown armed by the slash.
        assert!(!app.fx().is_active(FIREBALL_TECHNIQUE));
        assert_eq!(app.fx().last_started_name(), Some("Slash"));

        // Its own cooldown and the global one both expire; the still-recent
        // pinch → open transition pair matches again and now starts.
        ingest(&mut app, 2000.0, Some(HandShape::Open));
        assert!(app.fx().is_active(FIREBALL_TECHNIQUE));
        assert_eq!(app.fx().last_started_name(), Some("Fireball"));
    }

    #[test]
    fn empty_frames_leave_no_pose_and_no_history() {
        let mut app = make_app();
        ingest(&mut app, 0.0, None);
        assert_eq!(app.active_pose(), None);
        ingest(&mut app, 100.0, Some(HandShape::Open));
        assert_eq!(app.active_pose(), Some(sign_fx::OPEN_HAND_POSE));
    }

    #[test]
    fn tick_renders_active_technique_onto_the_canvas() {
        let mut app = make_app();
        ingest(&mut app, 100.0, Some(HandShape::Open));
        app.tick(120.0);
        assert!(!app.canvas().is_blank());
    }

    #[test]
    fn tick_with_nothing_active_clears_the_canvas() {
        let mut app = make_app();
        ingest(&mut app, 100.0, Some(HandShape::Open));
        app.tick(120.0);
        app.stop_all(150.0);
        app.tick(160.0);
        assert!(app.canvas().is_blank());
    }

    #[test]
    fn stop_all_empties_the_active_set() {
        let mut app = make_app();
        ingest(&mut app, 0.0, Some(HandShape::Fist));
        ingest(&mut app, 400.0, Some(HandShape::TwoFingers));
        assert!(!app.fx().active_ids().is_empty());
        app.stop_all(500.0);
        assert!(app.fx().active_ids().is_empty());
    }
}
