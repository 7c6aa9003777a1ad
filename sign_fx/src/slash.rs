//! Slash — sweeping diagonal cuts.
//!
//! Triggered by fist → two fingers.  The payload sweeps a heavy dark cut
//! line across the frame over 200 ms with a red glow, followed by two
//! staggered secondary cuts, all fading out by 800 ms.

use rand::Rng;

use hand_model::TimeMs;
use sign_engine::{
    FxContext, GestureId, GestureSpec, GestureStep, PoseId, PoseSpec, Registry, Technique,
    TechniqueId,
};

use crate::FxState;

pub const FIST_POSE: PoseId = "pose_fist";
pub const TWO_FINGERS_POSE: PoseId = "pose_two_fingers";
pub const SLASH_GESTURE: GestureId = "gesture_slash";
pub const SLASH_TECHNIQUE: TechniqueId = "tech_slash";

const DURATION_MS: f64 = 800.0;
const SWEEP_MS: f64 = 200.0;

const CORE_COLOR: u32 = 0xFF140000;
const GLOW_COLOR: u32 = 0xFFFF1E1E;

// ════════════════════════════════════════════════════════════════════════════
// Poses and gesture
// ════════════════════════════════════════════════════════════════════════════

/// Fraction of non-thumb fingers closed.  The thumb reads unreliably inside
/// a fist, so it stays out of the count.
fn fist_score(f: &hand_model::HandFeatures) -> f32 {
    use hand_model::{Finger, FingerState};
    let closed = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
        .iter()
        .filter(|fg| f.fingers.state(**fg) == FingerState::Closed)
        .count();
    closed as f32 / 4.0
}

/// Index and middle open, ring and pinky closed; a quarter point each.
fn two_fingers_score(f: &hand_model::HandFeatures) -> f32 {
    use hand_model::FingerState::{Closed, Open};
    let mut score = 0.0;
    if f.fingers.index == Open {
        score += 0.25;
    }
    if f.fingers.middle == Open {
        score += 0.25;
    }
    if f.fingers.ring == Closed {
        score += 0.25;
    }
    if f.fingers.pinky == Closed {
        score += 0.25;
    }
    score
}

fn fist_pose() -> PoseSpec {
    PoseSpec {
        id: FIST_POSE,
        name: "Fist",
        score: fist_score,
        threshold: 0.75,
    }
}

fn two_fingers_pose() -> PoseSpec {
    PoseSpec {
        id: TWO_FINGERS_POSE,
        name: "Two Fingers",
        score: two_fingers_score,
        threshold: 0.75,
    }
}

fn slash_gesture() -> GestureSpec {
    GestureSpec {
        id: SLASH_GESTURE,
        name: "Slash",
        sequence: vec![
            GestureStep {
                pose_id: FIST_POSE,
                max_gap_ms: 2000.0,
                min_hold_ms: None,
            },
            GestureStep {
                pose_id: TWO_FINGERS_POSE,
                max_gap_ms: 2000.0,
                min_hold_ms: None,
            },
        ],
        min_confidence: 0.6,
        max_duration_ms: 1500.0,
        cooldown_ms: 2000.0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Technique
// ════════════════════════════════════════════════════════════════════════════

struct Cut {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    delay_ms: f64,
}

#[derive(Default)]
pub struct SlashState {
    started: TimeMs,
    cuts: Vec<Cut>,
}

pub struct SlashTechnique;

impl Technique<FxState> for SlashTechnique {
    fn id(&self) -> TechniqueId {
        SLASH_TECHNIQUE
    }
    fn name(&self) -> &'static str {
        "Slash"
    }
    fn version(&self) -> &'static str {
        "2.0.0"
    }
    fn gesture_id(&self) -> GestureId {
        SLASH_GESTURE
    }
    fn fresh_state(&self) -> FxState {
        FxState::Slash(SlashState::default())
    }

    fn start(&self, ctx: &mut FxContext<'_>, state: &mut FxState) {
        let FxState::Slash(st) = state else { return };
        let w = ctx.canvas.width() as f32;
        let h = ctx.canvas.height() as f32;
        let mut rng = rand::thread_rng();

        st.started = ctx.now;
        st.cuts.clear();

        // Primary cut crosses the whole frame; secondaries land nearby with
        // a stagger so the cuts read as separate strokes.
        let x0 = rng.gen_range(0.0..w);
        let y0 = rng.gen_range(0.0..h);
        let x1 = w - x0;
        let y1 = rng.gen_range(0.0..h);
        st.cuts.push(Cut { x0, y0, x1, y1, delay_ms: 0.0 });

        for (i, delay_ms) in [(1, 100.0), (2, 200.0)] {
            let off = i as f32 * rng.gen_range(24.0..60.0);
            st.cuts.push(Cut {
                x0: x0 + off,
                y0: (y0 + off).min(h),
                x1: x1 + off,
                y1: (y1 - off).max(0.0),
                delay_ms,
            });
        }
    }

    fn update(&self, ctx: &mut FxContext<'_>, state: &mut FxState) {
        let FxState::Slash(st) = state else { return };
        let elapsed = ctx.now - st.started;
        if elapsed > DURATION_MS {
            return;
        }

        let fade = (1.0 - elapsed / DURATION_MS) as f32;
        for cut in &st.cuts {
            if elapsed < cut.delay_ms {
                continue;
            }
            let progress = (((elapsed - cut.delay_ms) / SWEEP_MS).min(1.0)) as f32;
            let cur_x = cut.x0 + (cut.x1 - cut.x0) * progress;
            let cur_y = cut.y0 + (cut.y1 - cut.y0) * progress;

            // Glow first, then the dark core on top.
            ctx.canvas.glow_line(
                cut.x0,
                cut.y0,
                cur_x,
                cur_y,
                8.0,
                sign_engine::canvas::blend(0xFF000000, GLOW_COLOR, fade),
            );
            ctx.canvas.draw_line(cut.x0, cut.y0, cur_x, cur_y, 6.0, CORE_COLOR);
        }
    }

    fn stop(&self, _ctx: &mut FxContext<'_>, _state: &mut FxState) {}
}

pub fn register(registry: &mut Registry<FxState>) {
    registry.register_pose(fist_pose());
    registry.register_pose(two_fingers_pose());
    registry.register_gesture(slash_gesture());
    registry.register_technique(Box::new(SlashTechnique));
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
