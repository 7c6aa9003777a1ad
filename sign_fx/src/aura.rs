//! Aura — the sustained, pose-driven glow.
//!
//! Unlike the discrete techniques, the aura is re-triggered every frame its
//! pose holds (its gesture has no cooldown) and is exempt from the global
//! start cooldown; the app stops it as soon as the open hand goes away.

use rand::Rng;

use hand_model::features::palm_center;
use sign_engine::{
    FxContext, GestureId, GestureSpec, GestureStep, PoseId, PoseSpec, Registry, Technique,
    TechniqueId,
};

use crate::FxState;

pub const OPEN_HAND_POSE: PoseId = "pose_open_hand";
pub const AURA_GESTURE: GestureId = "gesture_aura_trigger";
pub const AURA_TECHNIQUE: TechniqueId = "tech_aura";

const CORE_COLOR: u32 = 0xFF0A50FF;
const SPOKE_COLOR: u32 = 0xFF00E0E0;

// ════════════════════════════════════════════════════════════════════════════
// Pose and gesture
// ════════════════════════════════════════════════════════════════════════════

/// All five fingers must read open; anything less scores zero.  The strict
/// threshold keeps an almost-open hand from flickering the aura on.
fn open_hand_score(f: &hand_model::HandFeatures) -> f32 {
    if f.fingers.open_count() == 5 {
        1.0
    } else {
        0.0
    }
}

fn open_hand_pose() -> PoseSpec {
    PoseSpec {
        id: OPEN_HAND_POSE,
        name: "Open Hand",
        score: open_hand_score,
        threshold: 0.95,
    }
}

fn aura_gesture() -> GestureSpec {
    GestureSpec {
        id: AURA_GESTURE,
        name: "Aura Trigger",
        sequence: vec![GestureStep {
            pose_id: OPEN_HAND_POSE,
            max_gap_ms: 1000.0,
            min_hold_ms: Some(200.0),
        }],
        min_confidence: 0.6,
        max_duration_ms: 1000.0,
        cooldown_ms: 0.0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Technique
// ════════════════════════════════════════════════════════════════════════════

pub struct AuraTechnique;

impl Technique<FxState> for AuraTechnique {
    fn id(&self) -> TechniqueId {
        AURA_TECHNIQUE
    }
    fn name(&self) -> &'static str {
        "Aura"
    }
    fn version(&self) -> &'static str {
        "1.1.0"
    }
    fn gesture_id(&self) -> GestureId {
        AURA_GESTURE
    }
    fn exempt(&self) -> bool {
        true
    }
    fn fresh_state(&self) -> FxState {
        FxState::Aura
    }

    fn start(&self, _ctx: &mut FxContext<'_>, _state: &mut FxState) {}

    fn update(&self, ctx: &mut FxContext<'_>, _state: &mut FxState) {
        if ctx.frame.hands.is_empty() {
            return;
        }
        let w = ctx.canvas.width() as f32;
        let h = ctx.canvas.height() as f32;
        let mut rng = rand::thread_rng();

        for hand in &ctx.frame.hands {
            let palm = palm_center(hand);
            let cx = palm.x * w;
            let cy = palm.y * h;

            let pulse = (ctx.now / 150.0).sin() as f32 * 10.0 + 20.0;
            let radius = 100.0 + pulse;

            ctx.canvas.glow_circle(cx, cy, 20.0, radius, CORE_COLOR);

            // Turbulent energy: short flickering spokes around the rim.
            let spin = (ctx.now / 100.0) as f32;
            for i in 0..10 {
                let angle = i as f32 / 10.0 * std::f32::consts::TAU + spin;
                let r0 = radius * 0.8;
                let r1 = radius * 1.2 + rng.gen_range(0.0..20.0);
                ctx.canvas.glow_line(
                    cx + angle.cos() * r0,
                    cy + angle.sin() * r0,
                    cx + angle.cos() * r1,
                    cy + angle.sin() * r1,
                    4.0,
                    SPOKE_COLOR,
                );
            }
        }
    }

    fn stop(&self, _ctx: &mut FxContext<'_>, _state: &mut FxState) {}
}

pub fn register(registry: &mut Registry<FxState>) {
    registry.register_pose(open_hand_pose());
    registry.register_gesture(aura_gesture());
    registry.register_technique(Box::new(AuraTechnique));
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
