//! Fireball — charge at the palm, then blast.
//!
//! Triggered by pinch → open hand.  The payload runs two phases on the
//! overlay: a 350 ms charge orb growing at the palm, then a 500 ms blast
//! that throws glowing debris outward.  Once both phases elapse the
//! technique renders nothing but stays active until stopped.

use rand::Rng;

use hand_model::{features::palm_center, TimeMs};
use sign_engine::{
    FxContext, GestureId, GestureSpec, GestureStep, PoseId, PoseSpec, Registry, Technique,
    TechniqueId,
};

use crate::aura::OPEN_HAND_POSE;
use crate::FxState;

pub const PINCH_POSE: PoseId = "pose_pinch";
pub const FIREBALL_GESTURE: GestureId = "gesture_fireball";
pub const FIREBALL_TECHNIQUE: TechniqueId = "tech_fireball";

const CHARGE_MS: f64 = 350.0;
const BLAST_MS: f64 = 500.0;
const DEBRIS_COUNT: usize = 42;

const ORB_COLOR: u32 = 0xFFFFC832;
const RING_COLOR: u32 = 0xFFFF9600;
const DEBRIS_COLORS: [u32; 4] = [0xFFFFE0A0, 0xFFFFC832, 0xFFFF6400, 0xFFFF3200];

// ════════════════════════════════════════════════════════════════════════════
// Pose and gesture
// ════════════════════════════════════════════════════════════════════════════

/// The pinch scalar is already normalized so fingertips touching = 1.0.
fn pinch_score(f: &hand_model::HandFeatures) -> f32 {
    f.pinch
}

fn pinch_pose() -> PoseSpec {
    PoseSpec {
        id: PINCH_POSE,
        name: "Pinch",
        score: pinch_score,
        threshold: 0.5,
    }
}

fn fireball_gesture() -> GestureSpec {
    GestureSpec {
        id: FIREBALL_GESTURE,
        name: "Fireball",
        sequence: vec![
            // Charge...
            GestureStep {
                pose_id: PINCH_POSE,
                max_gap_ms: 2000.0,
                min_hold_ms: Some(100.0),
            },
            // ...release.
            GestureStep {
                pose_id: OPEN_HAND_POSE,
                max_gap_ms: 2000.0,
                min_hold_ms: None,
            },
        ],
        min_confidence: 0.6,
        max_duration_ms: 3000.0,
        cooldown_ms: 1000.0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Technique
// ════════════════════════════════════════════════════════════════════════════

struct Debris {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    life: f32,
    size: f32,
    color: u32,
}

#[derive(Default)]
pub struct FireballState {
    origin: (f32, f32),
    started: TimeMs,
    debris: Vec<Debris>,
    blasted: bool,
}

pub struct FireballTechnique;

impl Technique<FxState> for FireballTechnique {
    fn id(&self) -> TechniqueId {
        FIREBALL_TECHNIQUE
    }
    fn name(&self) -> &'static str {
        "Fireball"
    }
    fn version(&self) -> &'static str {
        "3.1.0"
    }
    fn gesture_id(&self) -> GestureId {
        FIREBALL_GESTURE
    }
    fn fresh_state(&self) -> FxState {
        FxState::Fireball(FireballState::default())
    }

    fn start(&self, ctx: &mut FxContext<'_>, state: &mut FxState) {
        let FxState::Fireball(st) = state else { return };
        let w = ctx.canvas.width() as f32;
        let h = ctx.canvas.height() as f32;

        // Anchor the orb to the first tracked palm, or the frame center
        // when the release frame lost tracking.
        st.origin = match ctx.frame.hands.first() {
            Some(hand) => {
                let palm = palm_center(hand);
                (palm.x * w, palm.y * h)
            }
            None => (w / 2.0, h / 2.0),
        };
        st.started = ctx.now;
    }

    fn update(&self, ctx: &mut FxContext<'_>, state: &mut FxState) {
        let FxState::Fireball(st) = state else { return };
        let elapsed = ctx.now - st.started;
        if elapsed > CHARGE_MS + BLAST_MS {
            return;
        }

        let (ox, oy) = st.origin;
        if elapsed < CHARGE_MS {
            let t = (elapsed / CHARGE_MS) as f32;
            let radius = 15.0 + t * 50.0;

            // Heat ring around the growing orb.
            let ring_r = radius * 1.5;
            let steps = (std::f32::consts::TAU * ring_r) as usize;
            for i in 0..steps.max(8) {
                let a = i as f32 / steps.max(8) as f32 * std::f32::consts::TAU;
                ctx.canvas
                    .add_pixel((ox + a.cos() * ring_r) as i32, (oy + a.sin() * ring_r) as i32, RING_COLOR, t * 0.4);
            }

            ctx.canvas.glow_circle(ox, oy, radius * 0.3, radius, ORB_COLOR);
        } else {
            if !st.blasted {
                st.blasted = true;
                let mut rng = rand::thread_rng();
                st.debris = (0..DEBRIS_COUNT)
                    .map(|_| {
                        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                        let speed = rng.gen_range(3.0..9.0);
                        Debris {
                            x: ox,
                            y: oy,
                            vx: angle.cos() * speed,
                            vy: angle.sin() * speed,
                            life: 1.0,
                            size: rng.gen_range(2.0..5.0),
                            color: DEBRIS_COLORS[rng.gen_range(0..DEBRIS_COLORS.len())],
                        }
                    })
                    .collect();
            }

            // Expanding shockwave, fading over the blast.
            let t = ((elapsed - CHARGE_MS) / BLAST_MS) as f32;
            let wave_r = 60.0 + t * 180.0;
            ctx.canvas
                .glow_circle(ox, oy, wave_r * 0.85, wave_r, blend_scale(RING_COLOR, 1.0 - t));

            for d in &mut st.debris {
                d.x += d.vx;
                d.y += d.vy;
                d.vy += 0.15;
                d.life -= 0.04;
                if d.life > 0.0 {
                    ctx.canvas.glow_circle(
                        d.x,
                        d.y,
                        d.size * 0.4,
                        d.size,
                        blend_scale(d.color, d.life),
                    );
                }
            }
        }
    }

    fn stop(&self, _ctx: &mut FxContext<'_>, _state: &mut FxState) {}
}

/// Scale a color's channels toward black.
fn blend_scale(color: u32, k: f32) -> u32 {
    sign_engine::canvas::blend(0xFF000000, color, k)
}

pub fn register(registry: &mut Registry<FxState>) {
    registry.register_pose(pinch_pose());
    registry.register_gesture(fireball_gesture());
    registry.register_technique(Box::new(FireballTechnique));
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_model::features::extract_features;
    use hand_model::synth::{hand_with_shape, HandShape};
    use hand_model::{FeaturesFrame, HandFrame, Handedness};
    use sign_engine::Canvas;

    #[test]
    fn pinch_shape_clears_the_threshold() {
        let f = extract_features(&hand_with_shape(HandShape::Pinch, "0", Handedness::Right));
        assert!(pinch_score(&f) > pinch_pose().threshold);
    }

    #[test]
    fn open_shape_scores_no_pinch() {
        let f = extract_features(&hand_with_shape(HandShape::Open, "0", Handedness::Right));
        assert!(pinch_score(&f) < 0.2);
    }

    #[test]
    fn charge_phase_draws_at_the_palm() {
        let tech = FireballTechnique;
        let mut state = tech.fresh_state();
        let frame = HandFrame {
            t: 0.0,
            width: 160,
            height: 120,
            hands: vec![hand_with_shape(HandShape::Open, "0", Handedness::Right)],
        };
        let features = FeaturesFrame::default();
        let mut canvas = Canvas::new(160, 120);

        let mut ctx = FxContext {
            now: 1000.0,
            frame: &frame,
            features: &features,
            canvas: &mut canvas,
        };
        tech.start(&mut ctx, &mut state);
        ctx.now = 1100.0;
        tech.update(&mut ctx, &mut state);
        assert!(!canvas.is_blank());
    }

    #[test]
    fn payload_goes_dark_after_both_phases() {
        let tech = FireballTechnique;
        let mut state = tech.fresh_state();
        let frame = HandFrame::empty(0.0, 160, 120);
        let features = FeaturesFrame::default();
        let mut canvas = Canvas::new(160, 120);

        let mut ctx = FxContext {
            now: 0.0,
            frame: &frame,
            features: &features,
            canvas: &mut canvas,
        };
        tech.start(&mut ctx, &mut state);
        ctx.now = CHARGE_MS + BLAST_MS + 100.0;
        tech.update(&mut ctx, &mut state);
        assert!(canvas.is_blank());
    }
}
