//! # sign_fx
//!
//! The built-in effect modules.  Each module contributes its poses, its
//! trigger gesture, and a [`Technique`](sign_engine::Technique)
//! implementation whose pixel payload draws on the shared overlay canvas.
//!
//! | Technique | Trigger | Payload |
//! |---|---|---|
//! | Aura (exempt) | open hand held | pulsing additive glow around each palm |
//! | Fireball | pinch → open hand | charge orb at the palm, then a debris blast |
//! | Slash | fist → two fingers | sweeping diagonal cuts with a red glow |
//!
//! Runtime state is the [`FxState`] tagged union: one strongly-typed
//! variant per technique, owned by the effect scheduler for the lifetime of
//! an activation and borrowed by the technique during each hook call.

pub mod aura;
pub mod fireball;
pub mod slash;

use sign_engine::Registry;

pub use aura::{AURA_GESTURE, AURA_TECHNIQUE, OPEN_HAND_POSE};
pub use fireball::{FIREBALL_GESTURE, FIREBALL_TECHNIQUE, PINCH_POSE};
pub use slash::{FIST_POSE, SLASH_GESTURE, SLASH_TECHNIQUE, TWO_FINGERS_POSE};

/// Runtime state for every built-in technique.
pub enum FxState {
    Aura,
    Fireball(fireball::FireballState),
    Slash(slash::SlashState),
}

/// Register the full built-in catalog.
///
/// Modules with compound gestures come first: pose registration order is
/// the classifier's evaluation order (earlier wins score ties), and the
/// registry prefers longer sequences on its own at build time.
pub fn register_all(registry: &mut Registry<FxState>) {
    slash::register(registry);
    fireball::register(registry);
    aura::register(registry);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
