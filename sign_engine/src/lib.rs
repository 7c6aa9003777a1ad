//! # sign_engine
//!
//! The recognition and arbitration core: it turns a noisy per-frame stream
//! of hand feature vectors into discrete poses, matches short pose
//! sequences into gestures, and schedules the visual techniques those
//! gestures trigger.
//!
//! ## Per-frame control flow
//!
//! ```text
//! FeaturesFrame ──▶ PoseClassifier ──▶ pose id
//!                        │
//!                        ▼
//!                  SequenceMatcher.record(t, pose)
//!                  SequenceMatcher.try_match(t) ──▶ gesture id
//!                        │
//!                        ▼
//!                  FxEngine.start(technique)          (on trigger)
//!                  FxEngine.update(ctx)               (every tick)
//! ```
//!
//! Catalogs of poses, gestures, and techniques are registered once through
//! [`catalog::Registry`] before the tick loop starts; `Registry::build`
//! validates the whole catalog and hands back the three wired stages.
//!
//! Everything here is single-threaded and frame-driven: one detection pass
//! per new video frame, one render pass per display tick.

pub mod canvas;
pub mod catalog;
pub mod classify;
pub mod fx;
pub mod sequence;

pub use canvas::Canvas;
pub use catalog::{
    CatalogError, GestureId, GestureSpec, GestureStep, Pipeline, PoseId, PoseSpec, Registry,
    ScoreFn, TechniqueId,
};
pub use classify::{PoseClassifier, PoseHit};
pub use fx::{FxContext, FxEngine, Technique, GLOBAL_COOLDOWN_MS};
pub use sequence::{PoseHistory, SequenceMatcher};
