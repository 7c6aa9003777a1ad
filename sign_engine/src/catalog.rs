//! Pose, gesture, and technique catalogs.
//!
//! Everything is registered once at startup and validated as a whole by
//! [`Registry::build`], which fails fast on programmer errors (duplicate
//! ids, dangling references, malformed sequences) before the tick loop can
//! start.  The build step also orders gestures longest-first so a compound
//! sequence is preferred over a simpler one that shares its tail.

use thiserror::Error;
use tracing::info;

use hand_model::HandFeatures;

use crate::classify::PoseClassifier;
use crate::fx::{FxEngine, Technique};
use crate::sequence::SequenceMatcher;

/// Catalog identifiers are interned at compile time; the whole catalog is
/// fixed before the loop starts, so `&'static str` is the natural key.
pub type PoseId = &'static str;
pub type GestureId = &'static str;
pub type TechniqueId = &'static str;

/// Pure scoring function mapping a feature vector to `0..=1`.
pub type ScoreFn = fn(&HandFeatures) -> f32;

// ════════════════════════════════════════════════════════════════════════════
// Specs
// ════════════════════════════════════════════════════════════════════════════

/// An instantaneous, scorable hand configuration.
#[derive(Clone, Debug)]
pub struct PoseSpec {
    pub id: PoseId,
    pub name: &'static str,
    pub score: ScoreFn,
    /// Scores must strictly exceed this to qualify.
    pub threshold: f32,
}

/// One step in a gesture's pose sequence.
#[derive(Clone, Debug)]
pub struct GestureStep {
    pub pose_id: PoseId,
    /// Maximum allowed gap in ms between this step and the one after it
    /// (the final step measures against the evaluation time).
    pub max_gap_ms: f64,
    /// Declared hold time for the step.  Matching only requires the pose
    /// transition to be present; a continuous hold is not verified.
    pub min_hold_ms: Option<f64>,
}

/// An ordered, time-bounded pose sequence that triggers a technique.
#[derive(Clone, Debug)]
pub struct GestureSpec {
    pub id: GestureId,
    pub name: &'static str,
    pub sequence: Vec<GestureStep>,
    /// Declared minimum tracking confidence; carried on the spec, not
    /// checked by the matcher.
    pub min_confidence: f32,
    /// Declared ceiling on the whole sequence's duration; carried on the
    /// spec, not checked by the matcher.
    pub max_duration_ms: f64,
    /// Minimum spacing between two triggers of this gesture.
    pub cooldown_ms: f64,
}

// ════════════════════════════════════════════════════════════════════════════
// Registry
// ════════════════════════════════════════════════════════════════════════════

/// Startup-time catalog validation failures.  None of these are recoverable
/// at runtime; surface them before the loop begins.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate pose id `{0}`")]
    DuplicatePose(PoseId),
    #[error("duplicate gesture id `{0}`")]
    DuplicateGesture(GestureId),
    #[error("duplicate technique id `{0}`")]
    DuplicateTechnique(TechniqueId),
    #[error("gesture `{0}` has an empty sequence")]
    EmptySequence(GestureId),
    #[error("gesture `{gesture}` references unknown pose `{pose}`")]
    UnknownPose { gesture: GestureId, pose: PoseId },
    #[error("technique `{technique}` references unknown gesture `{gesture}`")]
    UnknownGesture {
        technique: TechniqueId,
        gesture: GestureId,
    },
    #[error("techniques `{0}` and `{1}` both claim cooldown exemption")]
    MultipleExempt(TechniqueId, TechniqueId),
}

/// The three wired pipeline stages produced by [`Registry::build`].
pub struct Pipeline<S> {
    pub poses: PoseClassifier,
    pub gestures: SequenceMatcher,
    pub fx: FxEngine<S>,
}

/// Collects the full catalog before the session starts.  Registration order
/// is meaningful for poses (classifier evaluation order, which settles
/// score ties in favor of the earlier entry).
pub struct Registry<S> {
    poses: Vec<PoseSpec>,
    gestures: Vec<GestureSpec>,
    techniques: Vec<Box<dyn Technique<S>>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Registry {
            poses: Vec::new(),
            gestures: Vec::new(),
            techniques: Vec::new(),
        }
    }

    pub fn register_pose(&mut self, spec: PoseSpec) {
        self.poses.push(spec);
    }

    pub fn register_gesture(&mut self, spec: GestureSpec) {
        self.gestures.push(spec);
    }

    pub fn register_technique(&mut self, technique: Box<dyn Technique<S>>) {
        self.techniques.push(technique);
    }

    /// Validate the catalog and wire the pipeline.
    ///
    /// Gestures come out sorted by step count, longest first (stable, so
    /// equal-length gestures keep their registration order).
    pub fn build(self) -> Result<Pipeline<S>, CatalogError> {
        let Registry {
            poses,
            mut gestures,
            techniques,
        } = self;

        for (i, p) in poses.iter().enumerate() {
            if poses[..i].iter().any(|q| q.id == p.id) {
                return Err(CatalogError::DuplicatePose(p.id));
            }
        }

        for (i, g) in gestures.iter().enumerate() {
            if gestures[..i].iter().any(|h| h.id == g.id) {
                return Err(CatalogError::DuplicateGesture(g.id));
            }
            if g.sequence.is_empty() {
                return Err(CatalogError::EmptySequence(g.id));
            }
            for step in &g.sequence {
                if !poses.iter().any(|p| p.id == step.pose_id) {
                    return Err(CatalogError::UnknownPose {
                        gesture: g.id,
                        pose: step.pose_id,
                    });
                }
            }
        }

        let mut exempt: Option<TechniqueId> = None;
        for (i, t) in techniques.iter().enumerate() {
            if techniques[..i].iter().any(|u| u.id() == t.id()) {
                return Err(CatalogError::DuplicateTechnique(t.id()));
            }
            if !gestures.iter().any(|g| g.id == t.gesture_id()) {
                return Err(CatalogError::UnknownGesture {
                    technique: t.id(),
                    gesture: t.gesture_id(),
                });
            }
            if t.exempt() {
                if let Some(prev) = exempt {
                    return Err(CatalogError::MultipleExempt(prev, t.id()));
                }
                exempt = Some(t.id());
            }
        }

        gestures.sort_by(|a, b| b.sequence.len().cmp(&a.sequence.len()));

        info!(
            "catalog sealed: {} poses, {} gestures, {} techniques",
            poses.len(),
            gestures.len(),
            techniques.len()
        );

        Ok(Pipeline {
            poses: PoseClassifier::new(poses),
            gestures: SequenceMatcher::new(gestures),
            fx: FxEngine::new(techniques),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::FxContext;

    fn zero_score(_: &HandFeatures) -> f32 {
        0.0
    }

    fn pose(id: PoseId) -> PoseSpec {
        PoseSpec { id, name: "test", score: zero_score, threshold: 0.5 }
    }

    fn gesture(id: GestureId, steps: &[PoseId]) -> GestureSpec {
        GestureSpec {
            id,
            name: "test",
            sequence: steps
                .iter()
                .map(|p| GestureStep { pose_id: *p, max_gap_ms: 1000.0, min_hold_ms: None })
                .collect(),
            min_confidence: 0.6,
            max_duration_ms: 3000.0,
            cooldown_ms: 0.0,
        }
    }

    struct Dummy {
        id: TechniqueId,
        gesture: GestureId,
        exempt: bool,
    }

    impl Technique<()> for Dummy {
        fn id(&self) -> TechniqueId {
            self.id
        }
        fn name(&self) -> &'static str {
            "Dummy"
        }
        fn version(&self) -> &'static str {
            "0.0.0"
        }
        fn gesture_id(&self) -> GestureId {
            self.gesture
        }
        fn exempt(&self) -> bool {
            self.exempt
        }
        fn fresh_state(&self) {}
        fn start(&self, _: &mut FxContext<'_>, _: &mut ()) {}
        fn update(&self, _: &mut FxContext<'_>, _: &mut ()) {}
        fn stop(&self, _: &mut FxContext<'_>, _: &mut ()) {}
    }

    #[test]
    fn duplicate_pose_rejected() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_pose(pose("a"));
        reg.register_pose(pose("a"));
        assert!(matches!(reg.build(), Err(CatalogError::DuplicatePose("a"))));
    }

    #[test]
    fn empty_sequence_rejected() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_gesture(gesture("g", &[]));
        assert!(matches!(reg.build(), Err(CatalogError::EmptySequence("g"))));
    }

    #[test]
    fn unknown_pose_reference_rejected() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_gesture(gesture("g", &["missing"]));
        assert!(matches!(
            reg.build(),
            Err(CatalogError::UnknownPose { gesture: "g", pose: "missing" })
        ));
    }

    #[test]
    fn unknown_gesture_reference_rejected() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_technique(Box::new(Dummy { id: "t", gesture: "missing", exempt: false }));
        assert!(matches!(
            reg.build(),
            Err(CatalogError::UnknownGesture { technique: "t", gesture: "missing" })
        ));
    }

    #[test]
    fn second_exempt_technique_rejected() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_pose(pose("a"));
        reg.register_gesture(gesture("g1", &["a"]));
        reg.register_gesture(gesture("g2", &["a"]));
        reg.register_technique(Box::new(Dummy { id: "t1", gesture: "g1", exempt: true }));
        reg.register_technique(Box::new(Dummy { id: "t2", gesture: "g2", exempt: true }));
        assert!(matches!(reg.build(), Err(CatalogError::MultipleExempt("t1", "t2"))));
    }

    #[test]
    fn build_sorts_gestures_longest_first() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_pose(pose("a"));
        reg.register_pose(pose("b"));
        reg.register_gesture(gesture("short", &["a"]));
        reg.register_gesture(gesture("long", &["a", "b"]));
        let pipeline = reg.build().unwrap();
        assert_eq!(pipeline.gestures.gesture_ids(), vec!["long", "short"]);
    }

    #[test]
    fn valid_catalog_builds() {
        let mut reg: Registry<()> = Registry::new();
        reg.register_pose(pose("a"));
        reg.register_gesture(gesture("g", &["a"]));
        reg.register_technique(Box::new(Dummy { id: "t", gesture: "g", exempt: false }));
        assert!(reg.build().is_ok());
    }
}
