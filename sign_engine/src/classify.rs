//! Pose classification over per-hand feature vectors.

use hand_model::{FeaturesFrame, HandFeatures};

use crate::catalog::{PoseId, PoseSpec};

/// A qualifying classification: the winning pose and its score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseHit {
    pub pose_id: PoseId,
    pub score: f32,
}

/// Scores feature vectors against the registered pose catalog.
///
/// Side-effect free; owns nothing but the immutable specs.
pub struct PoseClassifier {
    specs: Vec<PoseSpec>,
}

impl PoseClassifier {
    pub(crate) fn new(specs: Vec<PoseSpec>) -> Self {
        PoseClassifier { specs }
    }

    /// Classify a single hand.
    ///
    /// Definitions are evaluated in registration order; a candidate replaces
    /// the running best only when its score strictly exceeds both its own
    /// threshold and the best so far, so an equal later score loses to the
    /// earlier definition.
    pub fn classify(&self, hand: &HandFeatures) -> Option<PoseHit> {
        let mut best: Option<PoseHit> = None;
        for spec in &self.specs {
            let score = (spec.score)(hand);
            let current = best.map(|b| b.score).unwrap_or(0.0);
            if score > spec.threshold && score > current {
                best = Some(PoseHit { pose_id: spec.id, score });
            }
        }
        best
    }

    /// Classify every hand in a frame and reduce to the single active-pose
    /// signal.
    ///
    /// Hands are evaluated in frame order and the last hand that produces a
    /// hit wins; hands with no hit leave the running result untouched.
    /// With several qualifying hands this means "last evaluated" rather
    /// than "most confident" — kept as-is deliberately.  An empty frame
    /// yields no pose.
    pub fn classify_frame(&self, frame: &FeaturesFrame) -> Option<PoseHit> {
        let mut active = None;
        for hand in &frame.hands {
            if let Some(hit) = self.classify(hand) {
                active = Some(hit);
            }
        }
        active
    }

    pub fn pose_name(&self, id: PoseId) -> Option<&'static str> {
        self.specs.iter().find(|s| s.id == id).map(|s| s.name)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_model::{
        FingerState, FingerStates, HandFeatures, Handedness, Motion, Rotation, Vec3,
    };

    fn features(open_fingers: usize, pinch: f32) -> HandFeatures {
        let mut fingers = FingerStates::default();
        for f in hand_model::Finger::ALL.into_iter().take(open_fingers) {
            fingers.set(f, FingerState::Open);
        }
        HandFeatures {
            hand_id: "0".into(),
            handedness: Handedness::Right,
            fingers,
            pinch,
            palm_normal: Vec3::new(0.0, 0.0, 1.0),
            rotation: Rotation::default(),
            motion: Motion::default(),
        }
    }

    fn open_score(f: &HandFeatures) -> f32 {
        f.fingers.open_count() as f32 / 5.0
    }

    fn pinch_score(f: &HandFeatures) -> f32 {
        f.pinch
    }

    fn half_score(_: &HandFeatures) -> f32 {
        0.5
    }

    fn classifier(specs: Vec<PoseSpec>) -> PoseClassifier {
        PoseClassifier::new(specs)
    }

    #[test]
    fn no_specs_yields_no_pose() {
        let c = classifier(vec![]);
        assert_eq!(c.classify(&features(5, 0.0)), None);
    }

    #[test]
    fn score_equal_to_threshold_does_not_qualify() {
        let c = classifier(vec![PoseSpec {
            id: "half",
            name: "Half",
            score: half_score,
            threshold: 0.5,
        }]);
        assert_eq!(c.classify(&features(0, 0.0)), None);
    }

    #[test]
    fn score_above_threshold_qualifies() {
        let c = classifier(vec![PoseSpec {
            id: "half",
            name: "Half",
            score: half_score,
            threshold: 0.4,
        }]);
        let hit = c.classify(&features(0, 0.0)).unwrap();
        assert_eq!(hit.pose_id, "half");
        assert_eq!(hit.score, 0.5);
    }

    #[test]
    fn highest_qualifying_score_wins() {
        let c = classifier(vec![
            PoseSpec { id: "open", name: "Open", score: open_score, threshold: 0.2 },
            PoseSpec { id: "pinch", name: "Pinch", score: pinch_score, threshold: 0.2 },
        ]);
        let hit = c.classify(&features(2, 0.9)).unwrap();
        assert_eq!(hit.pose_id, "pinch");
    }

    #[test]
    fn equal_scores_keep_the_earlier_definition() {
        let c = classifier(vec![
            PoseSpec { id: "first", name: "First", score: half_score, threshold: 0.1 },
            PoseSpec { id: "second", name: "Second", score: half_score, threshold: 0.1 },
        ]);
        assert_eq!(c.classify(&features(0, 0.0)).unwrap().pose_id, "first");
    }

    #[test]
    fn empty_frame_yields_no_pose() {
        let c = classifier(vec![PoseSpec {
            id: "half",
            name: "Half",
            score: half_score,
            threshold: 0.1,
        }]);
        let frame = FeaturesFrame { t: 0.0, hands: vec![] };
        assert_eq!(c.classify_frame(&frame), None);
    }

    #[test]
    fn last_qualifying_hand_wins_the_frame() {
        let c = classifier(vec![
            PoseSpec { id: "open", name: "Open", score: open_score, threshold: 0.5 },
            PoseSpec { id: "pinch", name: "Pinch", score: pinch_score, threshold: 0.5 },
        ]);
        let frame = FeaturesFrame {
            t: 0.0,
            hands: vec![features(5, 0.0), features(0, 0.9)],
        };
        assert_eq!(c.classify_frame(&frame).unwrap().pose_id, "pinch");
    }

    #[test]
    fn non_qualifying_hand_does_not_erase_earlier_hit() {
        let c = classifier(vec![PoseSpec {
            id: "open",
            name: "Open",
            score: open_score,
            threshold: 0.5,
        }]);
        let frame = FeaturesFrame {
            t: 0.0,
            hands: vec![features(5, 0.0), features(0, 0.0)],
        };
        assert_eq!(c.classify_frame(&frame).unwrap().pose_id, "open");
    }
}
