//! Per-hand feature extraction — a pure, stateless landmark→feature pass.
//!
//! Heuristics operate on relative landmark distances so they hold at any
//! hand scale the camera delivers:
//!
//! * **Finger open/closed**: fingertip farther from the wrist than 1.1× the
//!   PIP joint means extended.  The thumb folds sideways rather than toward
//!   the wrist, so it compares tip vs IP distance from the pinky MCP.
//! * **Pinch**: thumb-tip to index-tip distance, normalized so touching
//!   (~0.0) maps to 1.0 and anything past 0.1 maps to 0.0.
//! * **Palm normal**: cross product of wrist→index-MCP and wrist→pinky-MCP.
//!
//! Rotation and motion are placeholders: a coarse estimate needs landmark
//! history, which this pass deliberately does not keep.

use crate::{
    Finger, FingerState, FingerStates, Hand, HandFeatures, Motion, Rotation, Vec3,
};

pub const LANDMARK_COUNT: usize = 21;

const WRIST: usize = 0;
const FINGER_TIPS: [usize; 5] = [4, 8, 12, 16, 20];
const FINGER_PIPS: [usize; 5] = [2, 6, 10, 14, 18];
const THUMB_IP: usize = 3;
const INDEX_MCP: usize = 5;
const PINKY_MCP: usize = 17;

/// Derive the feature snapshot for one hand.
///
/// A hand with fewer than [`LANDMARK_COUNT`] landmarks yields a degraded
/// snapshot: all fingers unknown, zero pinch, zero palm normal.
pub fn extract_features(hand: &Hand) -> HandFeatures {
    let lm = &hand.landmarks;

    if lm.len() < LANDMARK_COUNT {
        return HandFeatures {
            hand_id: hand.id.clone(),
            handedness: hand.handedness,
            fingers: FingerStates::default(),
            pinch: 0.0,
            palm_normal: Vec3::ZERO,
            rotation: Rotation::default(),
            motion: Motion::default(),
        };
    }

    let mut fingers = FingerStates::default();
    for (i, finger) in Finger::ALL.into_iter().enumerate() {
        let tip = lm[FINGER_TIPS[i]];
        let state = if finger == Finger::Thumb {
            let anchor = lm[PINKY_MCP];
            if tip.distance(anchor) > lm[THUMB_IP].distance(anchor) {
                FingerState::Open
            } else {
                FingerState::Closed
            }
        } else {
            let wrist = lm[WRIST];
            if tip.distance(wrist) > lm[FINGER_PIPS[i]].distance(wrist) * 1.1 {
                FingerState::Open
            } else {
                FingerState::Closed
            }
        };
        fingers.set(finger, state);
    }

    // Raw tip distance in normalized coords; touching lands around 0.02–0.05.
    let pinch_dist = lm[FINGER_TIPS[1]].distance(lm[FINGER_TIPS[0]]);
    let pinch = (1.0 - pinch_dist / 0.1).clamp(0.0, 1.0);

    let v1 = Vec3::new(
        lm[INDEX_MCP].x - lm[WRIST].x,
        lm[INDEX_MCP].y - lm[WRIST].y,
        lm[INDEX_MCP].z - lm[WRIST].z,
    );
    let v2 = Vec3::new(
        lm[PINKY_MCP].x - lm[WRIST].x,
        lm[PINKY_MCP].y - lm[WRIST].y,
        lm[PINKY_MCP].z - lm[WRIST].z,
    );
    let palm_normal = v1.cross(v2).normalized();

    HandFeatures {
        hand_id: hand.id.clone(),
        handedness: hand.handedness,
        fingers,
        pinch,
        palm_normal,
        rotation: Rotation::default(),
        motion: Motion::default(),
    }
}

/// Approximate palm center in normalized coordinates: the centroid of the
/// wrist and the index/pinky MCP joints.
pub fn palm_center(hand: &Hand) -> Vec3 {
    let lm = &hand.landmarks;
    if lm.len() < LANDMARK_COUNT {
        return Vec3::new(0.5, 0.5, 0.0);
    }
    Vec3::new(
        (lm[WRIST].x + lm[INDEX_MCP].x + lm[PINKY_MCP].x) / 3.0,
        (lm[WRIST].y + lm[INDEX_MCP].y + lm[PINKY_MCP].y) / 3.0,
        (lm[WRIST].z + lm[INDEX_MCP].z + lm[PINKY_MCP].z) / 3.0,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{hand_with_shape, HandShape};
    use crate::Handedness;

    fn features_for(shape: HandShape) -> HandFeatures {
        extract_features(&hand_with_shape(shape, "0", Handedness::Right))
    }

    #[test]
    fn open_hand_opens_all_fingers() {
        let f = features_for(HandShape::Open);
        assert_eq!(f.fingers.open_count(), 5, "all five fingers open: {:?}", f.fingers);
    }

    #[test]
    fn fist_closes_non_thumb_fingers() {
        let f = features_for(HandShape::Fist);
        assert_eq!(f.fingers.index, FingerState::Closed);
        assert_eq!(f.fingers.middle, FingerState::Closed);
        assert_eq!(f.fingers.ring, FingerState::Closed);
        assert_eq!(f.fingers.pinky, FingerState::Closed);
    }

    #[test]
    fn two_fingers_shape_splits_open_and_closed() {
        let f = features_for(HandShape::TwoFingers);
        assert_eq!(f.fingers.index, FingerState::Open);
        assert_eq!(f.fingers.middle, FingerState::Open);
        assert_eq!(f.fingers.ring, FingerState::Closed);
        assert_eq!(f.fingers.pinky, FingerState::Closed);
    }

    #[test]
    fn pinch_shape_scores_high_pinch() {
        let f = features_for(HandShape::Pinch);
        assert!(f.pinch > 0.9, "pinch = {}", f.pinch);
    }

    #[test]
    fn open_hand_scores_low_pinch() {
        let f = features_for(HandShape::Open);
        assert!(f.pinch < 0.2, "pinch = {}", f.pinch);
    }

    #[test]
    fn palm_normal_is_unit_or_zero() {
        let f = features_for(HandShape::Open);
        let len = f.palm_normal.length();
        assert!((len - 1.0).abs() < 1e-4, "palm normal length {}", len);
    }

    #[test]
    fn short_landmark_list_degrades_to_unknown() {
        let hand = Hand {
            id: "x".into(),
            handedness: Handedness::Left,
            confidence: 0.9,
            landmarks: vec![Vec3::ZERO; 5],
        };
        let f = extract_features(&hand);
        assert_eq!(f.fingers, FingerStates::default());
        assert_eq!(f.pinch, 0.0);
        assert_eq!(f.palm_normal, Vec3::ZERO);
    }
}
