//! Canonical synthetic hand frames.
//!
//! Each [`HandShape`] maps to a fixed 21-landmark layout whose derived
//! features land cleanly inside one pose's acceptance region.  The keyboard
//! simulator emits these instead of camera-tracked landmarks, and tests use
//! them to drive the full extraction → classification path.

use crate::{Hand, HandFrame, Handedness, TimeMs, Vec3};

/// Shapes the simulator can hold a hand in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandShape {
    /// All five fingers extended.
    Open,
    /// All fingers curled into the palm.
    Fist,
    /// Index and middle extended, ring and pinky curled.
    TwoFingers,
    /// Thumb and index fingertips touching, index curled to meet the thumb.
    Pinch,
}

const WRIST: Vec3 = Vec3 { x: 0.50, y: 0.85, z: 0.0 };
const FINGER_X: [f32; 4] = [0.42, 0.48, 0.54, 0.60]; // index..pinky columns

fn extended(x: f32) -> [Vec3; 4] {
    [
        Vec3::new(x, 0.70, 0.0), // MCP
        Vec3::new(x, 0.60, 0.0), // PIP
        Vec3::new(x, 0.50, 0.0), // DIP
        Vec3::new(x, 0.40, 0.0), // tip
    ]
}

fn curled(x: f32) -> [Vec3; 4] {
    [
        Vec3::new(x, 0.70, 0.0),
        Vec3::new(x, 0.62, 0.0),
        Vec3::new(x, 0.68, 0.0),
        Vec3::new(x, 0.74, 0.0), // tip folded back toward the palm
    ]
}

fn thumb_extended() -> [Vec3; 4] {
    [
        Vec3::new(0.40, 0.78, 0.0), // CMC
        Vec3::new(0.36, 0.72, 0.0), // MCP
        Vec3::new(0.33, 0.66, 0.0), // IP
        Vec3::new(0.30, 0.60, 0.0), // tip
    ]
}

fn thumb_folded() -> [Vec3; 4] {
    [
        Vec3::new(0.44, 0.78, 0.0),
        Vec3::new(0.42, 0.75, 0.0),
        Vec3::new(0.40, 0.70, 0.0),
        Vec3::new(0.44, 0.72, 0.0),
    ]
}

/// Thumb and index chains bent so both tips meet at one point.
fn pinch_thumb() -> [Vec3; 4] {
    [
        Vec3::new(0.43, 0.76, 0.0),
        Vec3::new(0.41, 0.70, 0.0),
        Vec3::new(0.43, 0.655, 0.0),
        Vec3::new(0.46, 0.62, 0.0), // tip at the pinch point
    ]
}

fn pinch_index() -> [Vec3; 4] {
    [
        Vec3::new(0.42, 0.70, 0.0),
        Vec3::new(0.43, 0.63, 0.0),
        Vec3::new(0.45, 0.625, 0.0),
        Vec3::new(0.46, 0.62, 0.0), // tip at the pinch point
    ]
}

/// Build the 21-landmark layout for a shape (right-hand geometry).
fn landmarks(shape: HandShape) -> Vec<Vec3> {
    let mut lm = Vec::with_capacity(21);
    lm.push(WRIST);

    let (thumb, chains): ([Vec3; 4], [[Vec3; 4]; 4]) = match shape {
        HandShape::Open => (
            thumb_extended(),
            [
                extended(FINGER_X[0]),
                extended(FINGER_X[1]),
                extended(FINGER_X[2]),
                extended(FINGER_X[3]),
            ],
        ),
        HandShape::Fist => (
            thumb_folded(),
            [
                curled(FINGER_X[0]),
                curled(FINGER_X[1]),
                curled(FINGER_X[2]),
                curled(FINGER_X[3]),
            ],
        ),
        HandShape::TwoFingers => (
            thumb_folded(),
            [
                extended(FINGER_X[0]),
                extended(FINGER_X[1]),
                curled(FINGER_X[2]),
                curled(FINGER_X[3]),
            ],
        ),
        HandShape::Pinch => (
            pinch_thumb(),
            [
                pinch_index(),
                extended(FINGER_X[1]),
                extended(FINGER_X[2]),
                extended(FINGER_X[3]),
            ],
        ),
    };

    lm.extend(thumb);
    for chain in chains {
        lm.extend(chain);
    }
    lm
}

/// One synthetic hand in the given shape.
pub fn hand_with_shape(shape: HandShape, id: &str, handedness: Handedness) -> Hand {
    let mut lm = landmarks(shape);
    if handedness == Handedness::Left {
        for p in &mut lm {
            p.x = 1.0 - p.x;
        }
    }
    Hand {
        id: id.to_string(),
        handedness,
        confidence: 1.0,
        landmarks: lm,
    }
}

/// A full frame holding one right hand in `shape`, or no hands at all.
pub fn frame(t: TimeMs, width: usize, height: usize, shape: Option<HandShape>) -> HandFrame {
    HandFrame {
        t,
        width,
        height,
        hands: shape
            .map(|s| vec![hand_with_shape(s, "0", Handedness::Right)])
            .unwrap_or_default(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
