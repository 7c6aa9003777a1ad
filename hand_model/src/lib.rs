//! # hand_model
//!
//! Data model for tracked hands and the per-hand geometric features derived
//! from them.  One [`HandFrame`] arrives per video frame from a tracking
//! source; [`features::extract_features`] turns each hand's 21 landmarks
//! into a [`HandFeatures`] snapshot that the recognition layers consume.
//!
//! ## Landmark topology
//!
//! Hands carry 21 ordered landmarks in normalized `[0,1]×[0,1]`×depth space:
//!
//! | Index | Point |
//! |---|---|
//! | 0 | wrist |
//! | 1–4 | thumb (CMC, MCP, IP, tip) |
//! | 5–8 | index (MCP, PIP, DIP, tip) |
//! | 9–12 | middle (MCP, PIP, DIP, tip) |
//! | 13–16 | ring (MCP, PIP, DIP, tip) |
//! | 17–20 | pinky (MCP, PIP, DIP, tip) |
//!
//! The [`synth`] module builds canonical landmark layouts for a handful of
//! recognizable shapes, used by the keyboard simulator and by tests.

pub mod features;
pub mod synth;

/// Milliseconds on the session clock.
pub type TimeMs = f64;

// ════════════════════════════════════════════════════════════════════════════
// Vec3
// ════════════════════════════════════════════════════════════════════════════

/// A point or direction in normalized landmark space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Unit-length copy; degenerate inputs collapse to [`Vec3::ZERO`].
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len < 1e-6 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tracked hands
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left => "LEFT",
            Handedness::Right => "RIGHT",
        }
    }
}

/// One tracked hand as delivered by a detection source.
#[derive(Clone, Debug)]
pub struct Hand {
    /// Stable identifier for the hand within a session, where the source
    /// can provide one; otherwise a per-frame index.
    pub id: String,
    pub handedness: Handedness,
    /// Tracking confidence in `0..=1`.
    pub confidence: f32,
    /// 21 ordered landmarks; see the crate docs for the topology.
    pub landmarks: Vec<Vec3>,
}

/// All hands seen in one video frame.
#[derive(Clone, Debug, Default)]
pub struct HandFrame {
    pub t: TimeMs,
    pub width: usize,
    pub height: usize,
    pub hands: Vec<Hand>,
}

impl HandFrame {
    /// A frame with no hands — tracking loss or a source that is not ready.
    pub fn empty(t: TimeMs, width: usize, height: usize) -> Self {
        HandFrame { t, width, height, hands: Vec::new() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Derived features
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] =
        [Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FingerState {
    Open,
    Closed,
    #[default]
    Unknown,
}

/// Open/closed verdict for each of the five fingers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: FingerState,
    pub index: FingerState,
    pub middle: FingerState,
    pub ring: FingerState,
    pub pinky: FingerState,
}

impl FingerStates {
    pub fn state(&self, finger: Finger) -> FingerState {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    pub fn set(&mut self, finger: Finger, state: FingerState) {
        match finger {
            Finger::Thumb => self.thumb = state,
            Finger::Index => self.index = state,
            Finger::Middle => self.middle = state,
            Finger::Ring => self.ring = state,
            Finger::Pinky => self.pinky = state,
        }
    }

    pub fn open_count(&self) -> usize {
        Finger::ALL
            .iter()
            .filter(|f| self.state(**f) == FingerState::Open)
            .count()
    }
}

/// Coarse orientation estimate in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Coarse motion estimate for the hand as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub speed: f32,
    pub stable: bool,
}

impl Default for Motion {
    fn default() -> Self {
        Motion { speed: 0.0, stable: true }
    }
}

/// Per-hand, per-frame feature snapshot.  Produced fresh every frame and
/// never mutated after creation.
#[derive(Clone, Debug)]
pub struct HandFeatures {
    pub hand_id: String,
    pub handedness: Handedness,
    pub fingers: FingerStates,
    /// `1.0` = thumb and index fingertips touching, `0.0` = far apart.
    pub pinch: f32,
    /// Unit-length palm normal; zero when the landmarks are degenerate.
    pub palm_normal: Vec3,
    pub rotation: Rotation,
    pub motion: Motion,
}

/// Features for every hand in one frame, in the same order as the frame.
#[derive(Clone, Debug, Default)]
pub struct FeaturesFrame {
    pub t: TimeMs,
    pub hands: Vec<HandFeatures>,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
