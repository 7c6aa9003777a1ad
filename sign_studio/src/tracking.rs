//! Hand tracking sources — keyboard simulation and LeapMotion hardware.
//!
//! The public interface is a stream of [`HandFrame`]s delivered over an
//! `mpsc` channel.  Consumers don't need to know whether frames came from
//! real hardware or the simulator; either way a frame arrives only when the
//! source has genuinely advanced, so the app never reprocesses stale data.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use hand_model::synth::{self, HandShape};
use hand_model::{HandFrame, TimeMs};

// ════════════════════════════════════════════════════════════════════════════
// Clock
// ════════════════════════════════════════════════════════════════════════════

/// Session clock: milliseconds since the app launched, shared by the tick
/// loop and the tracking thread so frame timestamps line up.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Clock { origin: Instant::now() }
    }

    pub fn now_ms(&self) -> TimeMs {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait TrackingSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a tracking source on its own thread and return the receiving end.
pub fn spawn_tracking_source<T: TrackingSource>(source: T) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimTrackingSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Hold the given shape, or drop the hand entirely.
    SetShape(Option<HandShape>),
}

/// Tracking source driven by [`SimInput`] events from the visualizer's
/// window.  Emits a synthetic frame at ~30 fps holding whatever shape was
/// last selected; `None` emits empty frames (tracking loss).
pub struct SimTrackingSource {
    rx: Receiver<SimInput>,
    clock: Clock,
    width: usize,
    height: usize,
    shape: Option<HandShape>,
}

impl SimTrackingSource {
    pub fn new(rx: Receiver<SimInput>, clock: Clock, width: usize, height: usize) -> Self {
        SimTrackingSource { rx, clock, width, height, shape: None }
    }
}

impl TrackingSource for SimTrackingSource {
    fn run(mut self: Box<Self>, tx: Sender<HandFrame>) {
        const FRAME_INTERVAL: Duration = Duration::from_millis(33);

        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::SetShape(shape)) => self.shape = shape,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            let frame = synth::frame(self.clock.now_ms(), self.width, self.height, self.shape);
            if tx.send(frame).is_err() {
                return;
            }
            thread::sleep(FRAME_INTERVAL);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTrackingSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracking source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Leap hands arrive as a palm plus four-boned digits in millimeters; each
/// digit's joint chain maps onto the 21-landmark topology and positions are
/// squeezed into the normalized frame space the pipeline expects.
#[cfg(feature = "leap")]
pub struct LeapTrackingSource {
    pub clock: Clock,
    pub width: usize,
    pub height: usize,
}

#[cfg(feature = "leap")]
impl TrackingSource for LeapTrackingSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .expect("Failed to open LeapC connection");
        connection.open().expect("Failed to open LeapMotion device");

        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let t = self.clock.now_ms();
                let hands = frame
                    .hands()
                    .enumerate()
                    .map(|(i, h)| leap_hand(i, &h))
                    .collect();
                let out = HandFrame { t, width: self.width, height: self.height, hands };
                if tx.send(out).is_err() {
                    return;
                }
            }
        }
    }
}

/// Squeeze a LeapC millimeter position into normalized frame space.
/// The interaction volume is roughly ±250 mm across and 50–450 mm above
/// the controller; Leap's Y points up while image Y points down.
#[cfg(feature = "leap")]
fn leap_norm(p: leaprs::Vector) -> hand_model::Vec3 {
    hand_model::Vec3::new(
        ((p.x + 250.0) / 500.0).clamp(0.0, 1.0),
        (1.0 - (p.y - 50.0) / 400.0).clamp(0.0, 1.0),
        (p.z / 500.0).clamp(-1.0, 1.0),
    )
}

#[cfg(feature = "leap")]
fn leap_hand(index: usize, hand: &leaprs::Hand) -> hand_model::Hand {
    use leaprs::*;

    let handedness = if hand.hand_type() == HandType::Left {
        hand_model::Handedness::Left
    } else {
        hand_model::Handedness::Right
    };

    let mut landmarks = Vec::with_capacity(21);
    landmarks.push(leap_norm(hand.palm().position()));

    for digit in hand.digits() {
        landmarks.push(leap_norm(digit.proximal().prev_joint()));
        landmarks.push(leap_norm(digit.proximal().next_joint()));
        landmarks.push(leap_norm(digit.intermediate().next_joint()));
        landmarks.push(leap_norm(digit.distal().next_joint()));
    }

    hand_model::Hand {
        id: index.to_string(),
        handedness,
        confidence: 1.0,
        landmarks,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
