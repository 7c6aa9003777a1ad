//! # sign_studio
//!
//! Interactive hand-sign technique visualizer.  A tracking source streams
//! [`HandFrame`](hand_model::HandFrame)s into the recognition pipeline;
//! triggered techniques paint the overlay canvas, which the window
//! composites over the backdrop every tick.
//!
//! ## Sign → technique mapping
//!
//! | Sign sequence | Technique |
//! |---|---|
//! | Hold an open hand | Aura — sustained glow while the pose holds |
//! | Pinch, then open the hand | Fireball — charge orb, then a blast |
//! | Fist, then two fingers | Slash — sweeping diagonal cuts |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: number keys pick the simulated hand
//!   shape; no hardware needed.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC and derives the 21-landmark frames from it.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `1` | Hold a fist |
//! | `2` | Hold two fingers |
//! | `3` | Hold an open hand |
//! | `4` | Hold a pinch |
//! | `0` | Drop the hand (tracking loss) |
//! | `D` | Toggle the skeleton/debug overlay |
//! | `X` | Stop every active technique |
//! | `Q` | Quit |

pub mod app;
pub mod tracking;
pub mod visualizer;
