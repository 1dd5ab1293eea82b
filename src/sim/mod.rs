//! Frame-driven simulation module
//!
//! Everything that moves, collides or expires lives here:
//! - Wraparound motion on a square torus
//! - Polygon outlines and symmetric overlap tests
//! - The participant contract and capability flags
//! - Countdown timers tied to participant lifetimes
//! - The registry that commits additions and removals once per frame
//!
//! No rendering, input or game rules.

pub mod collision;
pub mod countdown;
pub mod error;
pub mod motion;
pub mod outline;
pub mod participant;
pub mod state;

pub use countdown::{Countdown, CountdownScheduler, CountdownState, Fired};
pub use error::{KinematicsError, OutlineError};
pub use motion::{advance, wrap, wrap_position};
pub use outline::{Outline, overlap_on_torus, polygons_overlap};
pub use participant::{
    Body, Capabilities, Controls, Effects, GameEvent, Participant, ParticipantId, ParticipantKind,
    ParticipantView,
};
pub use state::{FrameReport, ParticipantState};
