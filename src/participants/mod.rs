//! Concrete participants
//!
//! The ship, asteroids and bullets. Each one is plain data plus a
//! [`Participant`](crate::sim::Participant) impl; all interaction goes
//! through capability flags and the [`Effects`](crate::sim::Effects) sink.

pub mod asteroid;
pub mod bullet;
pub mod ship;

pub use asteroid::Asteroid;
pub use bullet::Bullet;
pub use ship::{Ship, ShipTuning, nose_of};

use thiserror::Error;

use crate::sim::{KinematicsError, OutlineError};

/// Failure to build a participant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticipantError {
    #[error(transparent)]
    Outline(#[from] OutlineError),

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),

    #[error("asteroid size {0} out of range (0-2)")]
    AsteroidSize(u8),

    #[error("asteroid variety {0} out of range (0-3)")]
    AsteroidVariety(u8),
}
