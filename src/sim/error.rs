//! Construction-time faults raised by the simulation core
//!
//! Everything else in `sim` degrades to a no-op instead of failing.

use thiserror::Error;

/// A polygon that cannot serve as a collision outline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutlineError {
    #[error("outline needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("outline point {index} is not finite")]
    NonFinite { index: usize },

    #[error("outline encloses no area")]
    Degenerate,

    #[error("outline edges {first} and {second} cross")]
    SelfIntersecting { first: usize, second: usize },
}

/// Rejected kinematic input
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum KinematicsError {
    #[error("position ({x}, {y}) is not finite")]
    Position { x: f32, y: f32 },

    #[error("velocity (speed {speed}, heading {heading}) is not finite")]
    Velocity { speed: f32, heading: f32 },

    #[error("rotation {0} is not finite")]
    Rotation(f32),
}
