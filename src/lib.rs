//! Asteroid Field - a wraparound arcade simulation core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (motion, outlines, collisions, countdowns, registry)
//! - `participants`: Ship, asteroid and bullet behaviours built on the `sim` contract
//! - `game`: Thin headless driver (lives, bullet cap, level transitions)
//! - `settings`: Data-driven tuning loaded from JSON

pub mod game;
pub mod participants;
pub mod settings;
pub mod sim;

pub use game::{Controls, Game, GameError, Phase};
pub use settings::{ConfigError, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default side length of the square, toroidal field
    pub const FIELD_SIZE: f32 = 750.0;
    /// Distance of the seeded asteroids from the field corners
    pub const EDGE_OFFSET: f32 = 100.0;

    /// Ship defaults
    pub const SHIP_TURN_RATE: f32 = std::f32::consts::PI / 16.0;
    pub const SHIP_ACCELERATION: f32 = 0.5;
    pub const SHIP_SPEED_LIMIT: f32 = 15.0;
    pub const SHIP_FRICTION: f32 = 0.995;
    /// Distance from ship center to the nose (bullet spawn point)
    pub const SHIP_NOSE: f32 = 21.0;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 15.0;
    /// Bullet lifespan in frames (~1 second at 30 fps)
    pub const BULLET_LIFESPAN: u32 = 30;
    /// Maximum live bullets
    pub const BULLET_LIMIT: usize = 8;

    /// Asteroid speed per size (small, medium, large)
    pub const ASTEROID_SPEED: [f32; 3] = [5.0, 3.0, 1.5];
    /// Outline scale per size (small, medium, large)
    pub const ASTEROID_SCALE: [f32; 3] = [0.5, 1.0, 2.0];

    /// Frames between a ship loss / level clear and the follow-up transition
    pub const END_DELAY: u32 = 75;
    /// Lives at the start of a game
    pub const LIVES: u8 = 1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { -PI } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        let a = normalize_angle(3.0 * PI);
        assert!((-PI..PI).contains(&a));
        assert!((a.abs() - PI).abs() < 1e-4);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_polar_roundtrip() {
        let v = polar_to_cartesian(10.0, PI / 3.0);
        let (r, theta) = cartesian_to_polar(v);
        assert!((r - 10.0).abs() < 1e-4);
        assert!((theta - PI / 3.0).abs() < 1e-5);
    }
}
