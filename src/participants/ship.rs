//! The player's ship

use glam::Vec2;

use super::ParticipantError;
use crate::consts::*;
use crate::sim::{
    Body, Capabilities, Controls, Effects, GameEvent, Outline, Participant, ParticipantKind,
    ParticipantView,
};

/// Handling parameters, copied from settings when the ship is placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipTuning {
    /// Radians per frame
    pub turn_rate: f32,
    /// Speed gained per frame of thrust
    pub acceleration: f32,
    pub speed_limit: f32,
    /// Velocity multiplier applied every frame
    pub friction: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            turn_rate: SHIP_TURN_RATE,
            acceleration: SHIP_ACCELERATION,
            speed_limit: SHIP_SPEED_LIMIT,
            friction: SHIP_FRICTION,
        }
    }
}

/// Nose of a ship-shaped body: ahead of the center along the rotation
pub fn nose_of(body: &Body) -> Vec2 {
    body.position() + Vec2::from_angle(body.rotation()) * SHIP_NOSE
}

/// Concave arrowhead, nose on +x
fn hull() -> Result<Outline, ParticipantError> {
    Ok(Outline::new(vec![
        Vec2::new(SHIP_NOSE, 0.0),
        Vec2::new(-21.0, 12.0),
        Vec2::new(-14.0, 8.0),
        Vec2::new(-14.0, -8.0),
        Vec2::new(-21.0, -12.0),
    ])?)
}

#[derive(Debug)]
pub struct Ship {
    body: Body,
    outline: Outline,
    tuning: ShipTuning,
}

impl Ship {
    pub fn new(
        position: Vec2,
        rotation: f32,
        tuning: ShipTuning,
    ) -> Result<Self, ParticipantError> {
        Ok(Self {
            body: Body::new(position, rotation)?,
            outline: hull()?,
            tuning,
        })
    }

    /// Bullet spawn point
    pub fn nose(&self) -> Vec2 {
        nose_of(&self.body)
    }

    pub fn turn_left(&mut self) {
        self.body.rotate(-self.tuning.turn_rate);
    }

    pub fn turn_right(&mut self) {
        self.body.rotate(self.tuning.turn_rate);
    }

    /// Thrust along the current rotation, capped at the speed limit
    pub fn accelerate(&mut self) {
        let thrust = Vec2::from_angle(self.body.rotation()) * self.tuning.acceleration;
        let velocity = (self.body.velocity() + thrust).clamp_length_max(self.tuning.speed_limit);
        if let Err(e) = self.body.set_velocity_vector(velocity) {
            log::warn!("Ship thrust rejected: {}", e);
        }
    }

    pub fn tuning(&self) -> ShipTuning {
        self.tuning
    }
}

impl Participant for Ship {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn outline(&self) -> &Outline {
        &self.outline
    }

    fn kind(&self) -> ParticipantKind {
        ParticipantKind::Ship
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::SHIP | Capabilities::ASTEROID_DESTROYER
    }

    fn step(&mut self, field_size: f32) {
        let slowed = self.body.velocity() * self.tuning.friction;
        if self.body.set_velocity_vector(slowed).is_ok() {
            self.body.advance(1.0, field_size);
        }
    }

    fn collided_with(&mut self, other: &ParticipantView, fx: &mut Effects<'_>) {
        if other.capabilities.contains(Capabilities::SHIP_DESTROYER) {
            fx.expire_self();
            fx.notify(GameEvent::ShipDestroyed {
                position: self.body.position(),
            });
        }
    }

    fn steer(&mut self, controls: &Controls) {
        if controls.turn_left {
            self.turn_left();
        }
        if controls.turn_right {
            self.turn_right();
        }
        if controls.thrust {
            self.accelerate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn ship_facing_up() -> Ship {
        Ship::new(Vec2::new(375.0, 375.0), -PI / 2.0, ShipTuning::default()).unwrap()
    }

    #[test]
    fn test_nose_is_ahead_of_center() {
        let ship = ship_facing_up();
        let nose = ship.nose();
        assert!((nose.x - 375.0).abs() < 1e-3);
        assert!((nose.y - (375.0 - SHIP_NOSE)).abs() < 1e-3);
    }

    #[test]
    fn test_turning_changes_rotation_only() {
        let mut ship = ship_facing_up();
        ship.turn_right();
        assert!((ship.body().rotation() - (-PI / 2.0 + SHIP_TURN_RATE)).abs() < 1e-5);
        ship.turn_left();
        ship.turn_left();
        assert!((ship.body().rotation() - (-PI / 2.0 - SHIP_TURN_RATE)).abs() < 1e-5);
        assert_eq!(ship.body().velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_acceleration_is_capped() {
        let mut ship = ship_facing_up();
        for _ in 0..100 {
            ship.accelerate();
        }
        assert!((ship.body().speed() - SHIP_SPEED_LIMIT).abs() < 1e-3);
        assert!(ship.body().velocity().y < 0.0);
    }

    #[test]
    fn test_friction_slows_the_ship() {
        let mut ship = ship_facing_up();
        ship.accelerate();
        let before = ship.body().speed();
        ship.step(FIELD_SIZE);
        assert!(ship.body().speed() < before);
        assert!(ship.body().position().y < 375.0);
    }

    #[test]
    fn test_steer_applies_controls() {
        let mut ship = ship_facing_up();
        ship.steer(&Controls {
            thrust: true,
            ..Default::default()
        });
        assert!((ship.body().speed() - SHIP_ACCELERATION).abs() < 1e-5);

        // Opposite turns cancel out
        let rotation = ship.body().rotation();
        ship.steer(&Controls {
            turn_left: true,
            turn_right: true,
            ..Default::default()
        });
        assert!((ship.body().rotation() - rotation).abs() < 1e-5);
    }

    #[test]
    fn test_capabilities() {
        let ship = ship_facing_up();
        assert!(ship.capabilities().contains(Capabilities::SHIP));
        assert!(ship.capabilities().contains(Capabilities::ASTEROID_DESTROYER));
        assert!(!ship.capabilities().contains(Capabilities::SHIP_DESTROYER));
    }
}
