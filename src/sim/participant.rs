//! Participant contract
//!
//! A participant is anything that moves on the field and can collide: the
//! ship, asteroids, bullets. Behaviour is polymorphic through the
//! [`Participant`] trait; which pairs interact is decided by capability
//! flags, never by concrete type.

use bitflags::bitflags;
use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::error::KinematicsError;
use super::motion;
use super::outline::Outline;
use crate::{normalize_angle, polar_to_cartesian};

new_key_type! {
    /// Generation-counted handle to a registered participant
    ///
    /// Once a participant is purged its id never resolves again, even if the
    /// slot is reused by a later participant.
    pub struct ParticipantId;
}

bitflags! {
    /// What a participant does to (and is) on contact
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u8 {
        /// Destroys `ASTEROID` bodies on contact
        const ASTEROID_DESTROYER = 1 << 0;
        /// Destroys `SHIP` bodies on contact
        const SHIP_DESTROYER = 1 << 1;
        /// Wants to hear about contact with `ASTEROID` bodies
        const ASTEROID_COLLISION_LISTENER = 1 << 2;
        /// Is an asteroid body
        const ASTEROID = 1 << 3;
        /// Is a ship body
        const SHIP = 1 << 4;
    }
}

impl Capabilities {
    /// Whether `self` destroys a body tagged with `other`
    pub fn destroys(self, other: Capabilities) -> bool {
        (self.contains(Self::ASTEROID_DESTROYER) && other.contains(Self::ASTEROID))
            || (self.contains(Self::SHIP_DESTROYER) && other.contains(Self::SHIP))
    }

    /// Whether `self` listens for contact with `other`
    pub fn listens_to(self, other: Capabilities) -> bool {
        self.contains(Self::ASTEROID_COLLISION_LISTENER) && other.contains(Self::ASTEROID)
    }

    /// Whether a pair carrying these capabilities needs a collision test
    pub fn interacts(a: Capabilities, b: Capabilities) -> bool {
        a.destroys(b) || b.destroys(a) || a.listens_to(b) || b.listens_to(a)
    }
}

/// Coarse participant kind, used only for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantKind {
    Ship,
    Asteroid,
    Bullet,
    Other,
}

/// Kinematic state shared by every participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    expired: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            expired: false,
        }
    }
}

impl Body {
    pub fn new(position: Vec2, rotation: f32) -> Result<Self, KinematicsError> {
        let mut body = Self::default();
        body.set_position(position.x, position.y)?;
        body.set_rotation(rotation)?;
        Ok(body)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Per-tick displacement
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Velocity heading (radians); zero when stationary
    pub fn heading(&self) -> f32 {
        if self.velocity == Vec2::ZERO {
            0.0
        } else {
            self.velocity.y.atan2(self.velocity.x)
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn expired(&self) -> bool {
        self.expired
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> Result<(), KinematicsError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(KinematicsError::Position { x, y });
        }
        self.position = Vec2::new(x, y);
        Ok(())
    }

    /// Set velocity in polar form
    pub fn set_velocity(&mut self, speed: f32, heading: f32) -> Result<(), KinematicsError> {
        if !speed.is_finite() || !heading.is_finite() {
            return Err(KinematicsError::Velocity { speed, heading });
        }
        self.velocity = polar_to_cartesian(speed, heading);
        Ok(())
    }

    /// Set velocity from Cartesian components
    pub fn set_velocity_vector(&mut self, velocity: Vec2) -> Result<(), KinematicsError> {
        if !velocity.is_finite() {
            return Err(KinematicsError::Velocity {
                speed: velocity.length(),
                heading: velocity.y.atan2(velocity.x),
            });
        }
        self.velocity = velocity;
        Ok(())
    }

    pub fn set_rotation(&mut self, theta: f32) -> Result<(), KinematicsError> {
        if !theta.is_finite() {
            return Err(KinematicsError::Rotation(theta));
        }
        self.rotation = normalize_angle(theta);
        Ok(())
    }

    /// Rotate in place by `delta` radians
    pub fn rotate(&mut self, delta: f32) {
        if delta.is_finite() {
            self.rotation = normalize_angle(self.rotation + delta);
        }
    }

    /// Move by one tick of `dt` with wraparound
    pub fn advance(&mut self, dt: f32, field_size: f32) {
        self.position = motion::advance(self.position, self.velocity, dt, field_size);
    }

    pub(crate) fn wrap_into(&mut self, field_size: f32) {
        self.position = motion::wrap_position(self.position, field_size);
    }

    pub(crate) fn mark_expired(&mut self) -> bool {
        let was_live = !self.expired;
        self.expired = true;
        was_live
    }
}

/// Pilot commands for one frame (already decoded from whatever input device)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
}

/// Notifications emitted by participants for the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An asteroid of the given size was destroyed at `position`
    AsteroidDestroyed { size: u8, position: Vec2 },
    /// The ship was destroyed at `position`
    ShipDestroyed { position: Vec2 },
}

/// Read-only view of a participant, handed to the other side of a collision
/// and used for render snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
    pub capabilities: Capabilities,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    /// Outline in field space
    pub outline: Vec<Vec2>,
}

impl ParticipantView {
    /// View with the position reduced into the field
    pub fn of(id: ParticipantId, p: &dyn Participant, field_size: f32) -> Self {
        let body = p.body();
        let position = motion::wrap_position(body.position(), field_size);
        Self {
            id,
            kind: p.kind(),
            capabilities: p.capabilities(),
            position,
            velocity: body.velocity(),
            rotation: body.rotation(),
            outline: p.outline().to_field(position, body.rotation()),
        }
    }
}

/// A countdown request recorded by a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownRequest {
    pub target: ParticipantId,
    pub ticks: u32,
    pub payload: u32,
}

/// Side-effect sink handed to participant callbacks
///
/// Callbacks never touch the registry directly; everything they ask for is
/// recorded here and applied by the registry once the callback returns.
pub struct Effects<'a> {
    this: ParticipantId,
    rng: &'a mut Pcg32,
    outcome: Outcome,
}

/// Owned, borrow-free result of a callback
#[derive(Default)]
pub struct Outcome {
    pub spawned: Vec<Box<dyn Participant>>,
    pub expired: Vec<ParticipantId>,
    pub countdowns: Vec<CountdownRequest>,
    pub events: Vec<GameEvent>,
}

impl<'a> Effects<'a> {
    pub fn new(this: ParticipantId, rng: &'a mut Pcg32) -> Self {
        Self {
            this,
            rng,
            outcome: Outcome::default(),
        }
    }

    /// Shared simulation RNG
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut *self.rng
    }

    /// Register a new participant at the next commit point
    pub fn spawn(&mut self, participant: Box<dyn Participant>) {
        self.outcome.spawned.push(participant);
    }

    /// Expire the participant whose callback is running
    pub fn expire_self(&mut self) {
        self.outcome.expired.push(self.this);
    }

    /// Expire any participant by id
    pub fn expire(&mut self, id: ParticipantId) {
        self.outcome.expired.push(id);
    }

    /// Arm a countdown on the participant whose callback is running
    pub fn countdown(&mut self, ticks: u32, payload: u32) {
        let target = self.this;
        self.outcome.countdowns.push(CountdownRequest { target, ticks, payload });
    }

    /// Notify the driver
    pub fn notify(&mut self, event: GameEvent) {
        self.outcome.events.push(event);
    }

    pub fn finish(self) -> Outcome {
        self.outcome
    }
}

/// A moving, collidable simulation entity
pub trait Participant: std::fmt::Debug {
    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Collision outline in local space
    fn outline(&self) -> &Outline;

    fn kind(&self) -> ParticipantKind;

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Advance one frame; the default moves by velocity with `dt = 1`
    fn step(&mut self, field_size: f32) {
        self.body_mut().advance(1.0, field_size);
    }

    /// Called once when the registry accepts the participant
    fn registered(&mut self, _fx: &mut Effects<'_>) {}

    /// Another participant overlaps this one
    fn collided_with(&mut self, _other: &ParticipantView, _fx: &mut Effects<'_>) {}

    /// A countdown targeting this participant reached zero
    fn countdown_complete(&mut self, _payload: u32, _fx: &mut Effects<'_>) {}

    /// Pilot input; ignored by anything that cannot be steered
    fn steer(&mut self, _controls: &Controls) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_capability_gating() {
        let ship = Capabilities::SHIP | Capabilities::ASTEROID_DESTROYER;
        let asteroid = Capabilities::ASTEROID | Capabilities::SHIP_DESTROYER;
        let bullet = Capabilities::ASTEROID_DESTROYER;

        assert!(Capabilities::interacts(ship, asteroid));
        assert!(Capabilities::interacts(bullet, asteroid));
        assert!(Capabilities::interacts(asteroid, bullet));
        assert!(!Capabilities::interacts(asteroid, asteroid));
        assert!(!Capabilities::interacts(ship, bullet));
        assert!(!Capabilities::interacts(bullet, bullet));
    }

    #[test]
    fn test_listener_interacts_with_asteroids_only() {
        let listener = Capabilities::ASTEROID_COLLISION_LISTENER;
        assert!(Capabilities::interacts(listener, Capabilities::ASTEROID));
        assert!(!Capabilities::interacts(listener, Capabilities::SHIP));
    }

    #[test]
    fn test_setters_reject_non_finite() {
        let mut body = Body::default();
        assert!(body.set_position(f32::NAN, 1.0).is_err());
        assert!(body.set_velocity(f32::INFINITY, 0.0).is_err());
        assert!(body.set_velocity_vector(Vec2::new(f32::NAN, 0.0)).is_err());
        assert!(body.set_rotation(f32::NEG_INFINITY).is_err());
        assert_eq!(body, Body::default());
    }

    #[test]
    fn test_polar_velocity() {
        let mut body = Body::default();
        body.set_velocity(10.0, PI / 2.0).unwrap();
        assert!(body.velocity().x.abs() < 1e-4);
        assert!((body.velocity().y - 10.0).abs() < 1e-4);
        assert!((body.speed() - 10.0).abs() < 1e-4);
        assert!((body.heading() - PI / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_mark_expired_reports_first_call_only() {
        let mut body = Body::default();
        assert!(body.mark_expired());
        assert!(!body.mark_expired());
        assert!(body.expired());
    }
}
