//! Bullets
//!
//! Fired from the ship's nose. A bullet lives for a fixed number of frames,
//! measured by a countdown it arms on itself when registered.

use glam::Vec2;

use super::ParticipantError;
use super::ship::Ship;
use crate::sim::{
    Body, Capabilities, Effects, Outline, Participant, ParticipantKind, ParticipantView,
};

#[derive(Debug)]
pub struct Bullet {
    body: Body,
    outline: Outline,
    lifespan: u32,
}

impl Bullet {
    pub fn new(
        position: Vec2,
        heading: f32,
        speed: f32,
        lifespan: u32,
    ) -> Result<Self, ParticipantError> {
        let mut body = Body::new(position, heading)?;
        body.set_velocity(speed, heading)?;
        Ok(Self {
            body,
            outline: Outline::square(1.0)?,
            lifespan,
        })
    }

    /// Bullet leaving `ship`'s nose along its rotation
    pub fn fired_from(ship: &Ship, speed: f32, lifespan: u32) -> Result<Self, ParticipantError> {
        Self::new(ship.nose(), ship.body().rotation(), speed, lifespan)
    }

    /// Frames between registration and expiry
    pub fn lifespan(&self) -> u32 {
        self.lifespan
    }
}

impl Participant for Bullet {
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
        ParticipantKind::Bullet
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ASTEROID_DESTROYER
    }

    fn registered(&mut self, fx: &mut Effects<'_>) {
        fx.countdown(self.lifespan, 0);
    }

    fn collided_with(&mut self, other: &ParticipantView, fx: &mut Effects<'_>) {
        if other.capabilities.contains(Capabilities::SHIP_DESTROYER) {
            fx.expire_self();
        }
    }

    fn countdown_complete(&mut self, _payload: u32, fx: &mut Effects<'_>) {
        fx.expire_self();
    }
}
