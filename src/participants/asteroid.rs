//! Asteroids
//!
//! Four lumpy outline varieties in three sizes. A destroyed asteroid larger
//! than the smallest size breaks into two of the next size down, heading off
//! in random directions.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::ParticipantError;
use crate::consts::*;
use crate::sim::{
    Body, Capabilities, Effects, GameEvent, Outline, Participant, ParticipantKind,
    ParticipantView,
};

/// Number of outline varieties
pub const VARIETIES: u8 = 4;

/// Largest size index
pub const MAX_SIZE: u8 = 2;

/// Vertex radii of each variety at scale 1, evenly spaced in angle
const OUTLINE_RADII: [[f32; 10]; VARIETIES as usize] = [
    [30.0, 26.0, 32.0, 24.0, 28.0, 31.0, 22.0, 29.0, 33.0, 25.0],
    [28.0, 33.0, 29.0, 21.0, 30.0, 27.0, 32.0, 26.0, 23.0, 31.0],
    [32.0, 24.0, 27.0, 30.0, 25.0, 33.0, 28.0, 22.0, 30.0, 27.0],
    [26.0, 31.0, 23.0, 29.0, 33.0, 24.0, 30.0, 28.0, 31.0, 22.0],
];

#[derive(Debug)]
pub struct Asteroid {
    body: Body,
    outline: Outline,
    variety: u8,
    size: u8,
    /// Speed per size, used for the fragments
    speeds: [f32; 3],
}

impl Asteroid {
    /// Asteroid at `position` moving at `speed` along `heading`
    pub fn new(
        variety: u8,
        size: u8,
        position: Vec2,
        speed: f32,
        heading: f32,
    ) -> Result<Self, ParticipantError> {
        if variety >= VARIETIES {
            return Err(ParticipantError::AsteroidVariety(variety));
        }
        if size > MAX_SIZE {
            return Err(ParticipantError::AsteroidSize(size));
        }

        let outline = Outline::radial(
            &OUTLINE_RADII[variety as usize],
            ASTEROID_SCALE[size as usize],
        )?;
        let mut body = Body::new(position, 0.0)?;
        body.set_velocity(speed, heading)?;

        Ok(Self {
            body,
            outline,
            variety,
            size,
            speeds: ASTEROID_SPEED,
        })
    }

    /// Asteroid with a random variety and heading
    pub fn random(
        rng: &mut impl Rng,
        size: u8,
        position: Vec2,
        speed: f32,
    ) -> Result<Self, ParticipantError> {
        let variety = rng.random_range(0..VARIETIES);
        let heading = rng.random_range(0.0..TAU);
        Self::new(variety, size, position, speed, heading)
    }

    /// Override the per-size fragment speeds
    pub fn with_speeds(mut self, speeds: [f32; 3]) -> Self {
        self.speeds = speeds;
        self
    }

    pub fn variety(&self) -> u8 {
        self.variety
    }

    /// 0 = small, 1 = medium, 2 = large
    pub fn size(&self) -> u8 {
        self.size
    }
}

impl Participant for Asteroid {
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
        ParticipantKind::Asteroid
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ASTEROID | Capabilities::SHIP_DESTROYER
    }

    fn collided_with(&mut self, other: &ParticipantView, fx: &mut Effects<'_>) {
        if !other.capabilities.contains(Capabilities::ASTEROID_DESTROYER) {
            return;
        }

        let position = self.body.position();
        fx.expire_self();
        fx.notify(GameEvent::AsteroidDestroyed {
            size: self.size,
            position,
        });

        if self.size == 0 {
            return;
        }
        let size = self.size - 1;
        let speed = self.speeds[size as usize];
        for _ in 0..2 {
            match Asteroid::random(fx.rng(), size, position, speed) {
                Ok(fragment) => fx.spawn(Box::new(fragment.with_speeds(self.speeds))),
                Err(e) => log::warn!("Skipping asteroid fragment: {}", e),
            }
        }
    }
}
