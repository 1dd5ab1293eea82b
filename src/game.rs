//! Headless game driver
//!
//! Owns the registry and the rules that sit above it: lives, the bullet cap,
//! the splash and game-over screens, and the delayed transition after the
//! ship is lost or the field is cleared. Time is counted in frames; one call
//! to [`Game::tick`] is one frame.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::participants::{Asteroid, Bullet, ParticipantError, Ship, nose_of};
use crate::settings::{ConfigError, Settings};
use crate::sim::{
    FrameReport, GameEvent, Participant, ParticipantId, ParticipantState, ParticipantView,
};

pub use crate::sim::Controls;

/// Legend shown on the splash screen
pub const SPLASH_LEGEND: &str = "Asteroids";
/// Legend shown right after the ship is destroyed
pub const SHIP_LOST_LEGEND: &str = "Ouch!";
/// Legend shown once no lives remain
pub const GAME_OVER_LEGEND: &str = "Game Over";

/// Size index of the asteroids placed at the corners
const SEED_ASTEROID_SIZE: u8 = 2;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Attract screen, asteroids drifting, no ship
    Splash,
    /// Active gameplay
    Playing,
    /// Run ended
    GameOver,
}

/// Driver errors
#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Participant(#[from] ParticipantError),
}

pub struct Game {
    settings: Settings,
    state: ParticipantState,
    phase: Phase,
    ship: Option<ParticipantId>,
    lives: u8,
    level: u32,
    legend: &'static str,
    /// Registry frame at which the pending transition is due
    transition_at: Option<u64>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("lives", &self.lives)
            .field("level", &self.level)
            .field("legend", &self.legend)
            .field("transition_at", &self.transition_at)
            .field("state", &self.state)
            .finish()
    }
}

impl Game {
    /// Validate `settings` and bring up the splash screen
    pub fn new(settings: Settings) -> Result<Self, GameError> {
        settings.validate()?;
        let state = ParticipantState::new(settings.field_size, settings.seed);
        let mut game = Self {
            lives: settings.lives,
            settings,
            state,
            phase: Phase::Splash,
            ship: None,
            level: 0,
            legend: "",
            transition_at: None,
        };
        game.splash_screen()?;
        Ok(game)
    }

    fn splash_screen(&mut self) -> Result<(), GameError> {
        self.clear();
        self.legend = SPLASH_LEGEND;
        self.phase = Phase::Splash;
        self.place_asteroids()
    }

    /// Begin a new game
    pub fn start(&mut self) -> Result<(), GameError> {
        self.clear();
        self.place_asteroids()?;
        self.place_ship()?;
        self.lives = self.settings.lives;
        self.level = 1;
        self.phase = Phase::Playing;
        log::info!("Game started with {} live(s)", self.lives);
        Ok(())
    }

    fn clear(&mut self) {
        self.state.clear();
        self.legend = "";
        self.ship = None;
        self.transition_at = None;
    }

    /// Replace any ship with a fresh one at the center, facing up
    fn place_ship(&mut self) -> Result<(), GameError> {
        self.state.expire(self.ship.take());
        let center = Vec2::splat(self.settings.field_size / 2.0);
        let ship = Ship::new(center, -PI / 2.0, self.settings.ship_tuning())?;
        self.ship = Some(self.state.add_participant(Box::new(ship)));
        self.legend = "";
        Ok(())
    }

    /// One large asteroid near each corner, random variety and heading
    fn place_asteroids(&mut self) -> Result<(), GameError> {
        let near = self.settings.edge_offset;
        let far = self.settings.field_size - near;
        // Seeded asteroids start at medium speed
        let speed = self.settings.asteroid_speed[1];
        for (x, y) in [(near, near), (far, near), (far, far), (near, far)] {
            let position = Vec2::new(x, y);
            let asteroid = Asteroid::random(self.state.rng(), SEED_ASTEROID_SIZE, position, speed)?
                .with_speeds(self.settings.asteroid_speed);
            self.state.add_participant(Box::new(asteroid));
        }
        Ok(())
    }

    fn schedule_transition(&mut self) {
        self.transition_at = Some(self.state.frame() + u64::from(self.settings.end_delay));
    }

    fn perform_transition(&mut self) -> Result<(), GameError> {
        match self.transition_at {
            Some(at) if self.state.frame() >= at => {}
            _ => return Ok(()),
        }
        self.transition_at = None;

        if self.lives == 0 {
            log::info!("Game over at level {}", self.level);
            self.phase = Phase::GameOver;
            self.legend = GAME_OVER_LEGEND;
            return Ok(());
        }
        if self.ship.is_none() {
            self.place_ship()?;
        }
        if self.state.count_asteroids() == 0 {
            self.level += 1;
            log::info!("Level {}", self.level);
            self.place_asteroids()?;
        }
        Ok(())
    }

    /// Run one frame
    ///
    /// Controls are ignored outside [`Phase::Playing`]; the field keeps
    /// moving on every screen.
    pub fn tick(&mut self, controls: &Controls) -> Result<FrameReport, GameError> {
        self.perform_transition()?;

        if self.phase == Phase::Playing {
            self.apply_controls(controls)?;
        }

        let report = self.state.advance();

        for event in self.state.drain_events() {
            match event {
                GameEvent::ShipDestroyed { position } => {
                    log::debug!("Ship destroyed at {:?}", position);
                    self.ship = None;
                    self.legend = SHIP_LOST_LEGEND;
                    self.lives = self.lives.saturating_sub(1);
                    self.schedule_transition();
                }
                GameEvent::AsteroidDestroyed { size, .. } => {
                    log::trace!("Asteroid of size {} destroyed", size);
                    if self.state.count_asteroids() == 0 {
                        self.schedule_transition();
                    }
                }
            }
        }
        Ok(report)
    }

    fn apply_controls(&mut self, controls: &Controls) -> Result<(), GameError> {
        let Some(id) = self.ship else {
            return Ok(());
        };
        let Some(ship) = self.state.get_mut(id) else {
            return Ok(());
        };
        ship.steer(controls);

        if controls.fire && self.state.count_bullets() < self.settings.bullet_limit {
            let Some(ship) = self.state.get(id) else {
                return Ok(());
            };
            let body = ship.body();
            let bullet = Bullet::new(
                nose_of(body),
                body.rotation(),
                self.settings.bullet_speed,
                self.settings.bullet_lifespan,
            )?;
            self.state.add_participant(Box::new(bullet));
        }
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Current level; 0 before the first game
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn legend(&self) -> &str {
        self.legend
    }

    /// The ship, if one is on the field
    pub fn ship(&self) -> Option<&dyn Participant> {
        self.ship.and_then(|id| self.state.get(id))
    }

    pub fn participants(&self) -> impl Iterator<Item = &dyn Participant> + '_ {
        self.state.participants()
    }

    pub fn snapshot(&self) -> Vec<ParticipantView> {
        self.state.snapshot()
    }

    pub fn state(&self) -> &ParticipantState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ParticipantKind;

    fn quick_settings() -> Settings {
        Settings {
            seed: 12345,
            end_delay: 5,
            ..Default::default()
        }
    }

    fn idle() -> Controls {
        Controls::default()
    }

    /// Expire every asteroid currently on the field
    fn remove_asteroids(game: &mut Game) {
        let ids: Vec<ParticipantId> = game
            .snapshot()
            .into_iter()
            .filter(|v| v.kind == ParticipantKind::Asteroid)
            .map(|v| v.id)
            .collect();
        for id in ids {
            game.state.expire(Some(id));
        }
    }

    #[test]
    fn test_splash_screen() {
        let game = Game::new(quick_settings()).unwrap();
        assert_eq!(game.phase(), Phase::Splash);
        assert_eq!(game.legend(), SPLASH_LEGEND);
        assert_eq!(game.state().count_asteroids(), 4);
        assert!(game.ship().is_none());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            field_size: -5.0,
            ..Default::default()
        };
        assert!(matches!(Game::new(settings), Err(GameError::Config(_))));
    }

    #[test]
    fn test_splash_ignores_controls() {
        let mut game = Game::new(quick_settings()).unwrap();
        let fire = Controls {
            fire: true,
            ..Default::default()
        };
        for _ in 0..5 {
            game.tick(&fire).unwrap();
        }
        assert_eq!(game.state().count_bullets(), 0);
        assert_eq!(game.phase(), Phase::Splash);
    }

    #[test]
    fn test_start_places_ship_and_asteroids() {
        let mut game = Game::new(quick_settings()).unwrap();
        game.start().unwrap();
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.lives(), 1);
        assert_eq!(game.level(), 1);
        assert_eq!(game.legend(), "");
        assert_eq!(game.state().count_asteroids(), 4);

        let ship = game.ship().unwrap();
        assert_eq!(ship.body().position(), Vec2::new(375.0, 375.0));
        assert!((ship.body().rotation() + PI / 2.0).abs() < 1e-5);

        game.tick(&idle()).unwrap();
        assert_eq!(game.participants().count(), 5);
    }

    #[test]
    fn test_bullet_limit() {
        let mut game = Game::new(quick_settings()).unwrap();
        game.start().unwrap();
        let fire = Controls {
            fire: true,
            ..Default::default()
        };
        for _ in 0..20 {
            game.tick(&fire).unwrap();
            assert!(game.state().count_bullets() <= game.settings().bullet_limit);
        }
        assert_eq!(game.state().count_bullets(), game.settings().bullet_limit);
    }

    #[test]
    fn test_ship_loss_leads_to_game_over() {
        let mut game = Game::new(quick_settings()).unwrap();
        game.start().unwrap();
        let center = Vec2::splat(game.settings().field_size / 2.0);
        let rock = Asteroid::new(0, 0, center, 0.0, 0.0).unwrap();
        game.state.add_participant(Box::new(rock));

        game.tick(&idle()).unwrap();
        assert!(game.ship().is_none());
        assert_eq!(game.legend(), SHIP_LOST_LEGEND);
        assert_eq!(game.lives(), 0);
        assert_eq!(game.phase(), Phase::Playing);

        for _ in 0..=game.settings().end_delay {
            game.tick(&idle()).unwrap();
        }
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.legend(), GAME_OVER_LEGEND);
    }

    #[test]
    fn test_ship_respawns_while_lives_remain() {
        let mut game = Game::new(Settings {
            lives: 2,
            ..quick_settings()
        })
        .unwrap();
        game.start().unwrap();
        let center = Vec2::splat(game.settings().field_size / 2.0);
        let rock = Asteroid::new(0, 0, center, 0.0, 0.0).unwrap();
        game.state.add_participant(Box::new(rock));

        game.tick(&idle()).unwrap();
        assert_eq!(game.lives(), 1);
        assert!(game.ship().is_none());

        for _ in 0..=game.settings().end_delay {
            game.tick(&idle()).unwrap();
        }
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.ship().is_some());
        assert_eq!(game.legend(), "");
    }

    #[test]
    fn test_clearing_the_field_starts_next_level() {
        let mut game = Game::new(quick_settings()).unwrap();
        game.start().unwrap();
        game.tick(&idle()).unwrap();
        remove_asteroids(&mut game);

        // Last asteroid on the field, shot where it sits
        let spot = Vec2::new(100.0, 600.0);
        game.state.add_participant(Box::new(Asteroid::new(0, 0, spot, 0.0, 0.0).unwrap()));
        game.state.add_participant(Box::new(Bullet::new(spot, 0.0, 0.0, 30).unwrap()));

        game.tick(&idle()).unwrap();
        assert_eq!(game.state().count_asteroids(), 0);

        for _ in 0..=game.settings().end_delay {
            game.tick(&idle()).unwrap();
        }
        assert_eq!(game.level(), 2);
        assert_eq!(game.state().count_asteroids(), 4);
        assert!(game.ship().is_some());
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            Controls {
                thrust: true,
                ..Default::default()
            },
            Controls {
                turn_left: true,
                fire: true,
                ..Default::default()
            },
            Controls {
                turn_right: true,
                thrust: true,
                fire: true,
                ..Default::default()
            },
        ];

        let run = || {
            let mut game = Game::new(quick_settings()).unwrap();
            game.start().unwrap();
            for i in 0..90 {
                game.tick(&inputs[i % inputs.len()]).unwrap();
            }
            serde_json::to_string(&game.snapshot()).unwrap()
        };
        assert_eq!(run(), run());
    }
}
