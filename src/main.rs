//! Asteroid Field headless runner
//!
//! Usage: `asteroid-field [settings.json] [frames]`
//!
//! Runs the splash screen briefly, starts a game, flies a scripted pilot for
//! the requested number of frames and prints the final field as JSON.
//! Set `RUST_LOG=debug` to watch commits, purges and transitions.

use std::process::ExitCode;

use asteroid_field::{Controls, Game, Phase, Settings};

const DEFAULT_FRAMES: u32 = 300;
const SPLASH_FRAMES: u32 = 30;

/// Scripted pilot: turn a little, thrust in bursts, fire constantly
fn pilot(frame: u32) -> Controls {
    Controls {
        turn_left: frame % 40 < 6,
        turn_right: false,
        thrust: frame % 60 < 10,
        fire: frame % 3 == 0,
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match args.first() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let frames = match args.get(1) {
        Some(n) => n.parse::<u32>()?,
        None => DEFAULT_FRAMES,
    };

    let mut game = Game::new(settings)?;
    log::info!("Asteroid Field starting, legend {:?}", game.legend());

    let idle = Controls::default();
    for _ in 0..SPLASH_FRAMES {
        game.tick(&idle)?;
    }

    game.start()?;
    for frame in 0..frames {
        let report = game.tick(&pilot(frame))?;
        if report.collisions > 0 {
            log::debug!("Frame {}: {} collision(s)", report.frame, report.collisions);
        }
        if game.phase() == Phase::GameOver {
            log::info!("Game over after {} frame(s)", frame + 1);
            break;
        }
    }

    log::info!(
        "Finished: phase {:?}, level {}, lives {}, asteroids {}",
        game.phase(),
        game.level(),
        game.lives(),
        game.state().count_asteroids()
    );
    println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("asteroid-field: {}", e);
            ExitCode::FAILURE
        }
    }
}
