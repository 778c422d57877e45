//! Neo Pong entry point
//!
//! Native builds run a headless match (an autopilot player against the AI),
//! record the result and print the leaderboard. The browser build only sets up
//! logging and storage; the page drives the library directly.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::env;
    use std::path::PathBuf;
    use std::sync::Arc;

    use neo_pong::consts::{AI_SPEED_FIRST_TO, SIM_DT};
    use neo_pong::feedback::{LogFeedback, dispatch};
    use neo_pong::highscores::{HISTORY_LIMIT, ScoreStore};
    use neo_pong::persistence::{FileStorage, PersistenceError, PersistenceWorker};
    use neo_pong::sim::{AiController, ControlEvent, GameEvent, Side, TickInput};
    use neo_pong::{ArenaState, GameResult, Mode, SettingsStore, SimulationClock};

    /// Give up on matches that refuse to end (simulated seconds)
    const MAX_MATCH_SECONDS: u32 = 15 * 60;
    /// Autopilot is a little slower than the AI so rallies end
    const AUTOPILOT_SPEED: f32 = AI_SPEED_FIRST_TO * 0.8;
    const DEFAULT_DATA_DIR: &str = "neo-pong-data";

    struct Options {
        mode: Mode,
        name: String,
        seed: u64,
        data_dir: PathBuf,
    }

    fn parse_options() -> Result<Options, String> {
        let mut args = env::args().skip(1);
        let mode = match args.next() {
            Some(arg) => arg.parse::<Mode>().map_err(|err| err.to_string())?,
            None => Mode::default(),
        };
        let name = args.next().unwrap_or_default();
        let seed = match args.next() {
            Some(arg) => arg
                .parse::<u64>()
                .map_err(|err| format!("invalid seed {:?}: {}", arg, err))?,
            None => chrono::Utc::now().timestamp_millis() as u64,
        };
        let data_dir = env::var_os("NEO_PONG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Ok(Options {
            mode,
            name,
            seed,
            data_dir,
        })
    }

    /// Play one match to completion, or `None` if it was abandoned
    fn play(
        mode: Mode,
        seed: u64,
        settings: &SettingsStore<Arc<PersistenceWorker<FileStorage>>>,
    ) -> Option<GameResult> {
        let mut arena = ArenaState::new(mode, seed);
        let mut clock = SimulationClock::new();
        let mut feedback = LogFeedback::default();
        let autopilot = AiController::new(AUTOPILOT_SPEED);

        if let Err(err) = arena.apply_control(ControlEvent::Serve) {
            log::error!("could not start match: {}", err);
            return None;
        }

        let max_frames = MAX_MATCH_SECONDS as f32 / SIM_DT;
        let mut frames = 0.0;
        loop {
            let paddle = arena.paddle(Side::Player);
            let delta = autopilot.desired_delta(arena.ball(), paddle, 1.0);
            let input = TickInput::pointer(paddle.center_x() + delta);

            let result = clock.frame(&mut arena, SIM_DT, &input, &settings.read_cached());
            let events = arena.take_events();
            dispatch(&events, &mut feedback);
            for event in &events {
                if let GameEvent::Scored(side) = event {
                    let state = arena.match_state();
                    println!(
                        "{:>6} scores  {} - {}",
                        match side {
                            Side::Player => "PLAYER",
                            Side::Ai => "AI",
                        },
                        state.player_score,
                        state.ai_score
                    );
                }
            }

            if result.is_some() {
                log::debug!(
                    "{} haptic and {} sound cues",
                    feedback.haptics,
                    feedback.sounds
                );
                return result;
            }

            frames += 1.0;
            if frames >= max_frames {
                log::warn!("match did not finish in {}s, quitting", MAX_MATCH_SECONDS);
                let _ = arena.apply_control(ControlEvent::Quit);
                return None;
            }
        }
    }

    pub fn run() -> Result<(), PersistenceError> {
        let options = match parse_options() {
            Ok(options) => options,
            Err(err) => {
                eprintln!("{}", err);
                eprintln!("usage: neo-pong [first-to-5|time-attack] [name] [seed]");
                std::process::exit(2);
            }
        };

        log::info!(
            "Neo Pong (native) starting: {} seed={}",
            options.mode.label(),
            options.seed
        );

        let worker = Arc::new(PersistenceWorker::new(FileStorage::new(&options.data_dir)?)?);
        let mut settings = SettingsStore::new(Arc::clone(&worker));
        settings.load();
        let mut scores = ScoreStore::open(Arc::clone(&worker));

        let Some(result) = play(options.mode, options.seed, &settings) else {
            println!("Match abandoned");
            return Ok(());
        };

        let headline = match result.winner() {
            Some(Side::Player) => "PLAYER WINS",
            Some(Side::Ai) => "AI WINS",
            None => "DRAW",
        };
        println!(
            "{}  {} - {}  ({})",
            headline,
            result.player_score,
            result.ai_score,
            result.mode.label()
        );

        if let Err(err) = scores.save(&options.name, result.player_score) {
            eprintln!("Could not save score: {}", err);
        }
        worker.flush()?;
        for failure in worker.take_failures() {
            eprintln!("Could not save {}: {}", failure.key, failure.message);
        }

        println!("\nHIGH SCORES");
        for (rank, entry) in scores.top_scores(HISTORY_LIMIT).iter().enumerate() {
            println!(
                "{:>2}. {:<15} {:>3}  {}",
                rank + 1,
                entry.name,
                entry.score,
                entry.date
            );
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    use neo_pong::SettingsStore;
    use neo_pong::persistence::LocalStorage;

    neo_pong::platform::init_logging();
    log::info!("Neo Pong (web) starting...");

    match LocalStorage::new() {
        Ok(storage) => {
            let mut settings = SettingsStore::new(storage);
            let loaded = settings.load();
            log::info!(
                "vibration={} sound={}",
                loaded.vibration,
                loaded.sound
            );
        }
        Err(err) => log::warn!("LocalStorage unavailable: {}", err),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    neo_pong::platform::init_logging();
    if let Err(err) = headless::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
