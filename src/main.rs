//! Nucleus entry point
//!
//! Headless native runner: loads config and dictionary, lets the idle player
//! run one game under jittered frame times, then records the score.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use nucleus::autoplay::AutoPlayer;
use nucleus::highscores::HighScores;
use nucleus::lexicon::load_or_build;
use nucleus::sim::{GameEvent, GameState, advance};
use nucleus::Config;

/// Idle player keystroke interval (seconds)
const THINK_INTERVAL: f64 = 0.25;
const MIN_WORD_LEN: usize = 3;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Nucleus (native) starting...");

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{}", err);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let (lexicon, load_path) = match load_or_build(
        &config.dictionary_cache,
        &config.dictionary_file,
        &config.alphabet(),
    ) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("Cannot load dictionary: {}", err);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Dictionary ready ({} words, {:?})", lexicon.len(), load_path);

    let seed = std::env::var("NUCLEUS_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
    log::info!("Seed {}", seed);

    let highscore_file = config.highscore_file.clone();
    let mut state = GameState::with_arena(config, Arc::new(lexicon), seed);
    let mut player = AutoPlayer::new(seed.wrapping_add(1), MIN_WORD_LEN, THINK_INTERVAL);
    let mut frame_rng = Pcg32::seed_from_u64(seed.wrapping_add(2));

    while !state.is_game_over() {
        let dt = frame_rng.random_range(0.008..0.034);
        player.update(&mut state, dt);
        advance(&mut state, dt);

        for event in state.drain_events() {
            match event {
                GameEvent::WordAccepted { word, score } => {
                    log::info!("{} +{} ({} left)", word, score, state.progression.format_time());
                }
                GameEvent::LevelAdvanced { level } => log::info!("Level {}", level),
                other => log::trace!("{:?}", other),
            }
        }
    }

    log::info!(
        "Final score {} at level {} ({} words, {:.1}s world time)",
        state.score,
        state.level(),
        state.words_accepted,
        state.clock.world_time()
    );

    let mut scores = HighScores::load(&highscore_file);
    if let Some(rank) = scores.add_score(state.score, "Autoplay", state.level()) {
        log::info!("New high score, rank {}", rank);
        if let Err(err) = scores.save(&highscore_file) {
            log::warn!("Failed to save high scores: {}", err);
        }
    }
    for (i, entry) in scores.entries.iter().enumerate() {
        log::info!("{}. {:>6}  {} (level {})", i + 1, entry.score, entry.name, entry.level);
    }

    ExitCode::SUCCESS
}
