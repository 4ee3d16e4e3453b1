//! Button Blast demo entry point
//!
//! Runs one round against a simulated 3x5 button grid with logging sinks and
//! a scripted random presser. Pass a JSON config path to override the engine
//! tuning: `button-blast [config.json]`.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;

use button_blast::{
    BlastGame, ButtonGame, ButtonId, ButtonLayout, EngineConfig, FrameSink, PixelMatrix,
    SpriteCatalog, StaticLayout, StatusSink,
};

/// Logs each rendered frame instead of lighting hardware.
struct LogFrameSink;

impl FrameSink for LogFrameSink {
    fn send_frame(&self, button: &ButtonId, image: &PixelMatrix) {
        log::debug!("frame {button}: {} lit pixel(s)", image.lit_count());
    }

    fn clear_all(&self) {
        log::info!("all buttons cleared");
    }
}

struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn send_status(&self, message: &str, fatal: bool) {
        if fatal {
            log::error!("status: {message}");
        } else {
            log::info!("status: {message}");
        }
    }
}

fn load_config(path: &str) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("failed to load config from {path}: {err}");
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let layout = ButtonLayout::grid(3, 5);
    let buttons: Vec<ButtonId> = layout.iter().map(|s| s.button_id.clone()).collect();
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut game = BlastGame::new(
        Arc::new(StaticLayout(layout)),
        SpriteCatalog::procedural(6),
        Arc::new(LogFrameSink),
        Arc::new(LogStatusSink),
        config,
        seed,
    );

    if !game.start() {
        std::process::exit(1);
    }

    // Scripted presser: random buttons at 100 ms, mimicking a frantic player.
    let presser = game.press_sender();
    std::thread::spawn(move || {
        let mut rng = rand::rng();
        for _ in 0..600 {
            std::thread::sleep(Duration::from_millis(100));
            let button = buttons[rng.random_range(0..buttons.len())].clone();
            if presser.send(button).is_err() {
                break;
            }
        }
    });

    // The round ends on its own once an unmatched stack explodes.
    let deadline = Duration::from_secs(60);
    let started = std::time::Instant::now();
    while game.is_game_running() && started.elapsed() < deadline {
        std::thread::sleep(Duration::from_millis(100));
    }
    if game.is_game_running() {
        log::info!("deadline reached, forcing the round to end");
        game.force_end_game();
    }
    log::info!("demo finished");
}
