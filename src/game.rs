//! Round orchestration
//!
//! `BlastGame` wires a layout provider, sprite catalog, and display/status
//! sinks to the simulation, and runs the 50 ms frame scheduler on its own
//! thread. Button presses arrive on a concurrent FIFO from any thread; the
//! simulation thread is the sole consumer and drains it at the start of each
//! tick it processes.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, unbounded};
use thiserror::Error;

use crate::catalog::SpriteCatalog;
use crate::consts::TICK_PERIOD_MS;
use crate::layout::{ButtonId, LayoutProvider};
use crate::matrix::PixelMatrix;
use crate::sim::{self, EngineConfig, RoundState};

/// Display output: receives one image per affected button per render step.
pub trait FrameSink: Send + Sync {
    fn send_frame(&self, button: &ButtonId, image: &PixelMatrix);
    /// Darken every button (round teardown).
    fn clear_all(&self);
}

/// Observer for human-readable status messages.
pub trait StatusSink: Send + Sync {
    fn send_status(&self, message: &str, fatal: bool);
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no button layout is available")]
    MissingLayout,
    #[error("the sprite catalog is empty")]
    EmptyCatalog,
}

/// Minimal capability contract shared by button games. The advance hook is
/// normally driven by the internal ticker; hosts with their own cadence may
/// call it directly instead of `start`ing the scheduler.
pub trait ButtonGame {
    fn start(&mut self) -> bool;
    fn force_end_game(&mut self);
    fn is_game_running(&self) -> bool;
    fn advance_frame(&mut self);
}

/// Per-round driver owned by the tick handler: round state plus the intake
/// and output endpoints one tick touches.
struct RoundRunner {
    state: RoundState,
    catalog: Arc<SpriteCatalog>,
    presses: Receiver<ButtonId>,
    frame_sink: Arc<dyn FrameSink>,
}

impl RoundRunner {
    /// One tick end-to-end. Returns false once the round is over.
    fn advance_frame(&mut self) -> bool {
        let pressed: Vec<ButtonId> = self.presses.try_iter().collect();
        let out = sim::advance_frame(&mut self.state, &self.catalog, &pressed);
        for (button, image) in &out.frames {
            self.frame_sink.send_frame(button, image);
        }
        !out.round_over
    }
}

/// The matching-and-elimination game.
pub struct BlastGame {
    layout: Arc<dyn LayoutProvider>,
    catalog: Arc<SpriteCatalog>,
    frame_sink: Arc<dyn FrameSink>,
    status_sink: Arc<dyn StatusSink>,
    config: EngineConfig,
    seed: u64,
    rounds_started: u64,
    running: Arc<AtomicBool>,
    runner: Arc<Mutex<Option<RoundRunner>>>,
    press_tx: Sender<ButtonId>,
    press_rx: Receiver<ButtonId>,
    shutdown_tx: Option<Sender<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl BlastGame {
    pub fn new(
        layout: Arc<dyn LayoutProvider>,
        catalog: SpriteCatalog,
        frame_sink: Arc<dyn FrameSink>,
        status_sink: Arc<dyn StatusSink>,
        config: EngineConfig,
        seed: u64,
    ) -> Self {
        let (press_tx, press_rx) = unbounded();
        Self {
            layout,
            catalog: Arc::new(catalog),
            frame_sink,
            status_sink,
            config,
            seed,
            rounds_started: 0,
            running: Arc::new(AtomicBool::new(false)),
            runner: Arc::new(Mutex::new(None)),
            press_tx,
            press_rx,
            shutdown_tx: None,
            ticker: None,
        }
    }

    /// Handle for feeding press events from input threads.
    pub fn press_sender(&self) -> Sender<ButtonId> {
        self.press_tx.clone()
    }

    pub fn button_pressed(&self, button: ButtonId) {
        // Unbounded channel; send only fails if the game was dropped.
        let _ = self.press_tx.send(button);
    }

    pub fn correct_presses(&self) -> u32 {
        lock_runner(&self.runner)
            .as_ref()
            .map_or(0, |r| r.state.correct_presses())
    }

    /// Begin a round, reporting why it could not start.
    pub fn try_start(&mut self) -> Result<(), GameError> {
        self.cancel_ticker();

        let layout = match self.layout.current_layout() {
            Some(layout) if !layout.is_empty() => layout,
            _ => {
                self.status_sink
                    .send_status("Button Blast requires a button layout", true);
                self.end_round_now();
                return Err(GameError::MissingLayout);
            }
        };
        if self.catalog.is_empty() {
            self.status_sink
                .send_status("Button Blast requires a loaded sprite catalog", true);
            self.end_round_now();
            return Err(GameError::EmptyCatalog);
        }

        let seed = self.seed.wrapping_add(self.rounds_started);
        self.rounds_started += 1;
        log::info!(
            "starting round {} ({} buttons, {} sprites, seed {seed})",
            self.rounds_started,
            layout.len(),
            self.catalog.len()
        );

        let state = RoundState::new(&layout, self.catalog.len(), self.config.clone(), seed);
        let mut runner = RoundRunner {
            state,
            catalog: Arc::clone(&self.catalog),
            presses: self.press_rx.clone(),
            frame_sink: Arc::clone(&self.frame_sink),
        };
        self.running.store(true, Ordering::SeqCst);
        // First frame goes out before the ticker starts.
        let _ = runner.advance_frame();
        *lock_runner(&self.runner) = Some(runner);

        self.spawn_ticker();
        Ok(())
    }

    fn spawn_ticker(&mut self) {
        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let running = Arc::clone(&self.running);
        let runner = Arc::clone(&self.runner);
        let frame_sink = Arc::clone(&self.frame_sink);
        let status_sink = Arc::clone(&self.status_sink);
        let period = crossbeam_channel::tick(Duration::from_millis(TICK_PERIOD_MS));

        self.ticker = Some(std::thread::spawn(move || {
            loop {
                select! {
                    recv(shutdown_rx) -> _ => break,
                    recv(period) -> msg => {
                        if msg.is_err() || !running.load(Ordering::SeqCst) {
                            break;
                        }
                        // One bad tick must not kill the round.
                        let alive = panic::catch_unwind(AssertUnwindSafe(|| {
                            lock_runner(&runner).as_mut().map_or(true, RoundRunner::advance_frame)
                        }));
                        match alive {
                            Ok(true) => {}
                            Ok(false) => {
                                end_round(&running, &runner, frame_sink.as_ref(), status_sink.as_ref());
                                break;
                            }
                            Err(_) => log::error!("frame advance panicked; continuing on next tick"),
                        }
                    }
                }
            }
            // There is no distinct clean-stop signal; a deliberate force-end
            // lands here too and is announced by the status message instead.
            log::error!("the frame ticker has stopped");
        }));
    }

    fn cancel_ticker(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.ticker.take() {
            if handle.join().is_err() {
                log::error!("frame ticker thread panicked");
            }
        }
    }

    fn end_round_now(&mut self) {
        end_round(
            &self.running,
            &self.runner,
            self.frame_sink.as_ref(),
            self.status_sink.as_ref(),
        );
    }
}

impl ButtonGame for BlastGame {
    fn start(&mut self) -> bool {
        match self.try_start() {
            Ok(()) => true,
            Err(err) => {
                log::error!("round failed to start: {err}");
                false
            }
        }
    }

    fn force_end_game(&mut self) {
        self.cancel_ticker();
        self.end_round_now();
    }

    fn is_game_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn advance_frame(&mut self) {
        let alive = lock_runner(&self.runner)
            .as_mut()
            .map_or(true, RoundRunner::advance_frame);
        if !alive {
            self.cancel_ticker();
            self.end_round_now();
        }
    }
}

impl Drop for BlastGame {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

/// Shared round teardown: stop accepting ticks, drop the round, clear every
/// button, announce the end. All effects are idempotent.
fn end_round(
    running: &AtomicBool,
    runner: &Mutex<Option<RoundRunner>>,
    frame_sink: &dyn FrameSink,
    status_sink: &dyn StatusSink,
) {
    running.store(false, Ordering::SeqCst);
    if let Some(round) = lock_runner(runner).take() {
        log::info!(
            "round over after {} tick(s), {} correct press(es)",
            round.state.tick(),
            round.state.correct_presses()
        );
    }
    frame_sink.clear_all();
    status_sink.send_status("Game force ended", true);
}

/// A panic inside one tick poisons the mutex; the next tick recovers the
/// state and keeps going rather than wedging the round.
fn lock_runner(runner: &Mutex<Option<RoundRunner>>) -> MutexGuard<'_, Option<RoundRunner>> {
    runner.lock().unwrap_or_else(PoisonError::into_inner)
}
