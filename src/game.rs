//! Game session: lifecycle, input slot and run-end bookkeeping
//!
//! Wraps the pure simulation with what the surrounding UI needs: a start
//! command, a single-slot impulse set by input handlers, events per frame and
//! the best-ever records written when a run ends.

use crate::highscores::{HighScores, RunOutcome};
use crate::persistence::Storage;
use crate::settings::Settings;
use crate::sim::{FrameView, GameEvent, GamePhase, GameState, TickInput, TokenCounts, step};

/// One player's game: current run plus persisted records
#[derive(Debug)]
pub struct Game<S: Storage> {
    state: GameState,
    records: HighScores,
    settings: Settings,
    storage: S,
    /// Set by input handlers, consumed by the next frame
    pending_impulse: bool,
    /// Let the autopilot fly (attract mode / headless runs)
    pub idle_mode: bool,
    last_outcome: Option<RunOutcome>,
}

impl<S: Storage> Game<S> {
    /// Load records and settings from `storage` and sit on the title screen
    pub fn new(storage: S, seed: u64) -> Self {
        let records = HighScores::load(&storage);
        let settings = Settings::load(&storage);
        Self {
            state: GameState::new(seed),
            records,
            settings,
            storage,
            pending_impulse: false,
            idle_mode: false,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for debugging tools and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score()
    }

    pub fn best_score(&self) -> u32 {
        self.records.best_score
    }

    pub fn run_tokens(&self) -> &TokenCounts {
        &self.state.tokens
    }

    pub fn best_tokens(&self) -> &TokenCounts {
        &self.records.best_tokens
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// What the last finished run improved, if a run has finished
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(&mut self.storage);
        self.settings = settings;
    }

    /// Start or restart a run. Ignored while a run is in progress.
    pub fn start(&mut self, seed: u64) -> bool {
        match self.state.phase {
            GamePhase::Start | GamePhase::GameOver => {
                self.state = GameState::new_run(seed);
                self.pending_impulse = false;
                self.last_outcome = None;
                log::info!("Run started with seed: {}", seed);
                true
            }
            GamePhase::Playing => false,
        }
    }

    /// Request an impulse for the next frame. Repeated calls collapse into one.
    pub fn impulse(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.pending_impulse = true;
        }
    }

    /// Run one frame at timestamp `now` (ms)
    ///
    /// The step works on a copy of the state that is committed only once it
    /// completes. Records are written when the frame ends the run.
    pub fn frame(&mut self, now: f64) -> Vec<GameEvent> {
        if self.state.phase != GamePhase::Playing {
            return Vec::new();
        }

        let input = TickInput {
            impulse: std::mem::take(&mut self.pending_impulse),
            idle_mode: self.idle_mode,
        };
        let (next, events) = step(&self.state, &input, now);
        self.state = next;

        for event in &events {
            if let GameEvent::RunEnded { score, .. } = *event {
                let outcome = self
                    .records
                    .commit_run(&mut self.storage, score, &self.state.tokens);
                self.last_outcome = Some(outcome);
            }
        }
        events
    }

    /// Render snapshot of the current state
    pub fn view(&self) -> FrameView {
        FrameView::build(&self.state, &self.settings)
    }
}
