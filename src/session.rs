use crate::catalog::{Word, WordCatalog, WordType};
use crate::history::{ActiveGuess, GuessHistory};
use crate::results::{GameDuration, GameResult, ResultStore};
use crate::scoring::{self, Tally};
use crate::sequencer::WordSequencer;
use crate::util::{normalize_guess, now_ms};
use crate::TICK_RATE_MS;
use clap::ValueEnum;

/// Audio playback rate presets; labels are what gets persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Speed {
    Slow,
    Normal,
    Fast,
}

impl Speed {
    pub fn rate(&self) -> f64 {
        match self {
            Speed::Slow => 0.5,
            Speed::Normal => 1.0,
            Speed::Fast => 1.5,
        }
    }

    pub fn cycle(&self) -> Speed {
        match self {
            Speed::Slow => Speed::Normal,
            Speed::Normal => Speed::Fast,
            Speed::Fast => Speed::Slow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Playing,
    Finished,
}

/// Player-tunable settings. Mutable between sessions; the presentation layer
/// disables the controls while a session is running.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub word_types: Vec<WordType>,
    pub speed: Speed,
    pub duration: GameDuration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            word_types: vec![WordType::Names],
            speed: Speed::Normal,
            duration: GameDuration::Seconds(30),
        }
    }
}

impl SessionConfig {
    /// Select or deselect a word type. Deselecting the last remaining type
    /// is a no-op; the selection never becomes empty.
    pub fn toggle_word_type(&mut self, word_type: WordType) {
        if let Some(pos) = self.word_types.iter().position(|t| *t == word_type) {
            if self.word_types.len() > 1 {
                self.word_types.remove(pos);
            }
        } else {
            self.word_types.push(word_type);
        }
    }
}

/// What a submission did, for the presentation layer's notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Correct { word: String },
    Incorrect,
}

/// Everything the finished screen needs: the persisted result plus how it
/// compares to earlier sessions of the same duration.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub result: GameResult,
    pub previous_high: f64,
    pub is_high_score: bool,
}

/// The session state machine: `Idle -> Playing -> Finished`, with restart
/// back to `Playing`. Owns the shuffled word order, the guess ledger, the
/// countdown, and the end-of-session bookkeeping.
pub struct Session {
    config: SessionConfig,
    catalog: WordCatalog,
    store: ResultStore,
    state: GameState,
    sequencer: Option<WordSequencer>,
    history: GuessHistory,
    active: Option<ActiveGuess>,
    seconds_remaining: Option<f64>,
    outcome: Option<SessionOutcome>,
}

impl Session {
    pub fn new(config: SessionConfig, catalog: WordCatalog, store: ResultStore) -> Self {
        Self {
            config,
            catalog,
            store,
            state: GameState::Idle,
            sequencer: None,
            history: GuessHistory::new(),
            active: None,
            seconds_remaining: None,
            outcome: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn toggle_word_type(&mut self, word_type: WordType) {
        self.config.toggle_word_type(word_type);
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.config.speed = speed;
    }

    pub fn set_duration(&mut self, duration: GameDuration) {
        self.config.duration = duration;
    }

    /// Word currently being attempted; None outside of play.
    pub fn current_word(&self) -> Option<&Word> {
        if self.state != GameState::Playing {
            return None;
        }
        self.sequencer.as_ref().and_then(|s| s.current())
    }

    /// 1-based count of words presented so far this session.
    pub fn word_number(&self) -> usize {
        self.history.len()
    }

    pub fn words_total(&self) -> usize {
        self.sequencer.as_ref().map_or(0, |s| s.len())
    }

    pub fn seconds_remaining(&self) -> Option<f64> {
        self.seconds_remaining
    }

    /// Live counters over the in-flight history.
    pub fn tally(&self) -> Tally {
        scoring::tally(self.history.records())
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn results(&self) -> &ResultStore {
        &self.store
    }

    /// Begin a session with a fresh permutation of the selected words. Legal
    /// from any state; an in-flight session is discarded. Returns false (and
    /// stays put) when the selected types have no words.
    pub fn start_playing(&mut self) -> bool {
        let words = self.catalog.words_for(&self.config.word_types);
        if words.is_empty() {
            return false;
        }

        let sequencer = WordSequencer::new(&words);
        let first = sequencer
            .current()
            .expect("non-empty word set has a first word")
            .name
            .clone();

        self.history = GuessHistory::new();
        self.active = Some(self.history.start(&first));
        self.sequencer = Some(sequencer);
        self.seconds_remaining = self.config.duration.secs().map(|s| s as f64);
        self.outcome = None;
        self.state = GameState::Playing;
        true
    }

    /// Abandon the session; nothing is scored or persisted.
    pub fn stop_playing(&mut self) {
        self.state = GameState::Idle;
        self.sequencer = None;
        self.history = GuessHistory::new();
        self.active = None;
        self.seconds_remaining = None;
        self.outcome = None;
    }

    /// Record a submission. Input is normalized (lowercased, non-alphabetic
    /// stripped) before matching; an empty normalized submission is ignored.
    /// A correct answer advances to the next word, or finishes the session
    /// when the permutation is exhausted.
    pub fn submit_word(&mut self, text: &str) -> Option<SubmitOutcome> {
        if self.state != GameState::Playing {
            return None;
        }

        let text = normalize_guess(text);
        if text.is_empty() {
            return None;
        }

        let cursor = self.active.expect("playing session has an active record");
        if !self.history.submit(cursor, &text) {
            return Some(SubmitOutcome::Incorrect);
        }

        let sequencer = self
            .sequencer
            .as_mut()
            .expect("playing session has a sequencer");

        if sequencer.is_last() {
            self.finish();
        } else {
            let next = sequencer
                .advance()
                .expect("sequencer not on last word")
                .name
                .clone();
            self.active = Some(self.history.start(&next));
        }

        Some(SubmitOutcome::Correct { word: text })
    }

    /// Note a replay of the active word's audio. No-op when nothing is
    /// active (idle, or after the session finished).
    pub fn replay_word(&mut self) {
        if let Some(cursor) = self.active {
            self.history.replay(cursor);
        }
    }

    /// Audio metadata arrived for the active word.
    pub fn audio_loaded(&mut self, duration_secs: f64) {
        if let Some(cursor) = self.active {
            self.history.mark_audio_loaded(cursor, duration_secs);
        }
    }

    /// One game-clock tick. Counts the timer down and fires the timeout
    /// transition when it expires; returns true when this tick ended the
    /// session.
    pub fn on_tick(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }

        if let Some(remaining) = self.seconds_remaining.as_mut() {
            *remaining -= TICK_RATE_MS as f64 / 1000.0;
            if *remaining <= 0.0 {
                self.timeout();
                return true;
            }
        }
        false
    }

    /// End the session now regardless of progress on the current word.
    pub fn timeout(&mut self) {
        if self.state == GameState::Playing {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let records = self.history.take();
        self.active = None;

        let (score, counters) = scoring::score(&records);

        let result = GameResult {
            score,
            correct: counters.correct,
            incorrect: counters.incorrect,
            replays: counters.replays,
            word_types: self
                .config
                .word_types
                .iter()
                .map(|t| t.slug().to_string())
                .collect(),
            speed: self.config.speed.to_string(),
            duration_seconds: self.config.duration,
            date: now_ms(),
            history: records,
        };

        let previous_high = self.store.high_score(Some(self.config.duration));
        // Persistence is best-effort; a failed write never fails the session.
        let _ = self.store.append(result.clone());

        self.outcome = Some(SessionOutcome {
            is_high_score: result.score >= previous_high,
            previous_high,
            result,
        });
        self.state = GameState::Finished;
    }
}
