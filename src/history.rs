use crate::util::now_ms;
use serde::{Deserialize, Serialize};

/// One word's attempt record within a session. Field names match the
/// persisted result format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    pub index: usize,
    pub word: String,
    pub guesses: Vec<String>,
    pub replays: u32,
    /// Epoch ms when the word was presented.
    pub played_at: i64,
    /// Audio clip length in seconds; 0 until the audio-loaded event arrives.
    pub played_for: f64,
    /// Epoch ms of the most recent submission; 0 before the first one.
    pub guessed_at: i64,
}

/// Handle to the record currently being attempted. Returned by
/// [`GuessHistory::start`]; every mutator takes it, so stale handles are
/// caught instead of silently mutating the wrong record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveGuess(usize);

/// Append/mutate-last ledger of the session's attempts. Only the most
/// recently started record may be mutated.
#[derive(Debug, Default)]
pub struct GuessHistory {
    records: Vec<Guess>,
}

impl GuessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh record for `word` and make it the active one.
    pub fn start(&mut self, word: &str) -> ActiveGuess {
        let index = self.records.len();
        self.records.push(Guess {
            index,
            word: word.to_string(),
            guesses: Vec::new(),
            replays: 0,
            played_at: now_ms(),
            played_for: 0.0,
            guessed_at: 0,
        });
        ActiveGuess(index)
    }

    /// Record a submission against the active record and report whether it
    /// matches the target spelling. Callers normalize input (lowercase,
    /// alphabetic-only) before calling; matching here ignores ASCII case.
    pub fn submit(&mut self, cursor: ActiveGuess, text: &str) -> bool {
        let record = self.active_mut(cursor);
        record.guesses.push(text.to_string());
        record.guessed_at = now_ms();
        text.eq_ignore_ascii_case(&record.word)
    }

    pub fn replay(&mut self, cursor: ActiveGuess) {
        self.active_mut(cursor).replays += 1;
    }

    pub fn mark_audio_loaded(&mut self, cursor: ActiveGuess, duration_secs: f64) {
        self.active_mut(cursor).played_for = duration_secs;
    }

    pub fn records(&self) -> &[Guess] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the ledger, leaving it empty. Called once when the session's
    /// result is assembled.
    pub fn take(&mut self) -> Vec<Guess> {
        std::mem::take(&mut self.records)
    }

    // Mutating anything but the last record is a state-machine bug, not a
    // runtime condition; fail fast.
    fn active_mut(&mut self, cursor: ActiveGuess) -> &mut Guess {
        assert!(
            cursor.0 + 1 == self.records.len(),
            "guess cursor {} is not the active record (history has {} records)",
            cursor.0,
            self.records.len()
        );
        &mut self.records[cursor.0]
    }
}
