use crate::history::Guess;

pub const CORRECT_POINTS: f64 = 30.0;
pub const REPLAY_PENALTY: f64 = 0.5;
pub const WRONG_GUESS_PENALTY: f64 = 3.0;
pub const MAX_WRONG_GUESS_PENALTY: f64 = CORRECT_POINTS * 3.0 / 4.0;

/// Running correct/incorrect/replay counters, shown live during play and
/// folded into the final result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
    pub replays: u32,
}

/// Aggregate counters over a history. A record counts as solved when its
/// last guess matches the target; every earlier guess on a solved record is
/// incorrect, even a duplicate of the correct spelling. Records with no
/// guesses contribute nothing.
pub fn tally(history: &[Guess]) -> Tally {
    let mut acc = Tally::default();

    for record in history {
        match record.guesses.last() {
            Some(last) if last.eq_ignore_ascii_case(&record.word) => {
                acc.correct += 1;
                acc.incorrect += (record.guesses.len() - 1) as u32;
            }
            Some(_) => {
                acc.incorrect += record.guesses.len() as u32;
            }
            None => {}
        }
        acc.replays += record.replays;
    }

    acc
}

/// Score a completed session's history. Deterministic: the same history
/// always yields the same score.
///
/// Each record earns `rightGuesses * CORRECT_POINTS * REPLAY_PENALTY^replays`
/// minus a wrong-guess penalty capped at `MAX_WRONG_GUESS_PENALTY`. A player
/// who retypes an already-correct word banks `rightGuesses > 1`; the formula
/// deliberately does not special-case that.
///
/// The raw sum is normalized to points per unit time over the span between
/// the first and last word presentation. Histories with fewer than two
/// records have no measurable span and score 0. Negative scores are kept as
/// is; penalties may outweigh points.
pub fn score(history: &[Guess]) -> (f64, Tally) {
    let counters = tally(history);

    let raw: f64 = history.iter().map(contribution).sum();

    let span_ms = match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() > 1 => last.played_at - first.played_at,
        _ => 0,
    };

    if span_ms <= 0 {
        return (0.0, counters);
    }

    (raw / span_ms as f64 * 10000.0, counters)
}

fn contribution(record: &Guess) -> f64 {
    let right_guesses = record
        .guesses
        .iter()
        .filter(|g| g.eq_ignore_ascii_case(&record.word))
        .count() as f64;
    let wrong_guesses = record.guesses.len() as f64 - right_guesses;

    let replay_factor = REPLAY_PENALTY.powi(record.replays as i32);
    let wrong_penalty = (-wrong_guesses * WRONG_GUESS_PENALTY).max(-MAX_WRONG_GUESS_PENALTY);

    right_guesses * CORRECT_POINTS * replay_factor + wrong_penalty
}
