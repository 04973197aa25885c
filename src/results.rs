use crate::history::Guess;
use crate::scoring::Tally;
use directories::ProjectDirs;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Session length. Unlimited has no JSON number; it serializes as `null` and
/// reads back from `null` or any non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameDuration {
    Seconds(u64),
    Unlimited,
}

impl GameDuration {
    /// The presets offered by the UI, cycled in this order.
    pub const OPTIONS: [GameDuration; 3] = [
        GameDuration::Seconds(30),
        GameDuration::Seconds(120),
        GameDuration::Unlimited,
    ];

    pub fn cycle(&self) -> GameDuration {
        let pos = Self::OPTIONS.iter().position(|d| d == self).unwrap_or(0);
        Self::OPTIONS[(pos + 1) % Self::OPTIONS.len()]
    }

    pub fn secs(&self) -> Option<u64> {
        match self {
            GameDuration::Seconds(s) => Some(*s),
            GameDuration::Unlimited => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            GameDuration::Seconds(30) => "30 Seconds".to_string(),
            GameDuration::Seconds(120) => "2 Minutes".to_string(),
            GameDuration::Seconds(s) => format!("{} Seconds", s),
            GameDuration::Unlimited => "Unlimited".to_string(),
        }
    }
}

impl Serialize for GameDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GameDuration::Seconds(s) => serializer.serialize_u64(*s),
            GameDuration::Unlimited => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for GameDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(secs) if secs.is_finite() => Ok(GameDuration::Seconds(secs as u64)),
            _ => Ok(GameDuration::Unlimited),
        }
    }
}

/// One completed (or timed-out) session, exactly as persisted. Never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub score: f64,
    pub correct: u32,
    pub incorrect: u32,
    pub replays: u32,
    pub word_types: Vec<String>,
    pub speed: String,
    pub duration_seconds: GameDuration,
    /// Epoch milliseconds.
    pub date: i64,
    pub history: Vec<Guess>,
}

impl GameResult {
    pub fn counters(&self) -> Tally {
        Tally {
            correct: self.correct,
            incorrect: self.incorrect,
            replays: self.replays,
        }
    }
}

/// Backing storage for the result log. Injected into [`ResultStore`] so the
/// log is never an ambient global.
pub trait ResultLog {
    /// Missing or unparseable storage reads as an empty log.
    fn load(&self) -> Vec<GameResult>;
    fn save(&self, results: &[GameResult]) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// JSON-array file in the platform data directory.
#[derive(Debug, Clone)]
pub struct FileResultLog {
    path: PathBuf,
}

impl FileResultLog {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "spel") {
            pd.data_local_dir().join("results.json")
        } else {
            PathBuf::from("spel_results.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLog for FileResultLog {
    fn load(&self) -> Vec<GameResult> {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(results) = serde_json::from_slice::<Vec<GameResult>>(&bytes) {
                return results;
            }
        }
        Vec::new()
    }

    fn save(&self, results: &[GameResult]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(results).unwrap_or_default();
        fs::write(&self.path, data)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Append-only log of completed sessions plus the high-score lookup.
pub struct ResultStore {
    log: Box<dyn ResultLog>,
}

impl ResultStore {
    pub fn new(log: Box<dyn ResultLog>) -> Self {
        Self { log }
    }

    /// Read-modify-write of the whole log; last writer wins if storage is
    /// shared.
    pub fn append(&self, result: GameResult) -> io::Result<()> {
        let mut results = self.log.load();
        results.push(result);
        self.log.save(&results)
    }

    /// Stored results, oldest first.
    pub fn all(&self) -> Vec<GameResult> {
        self.log.load()
    }

    pub fn clear(&self) -> io::Result<()> {
        self.log.clear()
    }

    /// Highest stored score, optionally restricted to sessions of the given
    /// duration so a 30-second run is never compared against a 2-minute one.
    /// 0 when nothing matches.
    pub fn high_score(&self, duration: Option<GameDuration>) -> f64 {
        self.log
            .load()
            .iter()
            .filter(|r| duration.map_or(true, |d| r.duration_seconds == d))
            .map(|r| r.score)
            .fold(0.0, f64::max)
    }
}
