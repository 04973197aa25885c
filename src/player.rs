use crate::catalog::Word;
use std::process::{Command, Stdio};

/// Seam to whatever actually makes sound. The engine never touches audio; it
/// only hears back the clip duration when the player happens to know it.
pub trait AudioPlayer {
    /// Start playback of `word` at the given rate. Returns the clip length
    /// in seconds when known, so the caller can feed the audio-loaded event.
    fn play(&mut self, word: &Word, rate: f64) -> Option<f64>;
}

/// Spawns a user-supplied shell command with `{path}` and `{rate}`
/// placeholders, detached and best-effort: a missing player or failed spawn
/// never disturbs the session.
pub struct CommandPlayer {
    template: String,
}

impl CommandPlayer {
    pub fn new(template: String) -> Self {
        Self { template }
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&mut self, word: &Word, rate: f64) -> Option<f64> {
        let command = self
            .template
            .replace("{path}", &word.path)
            .replace("{rate}", &format!("{}", rate));

        let _ = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        None
    }
}

/// No-op player for headless runs and tests.
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&mut self, _word: &Word, _rate: f64) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(name: &str) -> Word {
        Word {
            path: format!("words/names/{}.mp3", name),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_silent_player_reports_no_duration() {
        let mut player = SilentPlayer;
        assert_eq!(player.play(&word("maria"), 1.0), None);
    }

    #[test]
    fn test_command_player_substitutes_placeholders() {
        let mut player = CommandPlayer::new("true {path} {rate}".to_string());
        // Spawn succeeds or fails silently either way; the call must not panic.
        assert_eq!(player.play(&word("maria"), 1.5), None);
    }

    #[test]
    fn test_command_player_survives_bad_command() {
        let mut player = CommandPlayer::new(String::new());
        assert_eq!(player.play(&word("maria"), 0.5), None);
    }
}
