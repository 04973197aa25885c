use crate::player::AudioPlayer;
use crate::session::{GameState, Session, SubmitOutcome};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Transient feedback after a player action, faded out by ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Correct(String),
    Incorrect,
    Replay,
}

const NOTICE_TICKS_SHORT: u8 = 8; // 800ms at the 100ms tick rate
const NOTICE_TICKS_LONG: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Game,
    History,
}

/// Keyboard-facing shell around the session: owns the input buffer, the
/// notice popup, screen switching, and the audio player hookup.
pub struct App {
    pub session: Session,
    player: Box<dyn AudioPlayer>,
    pub input: String,
    pub screen: Screen,
    pub should_quit: bool,
    notice: Option<Notice>,
    notice_ticks: u8,
}

const MAX_INPUT_LEN: usize = 64;

impl App {
    pub fn new(session: Session, player: Box<dyn AudioPlayer>) -> Self {
        Self {
            session,
            player,
            input: String::new(),
            screen: Screen::Game,
            should_quit: false,
            notice: None,
            notice_ticks: 0,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Advance the game clock and fade the notice.
    pub fn on_tick(&mut self) {
        if self.session.on_tick() {
            self.input.clear();
        }

        if self.notice_ticks > 0 {
            self.notice_ticks -= 1;
            if self.notice_ticks == 0 {
                self.notice = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::History => self.handle_history_key(key),
            Screen::Game => match self.session.state() {
                GameState::Idle => self.handle_idle_key(key),
                GameState::Playing => self.handle_playing_key(key),
                GameState::Finished => self.handle_finished_key(key),
            },
        }
    }

    fn handle_idle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.start(),
            KeyCode::Char('h') => self.screen = Screen::History,
            KeyCode::Char('n') => self
                .session
                .toggle_word_type(crate::catalog::WordType::Names),
            KeyCode::Char('a') => self
                .session
                .toggle_word_type(crate::catalog::WordType::Addresses),
            KeyCode::Char('s') => {
                let next = self.session.config().speed.cycle();
                self.session.set_speed(next);
            }
            KeyCode::Char('d') => {
                let next = self.session.config().duration.cycle();
                self.session.set_duration(next);
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_playing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.session.stop_playing();
                self.input.clear();
                self.clear_notice();
            }
            // Space replays; submissions are alphabetic-only so it can't be
            // part of a word.
            KeyCode::Char(' ') => self.replay(),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                if self.input.len() < MAX_INPUT_LEN {
                    self.input.push(c.to_ascii_lowercase());
                }
            }
            _ => {}
        }
    }

    fn handle_finished_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.start(),
            KeyCode::Char('h') => self.screen = Screen::History,
            KeyCode::Esc => {
                self.session.stop_playing();
                self.clear_notice();
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.screen = Screen::Game,
            KeyCode::Char('c') => {
                let _ = self.session.results().clear();
            }
            _ => {}
        }
    }

    fn start(&mut self) {
        if self.session.start_playing() {
            self.input.clear();
            self.clear_notice();
            self.play_current();
        }
    }

    fn submit(&mut self) {
        let text = self.input.clone();
        match self.session.submit_word(&text) {
            Some(SubmitOutcome::Correct { word }) => {
                self.input.clear();
                self.show_notice(Notice::Correct(word), NOTICE_TICKS_LONG);
                self.play_current();
            }
            Some(SubmitOutcome::Incorrect) => {
                self.show_notice(Notice::Incorrect, NOTICE_TICKS_SHORT);
            }
            None => {}
        }
    }

    fn replay(&mut self) {
        self.session.replay_word();
        self.show_notice(Notice::Replay, NOTICE_TICKS_SHORT);
        self.play_current();
    }

    /// Kick off audio for the active word and forward the clip duration to
    /// the engine when the player knows it.
    fn play_current(&mut self) {
        let rate = self.session.config().speed.rate();
        if let Some(word) = self.session.current_word().cloned() {
            if let Some(duration) = self.player.play(&word, rate) {
                self.session.audio_loaded(duration);
            }
        }
    }

    fn show_notice(&mut self, notice: Notice, ticks: u8) {
        self.notice = Some(notice);
        self.notice_ticks = ticks;
    }

    fn clear_notice(&mut self) {
        self.notice = None;
        self.notice_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Word, WordCatalog, WordType};
    use crate::player::SilentPlayer;
    use crate::results::{FileResultLog, ResultStore};
    use crate::session::SessionConfig;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(names: &[&str]) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut map = HashMap::new();
        map.insert(
            WordType::Names,
            names
                .iter()
                .map(|n| Word {
                    path: format!("words/names/{}.mp3", n),
                    name: n.to_string(),
                })
                .collect(),
        );
        let store = ResultStore::new(Box::new(FileResultLog::with_path(
            dir.path().join("results.json"),
        )));
        let session = Session::new(
            SessionConfig::default(),
            WordCatalog::from_words(map),
            store,
        );
        (App::new(session, Box::new(SilentPlayer)), dir)
    }

    fn type_word(app: &mut App, word: &str) {
        for c in word.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn test_space_starts_session_from_idle() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.state(), GameState::Playing);
    }

    #[test]
    fn test_typing_builds_lowercased_input() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));

        for c in ['M', 'a', 'R'] {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.input, "mar");

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "ma");

        // Digits never enter the buffer.
        app.handle_key(key(KeyCode::Char('7')));
        assert_eq!(app.input, "ma");
    }

    #[test]
    fn test_correct_submission_clears_input_and_notifies() {
        let (mut app, _dir) = app_with(&["maria", "john"]);
        app.handle_key(key(KeyCode::Char(' ')));

        let word = app.session.current_word().unwrap().name.clone();
        type_word(&mut app, &word);

        assert!(app.input.is_empty());
        assert_eq!(app.notice(), Some(&Notice::Correct(word)));
    }

    #[test]
    fn test_wrong_submission_keeps_input() {
        let (mut app, _dir) = app_with(&["maria", "john"]);
        app.handle_key(key(KeyCode::Char(' ')));

        type_word(&mut app, "zzz");
        assert_eq!(app.input, "zzz");
        assert_eq!(app.notice(), Some(&Notice::Incorrect));
    }

    #[test]
    fn test_notice_fades_after_its_ticks() {
        let (mut app, _dir) = app_with(&["maria", "john"]);
        app.handle_key(key(KeyCode::Char(' ')));
        type_word(&mut app, "zzz");

        for _ in 0..NOTICE_TICKS_SHORT {
            app.on_tick();
        }
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_space_replays_while_playing() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char(' ')));

        assert_eq!(app.session.tally().replays, 1);
        assert_eq!(app.notice(), Some(&Notice::Replay));
    }

    #[test]
    fn test_esc_while_playing_returns_to_idle() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('m')));
        app.handle_key(key(KeyCode::Esc));

        assert_eq!(app.session.state(), GameState::Idle);
        assert!(app.input.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_esc_from_idle_quits() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_finishing_last_word_lands_on_finished_screen() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));
        type_word(&mut app, "maria");

        assert_eq!(app.session.state(), GameState::Finished);
        assert!(app.session.outcome().is_some());

        // Space restarts from finished.
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.state(), GameState::Playing);
    }

    #[test]
    fn test_config_keys_adjust_settings_while_idle() {
        let (mut app, _dir) = app_with(&["maria"]);

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.session.config().speed, crate::session::Speed::Fast);

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            app.session.config().duration,
            crate::results::GameDuration::Seconds(120)
        );

        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.session.config().word_types.len(), 2);

        // Deselecting down to the last type is refused.
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.session.config().word_types.len(), 1);
    }

    #[test]
    fn test_config_keys_are_typing_while_playing() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));

        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('d')));

        // 's' and 'd' went into the input buffer, not the config.
        assert_eq!(app.input, "sd");
        assert_eq!(app.session.config().speed, crate::session::Speed::Normal);
    }

    #[test]
    fn test_history_screen_round_trip_and_clear() {
        let (mut app, _dir) = app_with(&["maria"]);

        // Finish one session so there is something in the log.
        app.handle_key(key(KeyCode::Char(' ')));
        type_word(&mut app, "maria");
        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.screen, Screen::History);
        assert_eq!(app.session.results().all().len(), 1);

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.session.results().all().is_empty());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Game);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_input_length_is_bounded() {
        let (mut app, _dir) = app_with(&["maria"]);
        app.handle_key(key(KeyCode::Char(' ')));

        for _ in 0..(MAX_INPUT_LEN + 10) {
            app.handle_key(key(KeyCode::Char('x')));
        }
        assert_eq!(app.input.len(), MAX_INPUT_LEN);
    }
}
