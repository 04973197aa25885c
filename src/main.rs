use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use spel::{
    app::App,
    catalog::{WordCatalog, WordType},
    player::{AudioPlayer, CommandPlayer, SilentPlayer},
    results::{FileResultLog, GameDuration, ResultStore},
    runtime::{AppEvent, EventLoop, TerminalEvents},
    session::{GameState, Session, SessionConfig, Speed},
    ui, TICK_RATE_MS,
};

/// spelling-by-ear practice tui: listen to a word, type what you heard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Hear a word read aloud, type its spelling, and chase the high score. \
Correct answers earn points, replays halve them, and wrong guesses cost a capped penalty."
)]
struct Cli {
    /// directory of word audio, one subfolder per word type with .mp3 files
    /// named after their spelling (falls back to the built-in word lists)
    #[clap(short = 'w', long)]
    words_dir: Option<PathBuf>,

    /// word types to practice (repeat to select several)
    #[clap(short = 't', long = "word-type", value_enum)]
    word_types: Vec<WordType>,

    /// audio playback speed
    #[clap(short = 's', long, value_enum, default_value_t = Speed::Normal)]
    speed: Speed,

    /// session length in seconds, or "unlimited"
    #[clap(short = 'd', long, value_parser = parse_duration, default_value = "30")]
    duration: GameDuration,

    /// shell command used to play audio, with {path} and {rate} placeholders
    /// (e.g. "mpv --speed={rate} {path}")
    #[clap(short = 'p', long)]
    player: Option<String>,

    /// print past results and exit
    #[clap(long)]
    history: bool,

    /// export past results as CSV to the given path and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// delete all stored results and exit
    #[clap(long)]
    clear_history: bool,
}

fn parse_duration(s: &str) -> Result<GameDuration, String> {
    if s.eq_ignore_ascii_case("unlimited") {
        return Ok(GameDuration::Unlimited);
    }
    s.parse::<u64>()
        .map(GameDuration::Seconds)
        .map_err(|_| format!("expected a number of seconds or \"unlimited\", got {:?}", s))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = ResultStore::new(Box::new(FileResultLog::new()));

    // Headless subcommand-style flags run without a terminal.
    if cli.clear_history {
        store.clear()?;
        println!("cleared stored results");
        return Ok(());
    }
    if cli.history {
        print_history(&store);
        return Ok(());
    }
    if let Some(path) = &cli.export_csv {
        let count = export_csv(&store, path)?;
        println!("wrote {} results to {}", count, path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let catalog = WordCatalog::load(cli.words_dir.as_deref());

    let mut config = SessionConfig {
        speed: cli.speed,
        duration: cli.duration,
        ..SessionConfig::default()
    };
    if !cli.word_types.is_empty() {
        config.word_types = cli.word_types.iter().copied().unique().collect();
    }

    let player: Box<dyn AudioPlayer> = match cli.player {
        Some(template) => Box::new(CommandPlayer::new(template)),
        None => Box::new(SilentPlayer),
    };

    let session = Session::new(config, catalog, store);
    let mut app = App::new(session, player);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = EventLoop::new(TerminalEvents::new(), Duration::from_millis(TICK_RATE_MS));

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match events.next() {
            AppEvent::Key(key) => {
                app.handle_key(key);
                if app.should_quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Tick => {
                app.on_tick();
                // Redraw only when something on screen can actually move.
                if app.session.state() == GameState::Playing || app.notice().is_some() {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
        }
    }

    Ok(())
}

fn print_history(store: &ResultStore) {
    let results = store.all();
    if results.is_empty() {
        println!("no stored results");
        return;
    }

    for r in results.iter().rev() {
        println!(
            "{}  score {:8.3}  ✓{:<3} ✗{:<3} ↻{:<3}  {}  {}  {}",
            r.date,
            r.score,
            r.correct,
            r.incorrect,
            r.replays,
            r.word_types.iter().join("+"),
            r.speed,
            r.duration_seconds.label(),
        );
    }
}

fn export_csv(store: &ResultStore, path: &std::path::Path) -> Result<usize, Box<dyn Error>> {
    let results = store.all();

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "score",
        "correct",
        "incorrect",
        "replays",
        "wordTypes",
        "speed",
        "durationSeconds",
    ])?;

    for r in &results {
        writer.write_record([
            r.date.to_string(),
            format!("{:.3}", r.score),
            r.correct.to_string(),
            r.incorrect.to_string(),
            r.replays.to_string(),
            r.word_types.iter().join("+"),
            r.speed.clone(),
            r.duration_seconds
                .secs()
                .map_or_else(|| "unlimited".to_string(), |s| s.to_string()),
        ])?;
    }
    writer.flush()?;

    Ok(results.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["spel"]);

        assert_eq!(cli.words_dir, None);
        assert!(cli.word_types.is_empty());
        assert!(matches!(cli.speed, Speed::Normal));
        assert_eq!(cli.duration, GameDuration::Seconds(30));
        assert_eq!(cli.player, None);
        assert!(!cli.history);
        assert!(!cli.clear_history);
    }

    #[test]
    fn test_cli_word_types_repeat() {
        let cli = Cli::parse_from(["spel", "-t", "names", "-t", "addresses"]);
        assert_eq!(cli.word_types, vec![WordType::Names, WordType::Addresses]);
    }

    #[test]
    fn test_cli_speed_and_duration() {
        let cli = Cli::parse_from(["spel", "-s", "fast", "-d", "120"]);
        assert!(matches!(cli.speed, Speed::Fast));
        assert_eq!(cli.duration, GameDuration::Seconds(120));

        let cli = Cli::parse_from(["spel", "--duration", "unlimited"]);
        assert_eq!(cli.duration, GameDuration::Unlimited);
    }

    #[test]
    fn test_cli_rejects_bad_duration() {
        assert!(Cli::try_parse_from(["spel", "-d", "soon"]).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30"), Ok(GameDuration::Seconds(30)));
        assert_eq!(parse_duration("UNLIMITED"), Ok(GameDuration::Unlimited));
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_cli_player_template() {
        let cli = Cli::parse_from(["spel", "-p", "mpv --speed={rate} {path}"]);
        assert_eq!(cli.player, Some("mpv --speed={rate} {path}".to_string()));
    }

    #[test]
    fn test_export_csv_writes_header_and_rows() {
        use spel::results::{FileResultLog, GameResult};
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let store = ResultStore::new(Box::new(FileResultLog::with_path(
            dir.path().join("results.json"),
        )));
        store
            .append(GameResult {
                score: 123.456,
                correct: 3,
                incorrect: 1,
                replays: 2,
                word_types: vec!["names".to_string()],
                speed: "Normal".to_string(),
                duration_seconds: GameDuration::Unlimited,
                date: 1_700_000_000_000,
                history: Vec::new(),
            })
            .unwrap();

        let out = dir.path().join("out.csv");
        let count = export_csv(&store, &out).unwrap();
        assert_eq!(count, 1);

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("date,score,correct,incorrect,replays"));
        assert!(text.contains("123.456"));
        assert!(text.contains("unlimited"));
    }
}
