use chrono::{Local, TimeZone};
use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Notice, Screen};
use crate::catalog::WordType;
use crate::results::GameResult;
use crate::session::GameState;
use crate::util::format_clock;

const HORIZONTAL_MARGIN: u16 = 4;

pub fn draw(app: &App, f: &mut Frame) {
    match app.screen {
        Screen::History => render_history(app, f),
        Screen::Game => match app.session.state() {
            GameState::Idle => render_idle(app, f),
            GameState::Playing => render_playing(app, f),
            GameState::Finished => render_finished(app, f),
        },
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn centered_column(area: Rect, lines: u16) -> Rect {
    let top = area.height.saturating_sub(lines) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(lines),
            Constraint::Min(0),
        ])
        .split(area);
    chunks[1]
}

fn config_line(app: &App) -> Line<'static> {
    let config = app.session.config();
    let selected = |t: WordType| config.word_types.contains(&t);

    let mark = |on: bool| if on { "✓" } else { "·" };
    let type_style = |on: bool| if on { bold() } else { dim() };

    Line::from(vec![
        Span::styled(
            format!("(n)ames {} ", mark(selected(WordType::Names))),
            type_style(selected(WordType::Names)),
        ),
        Span::styled(
            format!("(a)ddresses {} ", mark(selected(WordType::Addresses))),
            type_style(selected(WordType::Addresses)),
        ),
        Span::styled(format!(" (s)peed: {} ", config.speed), dim()),
        Span::styled(format!(" (d)uration: {}", config.duration.label()), dim()),
    ])
}

fn timer_line(app: &App) -> Line<'static> {
    let text = match app.session.seconds_remaining() {
        Some(secs) => format_clock(secs),
        None => "∞".to_string(),
    };
    let urgent = app
        .session
        .seconds_remaining()
        .is_some_and(|secs| secs < 10.0);
    let style = if urgent {
        bold().fg(Color::Red)
    } else {
        bold()
    };
    Line::from(Span::styled(text, style))
}

fn tally_line(app: &App) -> Line<'static> {
    let tally = app.session.tally();
    Line::from(vec![
        Span::styled(format!("✓ {}", tally.correct), Style::default().fg(Color::Green)),
        Span::raw("   "),
        Span::styled(format!("✗ {}", tally.incorrect), Style::default().fg(Color::Red)),
        Span::raw("   "),
        Span::styled(format!("↻ {}", tally.replays), dim()),
    ])
}

fn notice_line(app: &App) -> Line<'static> {
    match app.notice() {
        Some(Notice::Correct(word)) => Line::from(Span::styled(
            format!("Correct! \"{}\"", word),
            bold().fg(Color::Green),
        )),
        Some(Notice::Incorrect) => {
            Line::from(Span::styled("Incorrect", bold().fg(Color::Red)))
        }
        Some(Notice::Replay) => Line::from(Span::styled("Replay", dim())),
        None => Line::from(""),
    }
}

fn render_idle(app: &App, f: &mut Frame) {
    let area = centered_column(f.area(), 8);

    let lines = vec![
        Line::from(Span::styled("spel", bold())),
        Line::from(Span::styled(
            "listen to a word, type what you heard",
            dim().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        config_line(app),
        Line::from(""),
        timer_line(app),
        Line::from(""),
        Line::from(Span::styled(
            "space: start   h: history   esc: quit",
            dim(),
        )),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

fn render_playing(app: &App, f: &mut Frame) {
    let area = centered_column(f.area(), 10);

    // The typed word with a block cursor; width keeps the cursor aligned
    // even if wide glyphs ever sneak in.
    let input_line = if app.input.width() == 0 {
        Line::from(Span::styled("type the word…", dim().add_modifier(Modifier::ITALIC)))
    } else {
        Line::from(vec![
            Span::styled(app.input.clone(), bold()),
            Span::styled("█", dim()),
        ])
    };

    let lines = vec![
        timer_line(app),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Word {} of {}",
                app.session.word_number(),
                app.session.words_total()
            ),
            dim(),
        )),
        tally_line(app),
        Line::from(""),
        input_line,
        Line::from(""),
        notice_line(app),
        Line::from(""),
        Line::from(Span::styled(
            "enter: submit   space: replay   esc: exit",
            dim(),
        )),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

fn render_finished(app: &App, f: &mut Frame) {
    let Some(outcome) = app.session.outcome() else {
        return;
    };

    let headline = if outcome.is_high_score {
        Line::from(Span::styled(
            "🎉 New high score! 🎉",
            bold().fg(Color::Yellow),
        ))
    } else {
        Line::from(Span::styled("Nice try!", bold()))
    };

    let high_line = if outcome.is_high_score {
        Line::from("")
    } else {
        Line::from(Span::styled(
            format!("High score for this duration: {:.3}", outcome.previous_high),
            dim(),
        ))
    };

    let tally = outcome.result.counters();
    let lines = vec![
        headline,
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{:.3}", outcome.result.score), bold().fg(Color::Cyan)),
            Span::styled(" points", dim()),
        ]),
        high_line,
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "✓ {}   ✗ {}   ↻ {}",
                tally.correct, tally.incorrect, tally.replays
            ),
            dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "space: play again   h: history   esc: home",
            dim(),
        )),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(widget, centered_column(f.area(), 9));
}

fn render_history(app: &App, f: &mut Frame) {
    let results = app.session.results().all();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.area());

    let storage_kb = estimated_storage_kb(&results);
    let title = Paragraph::new(vec![
        Line::from(Span::styled("Game History", bold())),
        Line::from(Span::styled(
            format!("{} games · ~{:.2} KB stored", results.len(), storage_kb),
            dim(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Score"),
        Cell::from("✓"),
        Cell::from("✗"),
        Cell::from("↻"),
        Cell::from("Words"),
        Cell::from("Time"),
    ])
    .style(bold().fg(Color::Yellow));

    // Newest first.
    let rows: Vec<Row> = results
        .iter()
        .rev()
        .map(|r| {
            Row::new(vec![
                Cell::from(format_date(r.date)),
                Cell::from(format!("{:.3}", r.score)),
                Cell::from(r.correct.to_string()),
                Cell::from(r.incorrect.to_string()),
                Cell::from(r.replays.to_string()),
                Cell::from(r.word_types.iter().join("+")),
                Cell::from(r.duration_seconds.label()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        &[
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(18),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(table, chunks[1]);

    let hints = Paragraph::new(Span::styled("c: clear all   esc: back", dim()))
        .alignment(Alignment::Center);
    f.render_widget(hints, chunks[2]);
}

fn format_date(epoch_ms: i64) -> String {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn estimated_storage_kb(results: &[GameResult]) -> f64 {
    let bytes = serde_json::to_vec(results).map(|v| v.len()).unwrap_or(0);
    bytes as f64 / 1024.0
}
