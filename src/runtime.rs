use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Everything the app loop reacts to. Ticks are synthesized by the loop when
/// no input arrives within the tick interval; they drive the countdown.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize).
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production source reading crossterm events on a background thread.
pub struct TerminalEvents {
    rx: Receiver<AppEvent>,
}

impl TerminalEvents {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for TerminalEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TerminalEvents {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless tests.
pub struct QueuedEvents {
    rx: Receiver<AppEvent>,
}

impl QueuedEvents {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for QueuedEvents {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls one event at a time from a source, substituting `Tick` whenever the
/// tick interval elapses without input. One tick == one step of game clock.
pub struct EventLoop<S: EventSource> {
    source: S,
    tick_interval: Duration,
}

impl<S: EventSource> EventLoop<S> {
    pub fn new(source: S, tick_interval: Duration) -> Self {
        Self {
            source,
            tick_interval,
        }
    }

    pub fn next(&self) -> AppEvent {
        match self.source.recv_timeout(self.tick_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_next_synthesizes_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let events = EventLoop::new(QueuedEvents::new(rx), Duration::from_millis(1));

        match events.next() {
            AppEvent::Tick => {}
            other => panic!("expected Tick, got {:?}", other),
        }
    }

    #[test]
    fn test_next_passes_queued_events_through() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let events = EventLoop::new(QueuedEvents::new(rx), Duration::from_millis(10));

        match events.next() {
            AppEvent::Resize => {}
            other => panic!("expected Resize, got {:?}", other),
        }
    }

    #[test]
    fn test_disconnected_source_degrades_to_ticks() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let events = EventLoop::new(QueuedEvents::new(rx), Duration::from_millis(1));

        match events.next() {
            AppEvent::Tick => {}
            other => panic!("expected Tick, got {:?}", other),
        }
    }
}
