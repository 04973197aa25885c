// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only plumbing in main.rs.
pub mod app;
pub mod catalog;
pub mod history;
pub mod player;
pub mod results;
pub mod runtime;
pub mod scoring;
pub mod sequencer;
pub mod session;
pub mod ui;
pub mod util;

/// Milliseconds between game-clock ticks. Ten ticks make one second of
/// countdown.
pub const TICK_RATE_MS: u64 = 100;
