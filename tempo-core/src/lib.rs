//! Core of the tempo Pomodoro timer.
//!
//! This crate holds the session clock, the state machine that walks through
//! work, short-break and long-break phases. It performs no I/O: callers feed
//! it elapsed time through [`SessionClock::tick`] and render the
//! [`ClockEvent`]s and [`SessionSnapshot`]s it hands back.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod phase;

pub use clock::{SessionClock, SessionSnapshot};
pub use config::SessionConfig;
pub use error::ConfigError;
pub use event::{ClockEvent, EventListener};
pub use phase::Phase;
