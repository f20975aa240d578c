//! The tempo terminal Pomodoro timer.

pub mod app;
pub mod config;
pub mod ipc;
pub mod logging;
pub mod notify;
pub mod terminal;
pub mod ui;
