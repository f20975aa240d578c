//! Tracing setup.
//!
//! The TUI owns stdout and stderr, so logs go to `tempo.log` in the data
//! directory instead of the terminal.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tempo_core::{ClockEvent, EventListener};
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TEMPO_LOG";

/// Filter from `$TEMPO_LOG`, else from the `-v` count.
pub fn filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    })
}

pub fn log_path() -> PathBuf {
    ProjectDirs::from("", "", "tempo")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
        .join("tempo.log")
}

pub fn init(verbose: u8) -> Result<PathBuf> {
    let path = log_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {:?}", dir))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;
    Ok(path)
}

/// Writes every clock event to the log.
pub struct EventLog;

impl EventListener for EventLog {
    fn on_event(&mut self, event: &ClockEvent) {
        match event {
            ClockEvent::Tick { remaining, phase } => {
                trace!(%phase, remaining_ms = remaining.as_millis() as u64, "tick")
            }
            ClockEvent::PhaseChanged {
                from,
                to,
                cycles_completed,
            } => info!(%from, %to, cycles_completed, "phase changed"),
            ClockEvent::Started { phase, remaining } => {
                info!(%phase, remaining_secs = remaining.as_secs(), "timer started")
            }
            ClockEvent::Paused { phase, remaining } => {
                info!(%phase, remaining_secs = remaining.as_secs(), "timer paused")
            }
            ClockEvent::Reset => info!("session reset"),
        }
    }
}
