//! Per-run session configuration.
//!
//! A [`SessionConfig`] can only be built through [`SessionConfig::new`] or
//! [`SessionConfig::from_minutes`], both of which reject zero durations and a
//! zero cycle count. The clock therefore never has to validate anything.

use std::time::Duration;

use crate::error::ConfigError;
use crate::phase::Phase;

const SECS_PER_MINUTE: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    work: Duration,
    short_break: Duration,
    long_break: Duration,
    cycles_before_long_break: u32,
    /// Stop the clock whenever a phase ends instead of rolling into the next.
    pause_between_phases: bool,
}

impl SessionConfig {
    pub fn new(
        work: Duration,
        short_break: Duration,
        long_break: Duration,
        cycles_before_long_break: u32,
    ) -> Result<Self, ConfigError> {
        for (key, value) in [
            ("work", work),
            ("short-break", short_break),
            ("long-break", long_break),
        ] {
            if value.is_zero() {
                return Err(ConfigError::invalid(key, "duration must be positive"));
            }
        }
        if cycles_before_long_break == 0 {
            return Err(ConfigError::invalid(
                "before-long",
                "at least one work cycle is required before a long break",
            ));
        }

        Ok(Self {
            work,
            short_break,
            long_break,
            cycles_before_long_break,
            pause_between_phases: false,
        })
    }

    /// Build from whole minutes as they appear in config files.
    ///
    /// Values are signed so that a negative entry is reported as an invalid
    /// configuration rather than a parse failure.
    pub fn from_minutes(
        work: i64,
        short_break: i64,
        long_break: i64,
        cycles_before_long_break: i64,
    ) -> Result<Self, ConfigError> {
        let cycles = u32::try_from(cycles_before_long_break)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "before-long",
                    format!("expected a positive cycle count, got {cycles_before_long_break}"),
                )
            })?;

        Self::new(
            minutes("work", work)?,
            minutes("short-break", short_break)?,
            minutes("long-break", long_break)?,
            cycles,
        )
    }

    pub fn with_pause_between_phases(mut self, pause: bool) -> Self {
        self.pause_between_phases = pause;
        self
    }

    pub fn work(&self) -> Duration {
        self.work
    }

    pub fn short_break(&self) -> Duration {
        self.short_break
    }

    pub fn long_break(&self) -> Duration {
        self.long_break
    }

    pub fn cycles_before_long_break(&self) -> u32 {
        self.cycles_before_long_break
    }

    pub fn pause_between_phases(&self) -> bool {
        self.pause_between_phases
    }

    pub fn duration_for(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Work => self.work,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }
}

impl Default for SessionConfig {
    /// The classic 25 / 5 / 15 minute schedule with a long break every fourth
    /// work session.
    fn default() -> Self {
        Self {
            work: Duration::from_secs(25 * SECS_PER_MINUTE),
            short_break: Duration::from_secs(5 * SECS_PER_MINUTE),
            long_break: Duration::from_secs(15 * SECS_PER_MINUTE),
            cycles_before_long_break: 4,
            pause_between_phases: false,
        }
    }
}

fn minutes(key: &str, value: i64) -> Result<Duration, ConfigError> {
    u64::try_from(value)
        .ok()
        .filter(|&m| m >= 1)
        .map(|m| Duration::from_secs(m.saturating_mul(SECS_PER_MINUTE)))
        .ok_or_else(|| {
            ConfigError::invalid(
                key,
                format!("expected a positive number of minutes, got {value}"),
            )
        })
}
