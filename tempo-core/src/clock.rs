//! Session clock implementation.
//!
//! The clock is a state machine driven by elapsed-time deltas. It owns no
//! thread and never reads the wall clock: the caller measures time and
//! feeds it in through `tick()`.
//!
//! ## Phase transitions
//!
//! ```text
//! Work --(cycles % N != 0)--> ShortBreak --> Work
//! Work --(cycles % N == 0)--> LongBreak  --> Work   (cycles reset to 0)
//! ```
//!
//! ## Usage
//!
//! ```
//! use std::time::Duration;
//! use tempo_core::{ClockEvent, SessionClock, SessionConfig};
//!
//! let mut clock = SessionClock::new(SessionConfig::default());
//! clock.start();
//! // In a loop:
//! if let Some(ClockEvent::PhaseChanged { to, .. }) = clock.tick(Duration::from_secs(1)) {
//!     println!("now: {to}");
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::event::ClockEvent;
use crate::phase::Phase;

/// The Pomodoro state machine.
#[derive(Debug, Clone)]
pub struct SessionClock {
    config: SessionConfig,
    phase: Phase,
    cycles_completed: u32,
    /// Always within `0..=config.duration_for(phase)`.
    remaining: Duration,
    running: bool,
}

impl SessionClock {
    /// Create a paused clock at the start of the first work phase.
    pub fn new(config: SessionConfig) -> Self {
        let remaining = config.work();
        Self {
            config,
            phase: Phase::Work,
            cycles_completed: 0,
            remaining,
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            cycles_completed: self.cycles_completed,
            cycles_before_long_break: self.config.cycles_before_long_break(),
            remaining_ms: duration_ms(self.remaining),
            total_ms: duration_ms(self.config.duration_for(self.phase)),
            running: self.running,
            pause_between_phases: self.config.pause_between_phases(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<ClockEvent> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(ClockEvent::Started {
            phase: self.phase,
            remaining: self.remaining,
        })
    }

    pub fn pause(&mut self) -> Option<ClockEvent> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(ClockEvent::Paused {
            phase: self.phase,
            remaining: self.remaining,
        })
    }

    /// Start when paused, pause when running.
    pub fn toggle(&mut self) -> Option<ClockEvent> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Advance the clock by `elapsed`.
    ///
    /// Returns `None` while paused. At most one phase transition happens per
    /// call; time beyond the end of the current phase is dropped.
    pub fn tick(&mut self, elapsed: Duration) -> Option<ClockEvent> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            return Some(self.advance_phase());
        }
        Some(ClockEvent::Tick {
            remaining: self.remaining,
            phase: self.phase,
        })
    }

    /// End the current phase now, exactly as if it had run out.
    pub fn skip(&mut self) -> ClockEvent {
        self.advance_phase()
    }

    pub fn reset(&mut self) -> ClockEvent {
        self.phase = Phase::Work;
        self.cycles_completed = 0;
        self.remaining = self.config.work();
        self.running = false;
        ClockEvent::Reset
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance_phase(&mut self) -> ClockEvent {
        let from = self.phase;
        let to = match from {
            Phase::Work => {
                self.cycles_completed += 1;
                if self.cycles_completed % self.config.cycles_before_long_break() == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak => Phase::Work,
            Phase::LongBreak => {
                self.cycles_completed = 0;
                Phase::Work
            }
        };

        self.phase = to;
        self.remaining = self.config.duration_for(to);
        if self.config.pause_between_phases() {
            self.running = false;
        }

        ClockEvent::PhaseChanged {
            from,
            to,
            cycles_completed: self.cycles_completed,
        }
    }
}

/// Immutable copy of the clock state, safe to hand to renderers and to the
/// control socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub cycles_completed: u32,
    pub cycles_before_long_break: u32,
    /// Remaining time in the current phase, in milliseconds.
    pub remaining_ms: u64,
    /// Full length of the current phase, in milliseconds.
    pub total_ms: u64,
    pub running: bool,
    #[serde(default)]
    pub pause_between_phases: bool,
}

impl SessionSnapshot {
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms)
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_ms as f64 / self.total_ms as f64).clamp(0.0, 1.0)
    }

    /// Work phases left to finish before the long break starts, counting the
    /// current one. Zero while the long break is running.
    pub fn work_sessions_until_long_break(&self) -> u32 {
        self.cycles_before_long_break
            .saturating_sub(self.cycles_completed)
    }

    /// Remaining whole seconds, rounded up so that `00:00` only shows once
    /// the phase is actually over.
    pub fn remaining_secs_ceil(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    /// Remaining time as `MM:SS`; minutes keep growing past 59.
    pub fn remaining_clock(&self) -> String {
        let secs = self.remaining_secs_ceil();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Duration = Duration::from_secs(60);

    fn classic() -> SessionClock {
        SessionClock::new(SessionConfig::default())
    }

    fn short(cycles: u32) -> SessionClock {
        let config = SessionConfig::new(10 * MIN, 2 * MIN, 5 * MIN, cycles).unwrap();
        SessionClock::new(config)
    }

    #[test]
    fn new_clock_is_paused_at_full_work() {
        let clock = classic();
        assert_eq!(clock.phase(), Phase::Work);
        assert_eq!(clock.remaining(), 25 * MIN);
        assert_eq!(clock.cycles_completed(), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut clock = classic();
        assert!(clock.start().is_some());
        assert!(clock.start().is_none());
        assert!(clock.is_running());

        assert!(clock.pause().is_some());
        assert!(clock.pause().is_none());
        assert!(!clock.is_running());
    }

    #[test]
    fn toggle_flips_running() {
        let mut clock = classic();
        assert!(matches!(clock.toggle(), Some(ClockEvent::Started { .. })));
        assert!(matches!(clock.toggle(), Some(ClockEvent::Paused { .. })));
        assert!(!clock.is_running());
    }

    #[test]
    fn tick_while_paused_changes_nothing() {
        let mut clock = classic();
        for _ in 0..10 {
            assert_eq!(clock.tick(MIN), None);
        }
        assert_eq!(clock.remaining(), 25 * MIN);
    }

    #[test]
    fn pause_preserves_remaining() {
        let mut clock = classic();
        clock.start();
        clock.tick(3 * MIN);
        clock.pause();
        clock.tick(3 * MIN);
        assert_eq!(clock.remaining(), 22 * MIN);
    }

    #[test]
    fn tick_emits_remaining_time() {
        let mut clock = classic();
        clock.start();
        assert_eq!(
            clock.tick(Duration::from_secs(1)),
            Some(ClockEvent::Tick {
                remaining: 25 * MIN - Duration::from_secs(1),
                phase: Phase::Work,
            })
        );
    }

    #[test]
    fn huge_tick_floors_at_zero_and_transitions_once() {
        let mut clock = short(4);
        clock.start();
        let event = clock.tick(Duration::from_secs(u64::MAX));
        assert_eq!(
            event,
            Some(ClockEvent::PhaseChanged {
                from: Phase::Work,
                to: Phase::ShortBreak,
                cycles_completed: 1,
            })
        );
        assert_eq!(clock.remaining(), 2 * MIN);
    }

    #[test]
    fn running_carries_into_next_phase() {
        let mut clock = short(4);
        clock.start();
        clock.tick(10 * MIN);
        assert!(clock.is_running());
        assert_eq!(clock.phase(), Phase::ShortBreak);
    }

    #[test]
    fn pause_between_phases_stops_clock() {
        let config = SessionConfig::new(10 * MIN, 2 * MIN, 5 * MIN, 4)
            .unwrap()
            .with_pause_between_phases(true);
        let mut clock = SessionClock::new(config);
        clock.start();
        clock.tick(10 * MIN);
        assert_eq!(clock.phase(), Phase::ShortBreak);
        assert!(!clock.is_running());
        assert_eq!(clock.tick(MIN), None);
        assert_eq!(clock.remaining(), 2 * MIN);
    }

    #[test]
    fn classic_schedule_reaches_long_break_after_four_cycles() {
        let mut clock = classic();
        clock.start();

        let mut cycle_counts = Vec::new();
        for _ in 0..4 {
            match clock.tick(25 * MIN) {
                Some(ClockEvent::PhaseChanged {
                    from: Phase::Work,
                    to,
                    cycles_completed,
                }) => {
                    cycle_counts.push(cycles_completed);
                    if cycles_completed < 4 {
                        assert_eq!(to, Phase::ShortBreak);
                        clock.tick(5 * MIN);
                    } else {
                        assert_eq!(to, Phase::LongBreak);
                    }
                }
                other => panic!("expected work to end, got {other:?}"),
            }
        }
        assert_eq!(cycle_counts, vec![1, 2, 3, 4]);
        assert_eq!(clock.phase(), Phase::LongBreak);
        assert_eq!(clock.cycles_completed(), 4);

        assert_eq!(
            clock.tick(15 * MIN),
            Some(ClockEvent::PhaseChanged {
                from: Phase::LongBreak,
                to: Phase::Work,
                cycles_completed: 0,
            })
        );
    }

    #[test]
    fn single_cycle_goes_straight_to_long_break() {
        let mut clock = short(1);
        clock.reset();
        clock.start();
        let events: Vec<_> = (0..10)
            .filter_map(|_| clock.tick(MIN))
            .filter(ClockEvent::is_phase_change)
            .collect();
        assert_eq!(
            events,
            vec![ClockEvent::PhaseChanged {
                from: Phase::Work,
                to: Phase::LongBreak,
                cycles_completed: 1,
            }]
        );
    }

    #[test]
    fn skip_matches_natural_expiry() {
        let mut natural = short(2);
        let mut skipped = short(2);
        natural.start();
        skipped.start();

        for _ in 0..6 {
            let expected = loop {
                if let Some(event @ ClockEvent::PhaseChanged { .. }) = natural.tick(MIN) {
                    break event;
                }
            };
            skipped.tick(Duration::from_secs(7));
            assert_eq!(skipped.skip(), expected);
            assert_eq!(skipped.phase(), natural.phase());
            assert_eq!(skipped.remaining(), skipped.config().duration_for(skipped.phase()));
            assert_eq!(skipped.cycles_completed(), natural.cycles_completed());
        }
    }

    #[test]
    fn skip_works_while_paused() {
        let mut clock = classic();
        clock.skip();
        assert_eq!(clock.phase(), Phase::ShortBreak);
        assert_eq!(clock.remaining(), 5 * MIN);
        assert!(!clock.is_running());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut clock = short(2);
        clock.start();
        clock.skip();
        clock.skip();
        clock.skip();
        clock.tick(MIN);
        assert_eq!(clock.reset(), ClockEvent::Reset);
        assert_eq!(clock.phase(), Phase::Work);
        assert_eq!(clock.remaining(), 10 * MIN);
        assert_eq!(clock.cycles_completed(), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut clock = short(4);
        clock.start();
        clock.tick(5 * MIN);
        let snap = clock.snapshot();
        assert_eq!(snap.phase, Phase::Work);
        assert_eq!(snap.remaining_ms, 5 * 60 * 1000);
        assert_eq!(snap.total_ms, 10 * 60 * 1000);
        assert!((snap.progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(snap.work_sessions_until_long_break(), 4);
        assert!(snap.running);
    }

    #[test]
    fn snapshot_rounds_seconds_up() {
        let mut clock = short(4);
        clock.start();
        clock.tick(Duration::from_millis(500));
        assert_eq!(clock.snapshot().remaining_secs_ceil(), 600);
        clock.tick(Duration::from_millis(600));
        assert_eq!(clock.snapshot().remaining_secs_ceil(), 599);
        assert_eq!(clock.snapshot().remaining_clock(), "09:59");
    }

    #[test]
    fn remaining_clock_keeps_counting_minutes() {
        let config = SessionConfig::from_minutes(120, 5, 15, 4).unwrap();
        let clock = SessionClock::new(config);
        assert_eq!(clock.snapshot().remaining_clock(), "120:00");
    }

    #[test]
    fn snapshot_serializes_phase_in_snake_case() {
        let mut clock = classic();
        clock.skip();
        let json = serde_json::to_value(clock.snapshot()).unwrap();
        assert_eq!(json["phase"], "short_break");
        assert_eq!(json["cycles_completed"], 1);
    }
}
