use std::time::Duration;

use crate::phase::Phase;

/// Every observable change of the session clock produces an event.
///
/// Clock operations return the event they caused; the driver decides who
/// gets to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent {
    /// Time advanced inside the current phase.
    Tick { remaining: Duration, phase: Phase },
    /// The current phase ended, either by running out or by a skip.
    /// `cycles_completed` is the count after the transition.
    PhaseChanged {
        from: Phase,
        to: Phase,
        cycles_completed: u32,
    },
    Started { phase: Phase, remaining: Duration },
    Paused { phase: Phase, remaining: Duration },
    Reset,
}

impl ClockEvent {
    pub fn is_phase_change(&self) -> bool {
        matches!(self, ClockEvent::PhaseChanged { .. })
    }
}

/// Receives clock events from the driver loop.
pub trait EventListener {
    fn on_event(&mut self, event: &ClockEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&ClockEvent),
{
    fn on_event(&mut self, event: &ClockEvent) {
        self(event)
    }
}
