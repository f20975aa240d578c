//! Desktop notifications on phase changes.

use std::sync::mpsc;
use std::thread;
use tempo_core::{ClockEvent, EventListener, Phase, SessionConfig};
use tracing::{debug, warn};

/// Sends a desktop notification on every phase change.
///
/// Delivery happens on a worker thread: `show()` talks to the notification
/// daemon synchronously and must not hold up the frame loop. The worker exits
/// once the notifier is dropped.
pub struct Notifier {
    config: SessionConfig,
    outbox: mpsc::Sender<(String, String)>,
}

impl Notifier {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_delivery(config, show)
    }

    /// Use `deliver` instead of the desktop notification daemon.
    pub fn with_delivery<F>(config: SessionConfig, deliver: F) -> Self
    where
        F: Fn(&str, &str) + Send + 'static,
    {
        let (outbox, inbox) = mpsc::channel::<(String, String)>();
        let spawned = thread::Builder::new()
            .name("tempo-notify".to_string())
            .spawn(move || {
                for (title, body) in inbox {
                    deliver(&title, &body);
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to start notification worker");
        }
        Self { config, outbox }
    }
}

fn show(title: &str, body: &str) {
    match notify_rust::Notification::new()
        .summary(title)
        .body(body)
        .appname("tempo")
        .show()
    {
        Ok(_) => debug!(title, "notification sent"),
        Err(e) => warn!(error = %e, "failed to send notification"),
    }
}

impl EventListener for Notifier {
    fn on_event(&mut self, event: &ClockEvent) {
        if let ClockEvent::PhaseChanged {
            from,
            to,
            cycles_completed,
        } = *event
        {
            let note = message(&self.config, from, to, cycles_completed);
            if self.outbox.send(note).is_err() {
                warn!("notification worker is gone, dropping notification");
            }
        }
    }
}

/// Title and body for a phase-change notification.
pub fn message(config: &SessionConfig, from: Phase, to: Phase, cycles: u32) -> (String, String) {
    let minutes = config.duration_for(to).as_secs().div_ceil(60);
    let title = match to {
        Phase::Work => format!("{from} over, back to work"),
        Phase::ShortBreak | Phase::LongBreak => {
            format!("{from} finished, {}", to.label().to_lowercase())
        }
    };
    let body = match to {
        Phase::Work => format!("Next work session: {minutes} min"),
        Phase::ShortBreak => format!(
            "{minutes} min break. {cycles} of {} rounds done.",
            config.cycles_before_long_break()
        ),
        Phase::LongBreak => format!("{minutes} min break. {cycles} rounds done, well earned."),
    };
    (title, body)
}
