use crate::config::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempo_core::{ClockEvent, EventListener, SessionClock, SessionSnapshot};
use tempo_ipc::Command;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Normal,
    ShowHelp,
}

/// Owns the session clock for the lifetime of the TUI.
///
/// Everything that changes the clock goes through [`App::apply`] or
/// [`App::tick`], so every event reaches the registered listeners.
pub struct App {
    clock: SessionClock,
    pub settings: Settings,
    pub mode: AppMode,
    pub should_quit: bool,
    listeners: Vec<Box<dyn EventListener>>,
}

impl App {
    pub fn new(clock: SessionClock, settings: Settings) -> Self {
        Self {
            clock,
            settings,
            mode: AppMode::Normal,
            should_quit: false,
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.clock.snapshot()
    }

    pub fn tick(&mut self, elapsed: std::time::Duration) {
        let event = self.clock.tick(elapsed);
        self.dispatch(event);
    }

    /// Run a control command against the clock and return the new state.
    pub fn apply(&mut self, command: Command) -> SessionSnapshot {
        let event = match command {
            Command::Start => self.clock.start(),
            Command::Pause => self.clock.pause(),
            Command::Toggle => self.clock.toggle(),
            Command::Skip => Some(self.clock.skip()),
            Command::Reset => Some(self.clock.reset()),
            Command::Status => None,
        };
        self.dispatch(event);
        self.clock.snapshot()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            AppMode::ShowHelp => match key.code {
                KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
                    self.mode = AppMode::Normal;
                }
                _ => {}
            },
            AppMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char(' ') => {
                    self.apply(Command::Toggle);
                }
                KeyCode::Char('s') => {
                    self.apply(Command::Skip);
                }
                KeyCode::Char('r') => {
                    self.apply(Command::Reset);
                }
                KeyCode::Char('?') => self.mode = AppMode::ShowHelp,
                _ => {}
            },
        }
    }

    fn dispatch(&mut self, event: Option<ClockEvent>) {
        if let Some(event) = event {
            for listener in &mut self.listeners {
                listener.on_event(&event);
            }
        }
    }
}
