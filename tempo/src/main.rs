use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempo::app::App;
use tempo::config::{self, ConfigSources};
use tempo::ipc::server::{self, ControlHandle, ControlRequest};
use tempo::logging::{self, EventLog};
use tempo::notify::Notifier;
use tempo::{terminal, ui};
use tempo_core::{SessionClock, SessionSnapshot};
use tokio::sync::{mpsc, watch};
use tracing::info;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal Pomodoro timer
#[derive(Parser)]
#[command(name = "tempo", version, about, long_about = None)]
struct Cli {
    /// Extra config file, applied on top of the system and user files
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Load and validate the configuration, print it and exit
    #[arg(long)]
    check_config: bool,

    /// Do not open the control socket used by tempoctl
    #[arg(long)]
    no_control: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration problems are reported before the terminal is touched.
    let sources = ConfigSources::discover(cli.config.clone());
    let settings = config::load(&sources)?;
    let session = settings
        .session_config()
        .context("Refusing to start with an invalid configuration")?;

    if cli.check_config {
        println!("Configuration files (lowest precedence first):");
        for path in sources.existing() {
            println!("  {}", path.display());
        }
        println!("Work:              {} min", session.work().as_secs() / 60);
        println!("Short break:       {} min", session.short_break().as_secs() / 60);
        println!("Long break:        {} min", session.long_break().as_secs() / 60);
        println!("Before long break: {} rounds", session.cycles_before_long_break());
        println!("Pause on phase end: {}", session.pause_between_phases());
        return Ok(());
    }

    let log_path = logging::init(cli.verbose)?;
    info!(log = %log_path.display(), "tempo starting");

    let mut app = App::new(SessionClock::new(session.clone()), settings);
    app.add_listener(Box::new(EventLog));
    if app.settings.notifications.enabled {
        app.add_listener(Box::new(Notifier::new(session)));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let (snapshot_tx, snapshot_rx) = watch::channel(app.snapshot());
    let (mut control, _socket) = if cli.no_control {
        (None, None)
    } else {
        let _guard = runtime.enter();
        let (listener, socket) = server::bind(&tempo_ipc::socket_path())?;
        let (request_tx, request_rx) = mpsc::channel(16);
        runtime.spawn(server::serve(
            listener,
            ControlHandle::new(request_tx, snapshot_rx),
        ));
        (Some(request_rx), Some(socket))
    };

    let mut tui = terminal::init()?;
    let res = run_app(&mut tui, &mut app, control.as_mut(), &snapshot_tx);
    terminal::restore()?;

    info!("tempo exiting");
    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut control: Option<&mut mpsc::Receiver<ControlRequest>>,
    snapshots: &watch::Sender<SessionSnapshot>,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        app.tick(now - last_tick);
        last_tick = now;

        if let Some(requests) = control.as_deref_mut() {
            while let Ok(request) = requests.try_recv() {
                let snapshot = app.apply(request.command);
                request.respond(snapshot);
            }
        }
        snapshots.send_replace(app.snapshot());

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
}
