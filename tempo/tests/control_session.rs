//! End-to-end control flow: config file -> app -> control socket -> client.
//!
//! The UI loop is replaced by a thread that drains control requests the same
//! way `run_app` does, so the tests exercise the real server and framing.

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempo::app::App;
use tempo::config::{self, ConfigSources, Settings};
use tempo::ipc::server::{self, ControlHandle, ControlRequest};
use tempo_core::{ClockEvent, Phase, SessionClock, SessionSnapshot};
use tempo_ipc::{read_message, write_message, Command, Response};
use tokio::io::BufReader;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, watch};

fn settings_from_ini(dir: &tempfile::TempDir, ini: &str) -> Settings {
    let path = dir.path().join("tempo.ini");
    fs::write(&path, ini).unwrap();
    let sources = ConfigSources {
        system: dir.path().join("no-system.ini"),
        user: None,
        explicit: Some(path),
    };
    config::load(&sources).unwrap()
}

fn app_from_ini(dir: &tempfile::TempDir, ini: &str) -> App {
    let settings = settings_from_ini(dir, ini);
    let session = settings.session_config().unwrap();
    App::new(SessionClock::new(session), settings)
}

/// Drain requests like the UI loop does, publishing a snapshot each pass.
/// Returns the final snapshot once every request sender is gone.
fn spawn_ui_loop(
    settings: Settings,
    events: Arc<Mutex<Vec<ClockEvent>>>,
    mut requests: mpsc::Receiver<ControlRequest>,
    snapshots: watch::Sender<SessionSnapshot>,
) -> std::thread::JoinHandle<SessionSnapshot> {
    std::thread::spawn(move || {
        let session = settings.session_config().unwrap();
        let mut app = App::new(SessionClock::new(session), settings);
        app.add_listener(Box::new(move |event: &ClockEvent| {
            events.lock().unwrap().push(event.clone())
        }));

        while let Some(request) = requests.blocking_recv() {
            let snapshot = app.apply(request.command);
            snapshots.send_replace(snapshot.clone());
            request.respond(snapshot);
        }
        app.snapshot()
    })
}

async fn send(path: &std::path::Path, command: Command) -> SessionSnapshot {
    let stream = UnixStream::connect(path).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    write_message(&mut writer, &command).await.unwrap();
    match read_message(&mut BufReader::new(reader)).await.unwrap() {
        Response::Ok(snapshot) => snapshot,
        Response::Error(e) => panic!("server error: {e}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tempoctl_style_client_drives_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_from_ini(
        &dir,
        "[general]\nwork = 10\nshort-break = 2\nlong-break = 7\nbefore-long = 2\n",
    );
    let initial = SessionClock::new(settings.session_config().unwrap()).snapshot();
    let events = Arc::new(Mutex::new(Vec::new()));

    let socket = dir.path().join("tempo.sock");
    let (listener, _guard) = server::bind(&socket).unwrap();
    let (snapshot_tx, snapshot_rx) = watch::channel(initial);
    let (request_tx, request_rx) = mpsc::channel(4);
    let server_task = tokio::spawn(server::serve(
        listener,
        ControlHandle::new(request_tx, snapshot_rx),
    ));
    let ui = spawn_ui_loop(settings, Arc::clone(&events), request_rx, snapshot_tx);

    let status = send(&socket, Command::Status).await;
    assert_eq!(status.phase, Phase::Work);
    assert_eq!(status.remaining(), Duration::from_secs(600));
    assert!(!status.running);

    assert!(send(&socket, Command::Start).await.running);
    assert_eq!(send(&socket, Command::Skip).await.phase, Phase::ShortBreak);
    assert_eq!(send(&socket, Command::Skip).await.phase, Phase::Work);
    let long = send(&socket, Command::Skip).await;
    assert_eq!(long.phase, Phase::LongBreak);
    assert_eq!(long.cycles_completed, 2);
    assert_eq!(long.remaining(), Duration::from_secs(7 * 60));

    // Status comes from the published snapshot, not the loop.
    assert_eq!(send(&socket, Command::Status).await, long);

    let reset = send(&socket, Command::Reset).await;
    assert_eq!(reset.phase, Phase::Work);
    assert_eq!(reset.cycles_completed, 0);
    assert!(!reset.running);

    server_task.abort();
    let _ = server_task.await;
    let last = tokio::task::spawn_blocking(move || ui.join().unwrap())
        .await
        .unwrap();
    assert_eq!(last, reset);

    let phase_changes = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.is_phase_change())
        .count();
    assert_eq!(phase_changes, 3);
}

#[test]
fn pause_between_phases_from_config_stops_at_each_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_from_ini(
        &dir,
        "[general]\nwork = 1\nshort-break = 1\nlong-break = 1\nbefore-long = 3\n\
         pause-between-phases = true\n",
    );

    app.apply(Command::Start);
    app.tick(Duration::from_secs(60));
    let snapshot = app.snapshot();
    assert_eq!(snapshot.phase, Phase::ShortBreak);
    assert!(!snapshot.running);

    app.tick(Duration::from_secs(60));
    assert_eq!(app.snapshot().remaining(), Duration::from_secs(60));
}
