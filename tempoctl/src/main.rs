use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempo_core::{Phase, SessionSnapshot};
use tempo_ipc::{read_message, socket_path, write_message, Command, IpcError, Response};
use tokio::io::BufReader;
use tokio::net::UnixStream;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "TEMPO_LOG";

#[derive(Parser)]
#[command(name = "tempoctl", version)]
#[command(about = "Control a running tempo timer", long_about = None)]
struct Cli {
    /// Print the resulting session state as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Control socket of the running tempo
    #[arg(long, env = tempo_ipc::SOCKET_ENV, global = true)]
    socket: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the timer
    Start,
    /// Pause the timer
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// End the current phase and move to the next one
    Skip,
    /// Back to the first work phase, paused
    Reset,
    /// Get timer status
    Status,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Start => Command::Start,
            Commands::Pause => Command::Pause,
            Commands::Toggle => Command::Toggle,
            Commands::Skip => Command::Skip,
            Commands::Reset => Command::Reset,
            Commands::Status => Command::Status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let path = cli.socket.unwrap_or_else(socket_path);
    let response = send_command(&path, cli.command.into()).await?;

    match response {
        Response::Ok(snapshot) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", describe(&snapshot));
            }
        }
        Response::Error(e) => anyhow::bail!("tempo refused the command: {}", e),
    }

    Ok(())
}

/// `$TEMPO_LOG` wins over the `-v` count.
fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    })
}

async fn send_command(path: &Path, cmd: Command) -> Result<Response, IpcError> {
    debug!(?cmd, socket = %path.display(), "sending command");
    let stream = UnixStream::connect(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::ConnectionRefused => {
            IpcError::ConnectionRefused(path.to_path_buf())
        }
        _ => IpcError::Io(e),
    })?;
    let (reader, mut writer) = stream.into_split();

    write_message(&mut writer, &cmd).await?;
    read_message(&mut BufReader::new(reader)).await
}

/// One-line human summary of a session snapshot.
fn describe(snapshot: &SessionSnapshot) -> String {
    let state = if snapshot.running { "running" } else { "paused" };
    let next = match snapshot.phase {
        Phase::LongBreak => "long break now".to_string(),
        _ => format!(
            "long break after {} more",
            snapshot.work_sessions_until_long_break()
        ),
    };
    format!(
        "{}  {} left  [{}]  rounds {}/{}, {}",
        snapshot.phase,
        snapshot.remaining_clock(),
        state,
        snapshot.cycles_completed,
        snapshot.cycles_before_long_break,
        next
    )
}
