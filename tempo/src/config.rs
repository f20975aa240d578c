//! Configuration file loading.
//!
//! Settings come from INI files layered lowest-precedence first:
//! `/etc/tempo/tempo.ini`, the per-user file, then an explicit `--config`
//! path. A later file overrides individual keys of an earlier one.

use anyhow::{Context, Result};
use config::{File, FileFormat};
use directories::ProjectDirs;
use ratatui::style::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempo_core::{ConfigError, Phase, SessionConfig};

pub const SYSTEM_CONFIG: &str = "/etc/tempo/tempo.ini";
const FILE_NAME: &str = "tempo.ini";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub general: General,
    pub display: Display,
    pub notifications: Notifications,
    pub theme: Theme,
}

/// Durations are whole minutes.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct General {
    pub work: i64,
    pub short_break: i64,
    pub long_break: i64,
    pub before_long: i64,
    pub pause_between_phases: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct Display {
    pub show_completed: bool,
    pub show_next_long: bool,
    pub show_digital: bool,
    pub show_analog: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Notifications {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct Theme {
    #[serde(deserialize_with = "parse_color")]
    pub work: Color,
    #[serde(deserialize_with = "parse_color")]
    pub short_break: Color,
    #[serde(deserialize_with = "parse_color")]
    pub long_break: Color,
    #[serde(deserialize_with = "parse_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "parse_color")]
    pub muted: Color,
    #[serde(deserialize_with = "parse_color")]
    pub surface: Color,
    #[serde(deserialize_with = "parse_color")]
    pub paused: Color,
}

impl Default for General {
    fn default() -> Self {
        Self {
            work: 25,
            short_break: 5,
            long_break: 15,
            before_long: 4,
            pause_between_phases: false,
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self {
            show_completed: true,
            show_next_long: true,
            show_digital: true,
            show_analog: true,
        }
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            work: Color::Rgb(228, 104, 118),
            short_break: Color::Rgb(138, 154, 123),
            long_break: Color::Rgb(127, 180, 202),
            foreground: Color::Rgb(197, 201, 199),
            muted: Color::Rgb(164, 167, 164),
            surface: Color::Rgb(13, 12, 12),
            paused: Color::Rgb(196, 178, 138),
        }
    }
}

impl Theme {
    pub fn phase_color(&self, phase: Phase) -> Color {
        match phase {
            Phase::Work => self.work,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }
}

impl Settings {
    /// Validate `[general]` and build the clock configuration.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let g = &self.general;
        Ok(
            SessionConfig::from_minutes(g.work, g.short_break, g.long_break, g.before_long)?
                .with_pause_between_phases(g.pause_between_phases),
        )
    }
}

/// Accepts colour names (`red`, `lightblue`), indices and `#rrggbb`.
fn parse_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    Color::from_str(s.trim())
        .map_err(|_| serde::de::Error::custom(format!("invalid colour `{s}`")))
}

/// The files settings are read from, in precedence order.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub system: PathBuf,
    pub user: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigSources {
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        Self {
            system: PathBuf::from(SYSTEM_CONFIG),
            user: ProjectDirs::from("", "", "tempo")
                .map(|dirs| dirs.config_dir().join(FILE_NAME)),
            explicit,
        }
    }

    /// Files that exist right now, lowest precedence first.
    pub fn existing(&self) -> Vec<&Path> {
        let mut found: Vec<&Path> = [Some(self.system.as_path()), self.user.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| p.is_file())
            .collect();
        if let Some(explicit) = &self.explicit {
            found.push(explicit);
        }
        found
    }
}

pub fn load(sources: &ConfigSources) -> Result<Settings> {
    if let Some(explicit) = &sources.explicit {
        if !explicit.is_file() {
            anyhow::bail!("Config file {:?} does not exist", explicit);
        }
    }
    load_files(&sources.existing())
}

/// Merge `paths` in order; later files win key by key.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Settings> {
    let mut builder = config::Config::builder();
    for path in paths {
        builder = builder.add_source(
            File::from(path.as_ref())
                .format(FileFormat::Ini)
                .required(false),
        );
    }
    builder
        .build()
        .and_then(|c| c.try_deserialize::<Settings>())
        .with_context(|| {
            let names: Vec<_> = paths.iter().map(|p| p.as_ref().display().to_string()).collect();
            format!("Failed to parse config files [{}]", names.join(", "))
        })
}
