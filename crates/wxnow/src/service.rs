//! The wxnow service: one status file rewrite per observation.

use anyhow::Context;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveSource, SqliteArchive};
use crate::observation::{Observation, ObservationEvent};
use crate::plugin::{Dispatch, HostInfo, ServiceError, ServiceMetadata, WeatherService};
use crate::status::{render, DerivedStatus};

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WxNowConfig {
    /// Status file to overwrite on every event.
    pub filename: PathBuf,
    /// `loop` to follow every sensor sample; anything else follows
    /// archive records.
    pub binding: String,
    /// Archive database used for rain sums.
    pub database: PathBuf,
    /// Archive table name.
    pub table: String,
    /// Write to a temporary file and rename it over `filename`.
    pub atomic_write: bool,
}

impl Default for WxNowConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from("/var/tmp/wxnow.txt"),
            binding: "loop".to_string(),
            database: PathBuf::from("/var/lib/weewx/weewx.sdb"),
            table: "archive".to_string(),
            atomic_write: true,
        }
    }
}

/// Which host event drives the status file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Loop,
    Archive,
}

impl Binding {
    /// `loop` in any case selects [`Binding::Loop`]; any other value
    /// selects [`Binding::Archive`].
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("loop") {
            Binding::Loop
        } else {
            Binding::Archive
        }
    }

    pub fn accepts(self, event: &ObservationEvent) -> bool {
        matches!(
            (self, event),
            (Binding::Loop, ObservationEvent::LoopPacket(_))
                | (Binding::Archive, ObservationEvent::ArchiveRecord(_))
        )
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Loop => f.write_str("loop"),
            Binding::Archive => f.write_str("archive"),
        }
    }
}

/// Writes the Cumulus `wxnow.txt` status file for each bound event.
pub struct WxNow<A, Tz = Local> {
    filename: PathBuf,
    binding: Binding,
    atomic_write: bool,
    archive: A,
    tz: Tz,
}

/// The service as the runner starts it: SQLite archive, local time.
pub type WxNowService = WxNow<SqliteArchive, Local>;

impl<A, Tz> WxNow<A, Tz>
where
    A: ArchiveSource,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// Build the service around an already-open archive.
    pub fn with_archive(config: &WxNowConfig, archive: A, tz: Tz) -> Self {
        let binding = Binding::parse(&config.binding);
        log::info!("binding is {}", binding);
        log::info!("output goes to {}", config.filename.display());
        Self {
            filename: config.filename.clone(),
            binding,
            atomic_write: config.atomic_write,
            archive,
            tz,
        }
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Dispatch one host event, ignoring kinds outside the binding.
    pub fn handle_event(&self, event: &ObservationEvent) -> Dispatch {
        if !self.binding.accepts(event) {
            return Dispatch::Ignored;
        }
        self.handle_data(event.observation())
    }

    /// Rewrite the status file for `obs`.
    ///
    /// Failures are logged with their full cause chain and swallowed so
    /// the host keeps running; the next observation gets a fresh attempt.
    pub fn handle_data(&self, obs: &Observation) -> Dispatch {
        match self.process(obs) {
            Ok(_) => Dispatch::Written,
            Err(e) => {
                log::error!("**** {:#}", e);
                Dispatch::Failed
            }
        }
    }

    /// Derive, render and write the status for `obs`, returning the text.
    pub fn process(&self, obs: &Observation) -> anyhow::Result<String> {
        let status = DerivedStatus::calculate(obs, &self.archive, &self.tz)
            .with_context(|| format!("Failed to derive status at {}", obs.date_time()))?;
        let text = render(&status, &self.tz)?;
        self.write_data(&text)?;
        log::debug!("Wrote {}: {}", self.filename.display(), status.body());
        Ok(text)
    }

    fn write_data(&self, text: &str) -> anyhow::Result<()> {
        if !self.atomic_write {
            return fs::write(&self.filename, text)
                .with_context(|| format!("Failed to write {}", self.filename.display()));
        }

        let mut tmp_name = self.filename.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, text)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        if let Err(e) = fs::rename(&tmp_path, &self.filename) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    tmp_path.display(),
                    self.filename.display()
                )
            });
        }
        Ok(())
    }
}

impl WeatherService for WxNowService {
    type Config = WxNowConfig;

    fn metadata() -> ServiceMetadata {
        crate::service_metadata!(events: &["loop", "archive"])
    }

    fn new(host: &HostInfo, config: WxNowConfig) -> Result<Self, ServiceError> {
        host.check_version()?;
        log::info!("service version is {}", env!("CARGO_PKG_VERSION"));
        let archive = SqliteArchive::open(&config.database, &config.table)?;
        log::info!(
            "rain sums from {} (table {})",
            config.database.display(),
            archive.table()
        );
        Ok(Self::with_archive(&config, archive, Local))
    }

    fn on_observation(&mut self, event: &ObservationEvent) -> Dispatch {
        self.handle_event(event)
    }
}
