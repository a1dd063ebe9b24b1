//! Cumulus `wxnow.txt` writer for weather station hosts.
//!
//! For every loop packet or archive record the host emits, the service
//! derives wind, temperature, rain accumulations, humidity and pressure,
//! converts them to fixed display units, and overwrites a two-line
//! status file read by APRS and other weather display software.

pub mod archive;
pub mod observation;
pub mod plugin;
pub mod rain;
pub mod service;
pub mod status;
pub mod units;

pub use archive::{ArchiveError, ArchiveSource, SqliteArchive, TimeSpan};
pub use observation::{Observation, ObservationEvent};
pub use service::{Binding, WxNow, WxNowConfig, WxNowService};
pub use status::{render, DerivedStatus, StatusError};
pub use units::{Unit, UnitError, UnitSystem};
