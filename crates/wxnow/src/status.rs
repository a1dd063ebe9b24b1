//! Derived conditions and the fixed-width status line.
//!
//! The status file has two lines: the observation time as local
//! `Mon DD YYYY HH:MM`, then nine fields concatenated without separators:
//!
//! ```text
//! 270/005g008t068r000p000P000h055b10130
//! ^   ^   ^   ^   ^   ^   ^   ^   ^
//! dir spd gst tmp hr  24h day hum baro
//! ```
//!
//! Speeds are mph, temperature °F, rain hundredths of an inch, humidity
//! percent and pressure tenths of a millibar. Every value is truncated
//! toward zero, never rounded.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::archive::{ArchiveError, ArchiveSource};
use crate::observation::Observation;
use crate::rain::{rain_total, RainWindow};
use crate::units::{convert, Unit, UnitError};

pub const SPEED_UNIT: Unit = Unit::MilePerHour;
pub const TEMPERATURE_UNIT: Unit = Unit::DegreeF;
pub const RAIN_UNIT: Unit = Unit::Inch;
pub const PRESSURE_UNIT: Unit = Unit::Mbar;

/// Header timestamp format.
const HEADER_FORMAT: &str = "%b %d %Y %H:%M";

/// Errors while deriving or rendering a status.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Unit conversion failed: {0}")]
    Units(#[from] UnitError),
    #[error("Archive query failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Timestamp {0} cannot be rendered")]
    InvalidTimestamp(i64),
}

/// Conditions ready for rendering, already in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStatus {
    pub date_time: i64,
    /// Degrees, unconverted.
    pub wind_dir: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub out_temp: f64,
    pub hour_rain: f64,
    pub rain_24h: f64,
    pub day_rain: f64,
    /// Percent in `[0, 100)`.
    pub out_humidity: f64,
    pub barometer: f64,
}

impl DerivedStatus {
    /// Derive the status for one observation.
    ///
    /// Missing or null fields count as zero. Rain windows the observation
    /// does not carry are summed from `archive`, with day boundaries taken
    /// in `tz`.
    pub fn calculate<A, Tz>(obs: &Observation, archive: &A, tz: &Tz) -> Result<Self, StatusError>
    where
        A: ArchiveSource + ?Sized,
        Tz: TimeZone,
    {
        let units = obs.us_units();
        let converted = |name: &str, value: f64, to: Unit| convert(value, name, units, to);

        let hour_rain = rain_total(obs, archive, RainWindow::Hour, tz)?;
        let rain_24h = rain_total(obs, archive, RainWindow::Day24, tz)?;
        let day_rain = rain_total(obs, archive, RainWindow::Day, tz)?;

        Ok(Self {
            date_time: obs.date_time(),
            wind_dir: obs.nullproof("windDir"),
            wind_speed: converted("windSpeed", obs.nullproof("windSpeed"), SPEED_UNIT)?,
            wind_gust: converted("windGust", obs.nullproof("windGust"), SPEED_UNIT)?,
            out_temp: converted("outTemp", obs.nullproof("outTemp"), TEMPERATURE_UNIT)?,
            hour_rain: converted("rain", hour_rain, RAIN_UNIT)?,
            rain_24h: converted("rain", rain_24h, RAIN_UNIT)?,
            day_rain: converted("rain", day_rain, RAIN_UNIT)?,
            out_humidity: clamp_humidity(obs.nullproof("outHumidity")),
            barometer: converted("barometer", obs.nullproof("barometer"), PRESSURE_UNIT)?,
        })
    }

    /// The nine-field status body, without a trailing newline.
    pub fn body(&self) -> String {
        format!(
            "{:03}/{:03}g{:03}t{:03}r{:03}p{:03}P{:03}h{:03}b{:05}",
            truncate(self.wind_dir),
            truncate(self.wind_speed),
            truncate(self.wind_gust),
            truncate(self.out_temp),
            truncate(self.hour_rain * 100.0),
            truncate(self.rain_24h * 100.0),
            truncate(self.day_rain * 100.0),
            truncate(clamp_humidity(self.out_humidity)),
            truncate(self.barometer * 10.0),
        )
    }
}

/// Humidity outside `[0, 100)` is reported as zero.
pub fn clamp_humidity(value: f64) -> f64 {
    if (0.0..100.0).contains(&value) {
        value
    } else {
        0.0
    }
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Header line for `date_time`, including its newline.
pub fn render_header<Tz>(date_time: i64, tz: &Tz) -> Result<String, StatusError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = DateTime::from_timestamp(date_time, 0)
        .ok_or(StatusError::InvalidTimestamp(date_time))?
        .with_timezone(tz);
    Ok(format!("{}\n", local.format(HEADER_FORMAT)))
}

/// Full status file contents: header, body and trailing newline.
pub fn render<Tz>(status: &DerivedStatus, tz: &Tz) -> Result<String, StatusError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut text = render_header(status.date_time, tz)?;
    text.push_str(&status.body());
    text.push('\n');
    Ok(text)
}
