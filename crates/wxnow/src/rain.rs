//! Rain accumulation windows.
//!
//! Each window sums the archive's `rain` column over an open-closed span
//! ending at the observation time. An observation that already carries
//! the accumulated value under the window's key overrides the archive.

use chrono::{DateTime, TimeDelta, TimeZone};

use crate::archive::{ArchiveError, ArchiveSource, TimeSpan};
use crate::observation::Observation;

/// Archive column holding per-interval rainfall.
pub const RAIN: &str = "rain";

const HOUR: i64 = 3600;
const DAY: i64 = 86400;

/// Accumulation windows reported in the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainWindow {
    /// The past hour.
    Hour,
    /// The past 24 hours.
    Day24,
    /// Since local midnight.
    Day,
}

impl RainWindow {
    /// Observation key that overrides the archive sum.
    pub const fn key(self) -> &'static str {
        match self {
            RainWindow::Hour => "hourRain",
            RainWindow::Day24 => "rain24",
            RainWindow::Day => "dayRain",
        }
    }

    /// Span covered by the window when it ends at `ts`.
    pub fn span<Tz: TimeZone>(self, ts: i64, tz: &Tz) -> Result<TimeSpan, ArchiveError> {
        match self {
            RainWindow::Hour => back_from(ts, HOUR),
            RainWindow::Day24 => back_from(ts, DAY),
            RainWindow::Day => {
                let start = start_of_day(ts, tz).ok_or(ArchiveError::InvalidTimestamp(ts))?;
                Ok(TimeSpan::new(start, ts))
            }
        }
    }
}

fn back_from(ts: i64, seconds: i64) -> Result<TimeSpan, ArchiveError> {
    let start = ts
        .checked_sub(seconds)
        .ok_or(ArchiveError::InvalidTimestamp(ts))?;
    Ok(TimeSpan::new(start, ts))
}

/// Epoch seconds of local midnight on the day containing `ts`.
///
/// When a DST transition skips midnight, the first local time that does
/// exist on that day is used instead.
pub fn start_of_day<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<i64> {
    let local = DateTime::from_timestamp(ts, 0)?.with_timezone(tz);
    let mut midnight = local.date_naive().and_hms_opt(0, 0, 0)?;
    let end = midnight + TimeDelta::days(1);
    while midnight < end {
        if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
            return Some(start.timestamp());
        }
        midnight += TimeDelta::minutes(15);
    }
    None
}

/// Rain accumulated over `window` ending at the observation time, in the
/// observation's own units.
///
/// An empty archive span counts as zero.
pub fn rain_total<A, Tz>(
    obs: &Observation,
    archive: &A,
    window: RainWindow,
    tz: &Tz,
) -> Result<f64, ArchiveError>
where
    A: ArchiveSource + ?Sized,
    Tz: TimeZone,
{
    if obs.contains(window.key()) {
        return Ok(obs.nullproof(window.key()));
    }
    let span = window.span(obs.date_time(), tz)?;
    let total = archive.sum(RAIN, span)?.unwrap_or(0.0);
    log::trace!(
        "{} over ({}, {}] from archive: {}",
        window.key(),
        span.start,
        span.stop,
        total
    );
    Ok(total)
}
