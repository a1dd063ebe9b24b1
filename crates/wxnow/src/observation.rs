//! Observations delivered by the weather host.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::units::{UnitError, UnitSystem};

/// Errors raised while reading a host packet.
#[derive(Debug, thiserror::Error)]
pub enum ObservationError {
    #[error("Packet has no dateTime")]
    MissingTimestamp,
    #[error("Packet has no usUnits")]
    MissingUnitSystem,
    #[error(transparent)]
    Units(#[from] UnitError),
}

/// One loop packet or archive record: a timestamp, the unit system its
/// values are expressed in, and a map of observation name to value.
///
/// A name that is present with a `None` value is distinct from a name
/// that is absent altogether; see [`Observation::contains`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPacket")]
pub struct Observation {
    date_time: i64,
    us_units: UnitSystem,
    values: BTreeMap<String, Option<f64>>,
}

/// Wire shape of a packet: `dateTime` and `usUnits` plus any number of
/// numeric-or-null observation fields.
#[derive(Debug, Deserialize)]
struct RawPacket {
    #[serde(rename = "dateTime")]
    date_time: Option<i64>,
    #[serde(rename = "usUnits")]
    us_units: Option<u32>,
    #[serde(flatten)]
    values: BTreeMap<String, Option<f64>>,
}

impl TryFrom<RawPacket> for Observation {
    type Error = ObservationError;

    fn try_from(raw: RawPacket) -> Result<Self, Self::Error> {
        let date_time = raw.date_time.ok_or(ObservationError::MissingTimestamp)?;
        let tag = raw.us_units.ok_or(ObservationError::MissingUnitSystem)?;
        Ok(Self {
            date_time,
            us_units: UnitSystem::from_tag(tag)?,
            values: raw.values,
        })
    }
}

impl Observation {
    pub fn new(date_time: i64, us_units: UnitSystem) -> Self {
        Self {
            date_time,
            us_units,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter; `None` records the field as present but null.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Epoch seconds of the observation.
    pub fn date_time(&self) -> i64 {
        self.date_time
    }

    pub fn us_units(&self) -> UnitSystem {
        self.us_units
    }

    /// Whether the packet carries `name` at all, even as null.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Value of `name`; absent and null both yield `None`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }

    /// Value of `name`, or `0.0` when absent or null.
    pub fn nullproof(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }
}

/// An observation event as the host emits it.
///
/// On the wire this is `{"event": "loop", "data": {...}}` or
/// `{"event": "archive", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ObservationEvent {
    /// A raw sensor sample.
    #[serde(rename = "loop")]
    LoopPacket(Observation),
    /// A record closing an archive interval.
    #[serde(rename = "archive")]
    ArchiveRecord(Observation),
}

impl ObservationEvent {
    pub fn observation(&self) -> &Observation {
        match self {
            ObservationEvent::LoopPacket(obs) | ObservationEvent::ArchiveRecord(obs) => obs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_packet_with_nulls() {
        let obs: Observation = serde_json::from_str(
            r#"{"dateTime": 1700000000, "usUnits": 1, "outTemp": 55.2, "windDir": null}"#,
        )
        .unwrap();

        assert_eq!(obs.date_time(), 1_700_000_000);
        assert_eq!(obs.us_units(), UnitSystem::Us);
        assert_eq!(obs.get("outTemp"), Some(55.2));
        assert!(obs.contains("windDir"));
        assert_eq!(obs.get("windDir"), None);
        assert!(!obs.contains("windGust"));
        assert!(!obs.contains("dateTime"));
    }

    #[test]
    fn integer_values_are_accepted() {
        let obs: Observation =
            serde_json::from_str(r#"{"dateTime": 1, "usUnits": 16, "outHumidity": 55}"#).unwrap();
        assert_eq!(obs.get("outHumidity"), Some(55.0));
        assert_eq!(obs.us_units(), UnitSystem::Metric);
    }

    #[test]
    fn missing_timestamp_is_an_error() {
        let err = serde_json::from_str::<Observation>(r#"{"usUnits": 1, "outTemp": 55.2}"#)
            .unwrap_err();
        assert!(err.to_string().contains("dateTime"));
    }

    #[test]
    fn unknown_unit_system_is_an_error() {
        let err = serde_json::from_str::<Observation>(r#"{"dateTime": 1, "usUnits": 99}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unit system"));
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        assert!(serde_json::from_str::<Observation>(
            r#"{"dateTime": 1, "usUnits": 1, "outTemp": "warm"}"#
        )
        .is_err());
    }

    #[test]
    fn nullproof_substitutes_zero() {
        let obs = Observation::new(0, UnitSystem::Us)
            .with("windSpeed", 4.5)
            .with("windGust", None::<f64>);

        assert_eq!(obs.nullproof("windSpeed"), 4.5);
        assert_eq!(obs.nullproof("windGust"), 0.0);
        assert_eq!(obs.nullproof("barometer"), 0.0);
    }

    #[test]
    fn parse_events() {
        let event: ObservationEvent = serde_json::from_str(
            r#"{"event": "archive", "data": {"dateTime": 60, "usUnits": 17, "rain": 0.2}}"#,
        )
        .unwrap();

        match &event {
            ObservationEvent::ArchiveRecord(obs) => {
                assert_eq!(obs.us_units(), UnitSystem::MetricWx)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(event.observation().get("rain"), Some(0.2));

        let event: ObservationEvent =
            serde_json::from_str(r#"{"event": "loop", "data": {"dateTime": 60, "usUnits": 1}}"#)
                .unwrap();
        assert!(matches!(event, ObservationEvent::LoopPacket(_)));
    }

    #[test]
    fn unknown_event_kind_is_rejected() {
        assert!(serde_json::from_str::<ObservationEvent>(
            r#"{"event": "forecast", "data": {"dateTime": 60, "usUnits": 1}}"#
        )
        .is_err());
    }
}
