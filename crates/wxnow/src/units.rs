//! Unit systems and conversion tables.
//!
//! Observations arrive tagged with the station's unit system (`usUnits`).
//! Each observation type belongs to a unit group, and each unit system
//! names one standard unit per group. Converting a value therefore means
//! looking up its standard unit in the source system and applying the
//! direct conversion to the requested target unit.
//!
//! Conversion factors are applied pairwise (no intermediate base unit) so
//! that truncated output matches what the weather host itself produces.

use std::fmt;

/// Errors raised while resolving or converting units.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown unit system tag: {0:#04x}")]
    UnknownSystem(u32),
    #[error("No unit group known for observation type '{0}'")]
    UnknownObservation(String),
    #[error("Cannot convert {from} to {to}: different unit groups")]
    GroupMismatch { from: Unit, to: Unit },
}

/// Unit system tag carried by every observation as `usUnits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSystem {
    /// US customary units (tag `0x01`).
    Us,
    /// Metric units with km/h and cm (tag `0x10`).
    Metric,
    /// Metric units with m/s and mm (tag `0x11`).
    MetricWx,
}

impl UnitSystem {
    /// Numeric tag as it appears in packets.
    pub const fn tag(self) -> u32 {
        match self {
            UnitSystem::Us => 0x01,
            UnitSystem::Metric => 0x10,
            UnitSystem::MetricWx => 0x11,
        }
    }

    pub fn from_tag(tag: u32) -> Result<Self, UnitError> {
        match tag {
            0x01 => Ok(UnitSystem::Us),
            0x10 => Ok(UnitSystem::Metric),
            0x11 => Ok(UnitSystem::MetricWx),
            other => Err(UnitError::UnknownSystem(other)),
        }
    }

    /// Standard unit this system uses for a unit group.
    pub const fn standard_unit(self, group: UnitGroup) -> Unit {
        match (self, group) {
            (UnitSystem::Us, UnitGroup::Speed) => Unit::MilePerHour,
            (UnitSystem::Metric, UnitGroup::Speed) => Unit::KmPerHour,
            (UnitSystem::MetricWx, UnitGroup::Speed) => Unit::MeterPerSecond,
            (UnitSystem::Us, UnitGroup::Temperature) => Unit::DegreeF,
            (_, UnitGroup::Temperature) => Unit::DegreeC,
            (UnitSystem::Us, UnitGroup::Rain) => Unit::Inch,
            (UnitSystem::Metric, UnitGroup::Rain) => Unit::Cm,
            (UnitSystem::MetricWx, UnitGroup::Rain) => Unit::Mm,
            (UnitSystem::Us, UnitGroup::Pressure) => Unit::InHg,
            (_, UnitGroup::Pressure) => Unit::Mbar,
        }
    }
}

impl TryFrom<u32> for UnitSystem {
    type Error = UnitError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        Self::from_tag(tag)
    }
}

/// Physical quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitGroup {
    Speed,
    Temperature,
    Rain,
    Pressure,
}

impl UnitGroup {
    /// Unit group of a named observation type.
    pub fn of(obs_type: &str) -> Result<Self, UnitError> {
        match obs_type {
            "windSpeed" | "windGust" | "windSpeed10" | "windgustspeed" => Ok(UnitGroup::Speed),
            "outTemp" | "inTemp" | "dewpoint" | "windchill" | "heatindex" => {
                Ok(UnitGroup::Temperature)
            }
            "rain" | "hourRain" | "rain24" | "dayRain" => Ok(UnitGroup::Rain),
            "barometer" | "pressure" | "altimeter" => Ok(UnitGroup::Pressure),
            other => Err(UnitError::UnknownObservation(other.to_string())),
        }
    }
}

/// Units known to the conversion tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    MilePerHour,
    KmPerHour,
    MeterPerSecond,
    Knot,
    DegreeF,
    DegreeC,
    Inch,
    Cm,
    Mm,
    InHg,
    Mbar,
    HPa,
    KPa,
    MmHg,
}

impl Unit {
    pub const fn group(self) -> UnitGroup {
        match self {
            Unit::MilePerHour | Unit::KmPerHour | Unit::MeterPerSecond | Unit::Knot => {
                UnitGroup::Speed
            }
            Unit::DegreeF | Unit::DegreeC => UnitGroup::Temperature,
            Unit::Inch | Unit::Cm | Unit::Mm => UnitGroup::Rain,
            Unit::InHg | Unit::Mbar | Unit::HPa | Unit::KPa | Unit::MmHg => UnitGroup::Pressure,
        }
    }

    /// Host name of the unit, e.g. `mile_per_hour`.
    pub const fn name(self) -> &'static str {
        match self {
            Unit::MilePerHour => "mile_per_hour",
            Unit::KmPerHour => "km_per_hour",
            Unit::MeterPerSecond => "meter_per_second",
            Unit::Knot => "knot",
            Unit::DegreeF => "degree_F",
            Unit::DegreeC => "degree_C",
            Unit::Inch => "inch",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::InHg => "inHg",
            Unit::Mbar => "mbar",
            Unit::HPa => "hPa",
            Unit::KPa => "kPa",
            Unit::MmHg => "mmHg",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert `value` of observation type `obs_type`, expressed in the
/// standard units of `from`, into `to`.
///
/// Zero stays zero for every unit except temperature, where the
/// conversion is affine.
pub fn convert(value: f64, obs_type: &str, from: UnitSystem, to: Unit) -> Result<f64, UnitError> {
    let group = UnitGroup::of(obs_type)?;
    convert_unit(value, from.standard_unit(group), to)
}

/// Convert a value between two units of the same group.
pub fn convert_unit(value: f64, from: Unit, to: Unit) -> Result<f64, UnitError> {
    use Unit::*;

    if from.group() != to.group() {
        return Err(UnitError::GroupMismatch { from, to });
    }
    if from == to {
        return Ok(value);
    }

    let x = value;
    let converted = match (from, to) {
        (MilePerHour, KmPerHour) => x * 1.609344,
        (MilePerHour, Knot) => x * 0.868976242,
        (MilePerHour, MeterPerSecond) => x * 0.44704,
        (KmPerHour, MilePerHour) => x * 0.621371192,
        (KmPerHour, Knot) => x * 0.539956803,
        (KmPerHour, MeterPerSecond) => x * 0.277777778,
        (MeterPerSecond, MilePerHour) => x * 2.23693629,
        (MeterPerSecond, Knot) => x * 1.94384449,
        (MeterPerSecond, KmPerHour) => x * 3.6,
        (Knot, MilePerHour) => x * 1.15077945,
        (Knot, KmPerHour) => x * 1.852,
        (Knot, MeterPerSecond) => x * 0.514444444,

        (DegreeF, DegreeC) => (x - 32.0) * 5.0 / 9.0,
        (DegreeC, DegreeF) => x * 9.0 / 5.0 + 32.0,

        (Inch, Cm) => x * 2.54,
        (Inch, Mm) => x * 25.4,
        (Cm, Inch) => x * 0.393700787,
        (Cm, Mm) => x * 10.0,
        (Mm, Inch) => x * 0.0393700787,
        (Mm, Cm) => x * 0.10,

        (InHg, Mbar) | (InHg, HPa) => x * 33.86389,
        (InHg, KPa) => x * 3.386389,
        (InHg, MmHg) => x * 25.4,
        (MmHg, InHg) => x / 25.4,
        (MmHg, Mbar) | (MmHg, HPa) => x / 0.75006168,
        (MmHg, KPa) => x / 7.5006168,
        (Mbar, InHg) | (HPa, InHg) => x / 33.86389,
        (Mbar, MmHg) | (HPa, MmHg) => x * 0.75006168,
        (Mbar, HPa) | (HPa, Mbar) => x * 1.0,
        (Mbar, KPa) | (HPa, KPa) => x / 10.0,
        (KPa, InHg) => x / 3.386389,
        (KPa, MmHg) => x * 7.5006168,
        (KPa, Mbar) | (KPa, HPa) => x * 10.0,

        // Same-group pairs are exhausted above.
        _ => return Err(UnitError::GroupMismatch { from, to }),
    };
    Ok(converted)
}
