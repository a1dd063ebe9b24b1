//! Core trait for services driven by the weather host.

use serde::de::DeserializeOwned;

use super::error::ServiceError;
use crate::observation::ObservationEvent;

/// Oldest host major version that emits the events services expect.
pub const MIN_HOST_MAJOR: u32 = 3;

/// Metadata about a service.
///
/// Use the `service_metadata!` macro to fill name, version and
/// description from Cargo.toml:
/// ```rust,ignore
/// fn metadata() -> ServiceMetadata {
///     service_metadata!(events: &["loop", "archive"])
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ServiceMetadata {
    /// Short name identifier from CARGO_PKG_NAME
    pub name: &'static str,
    /// SemVer version string from CARGO_PKG_VERSION
    pub version: &'static str,
    /// Human-readable description from CARGO_PKG_DESCRIPTION
    pub description: &'static str,
    /// Event kinds the service can bind to
    pub events: &'static [&'static str],
}

/// Macro to generate ServiceMetadata from the Cargo.toml manifest.
#[macro_export]
macro_rules! service_metadata {
    (events: $events:expr $(,)?) => {
        $crate::plugin::ServiceMetadata {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            events: $events,
        }
    };
}

/// Identity of the host engine feeding observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub version: String,
}

impl HostInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Reject hosts older than [`MIN_HOST_MAJOR`].
    pub fn check_version(&self) -> Result<(), ServiceError> {
        let major = self
            .version
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .ok_or_else(|| {
                ServiceError::UnsupportedHost(format!(
                    "cannot parse host version '{}'",
                    self.version
                ))
            })?;
        if major < MIN_HOST_MAJOR {
            return Err(ServiceError::UnsupportedHost(format!(
                "host {} or newer is required, found {}",
                MIN_HOST_MAJOR, self.version
            )));
        }
        Ok(())
    }
}

/// What happened to one observation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The status file was rewritten.
    Written,
    /// The event kind does not match the service's binding.
    Ignored,
    /// Processing failed; the failure was logged and the event dropped.
    Failed,
}

/// A service the host calls once per observation event.
///
/// The host invokes [`on_observation`](WeatherService::on_observation) on a
/// single thread and waits for it to return before dispatching the next
/// event. Implementations must not let a failure escape to the host.
pub trait WeatherService: Sized {
    /// Service configuration, deserialized from YAML.
    type Config: DeserializeOwned + Default;

    /// Return metadata about this service.
    fn metadata() -> ServiceMetadata;

    /// Create the service.
    ///
    /// Errors here are configuration errors: the host should not start.
    fn new(host: &HostInfo, config: Self::Config) -> Result<Self, ServiceError>;

    /// Handle one observation event.
    fn on_observation(&mut self, event: &ObservationEvent) -> Dispatch;
}
