//! wxnow service SDK
//!
//! The host engine drives a service by calling
//! [`WeatherService::on_observation`] once per loop packet or archive
//! record, on a single thread. This module holds that contract, the
//! configuration helpers, and a runner that plays the host for a
//! standalone process fed through stdin.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use wxnow::plugin::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     run_service::<WxNowService>()
//! }
//! ```

mod config;
mod error;
mod runner;
mod traits;

pub use config::{load_config, load_config_or_default, parse_config};
pub use error::ServiceError;
pub use runner::{
    dispatch_events, run_service, setup_logging, DispatchSummary, ServiceArgs,
    DEFAULT_HOST_VERSION,
};
pub use traits::{Dispatch, HostInfo, ServiceMetadata, WeatherService, MIN_HOST_MAJOR};
