pub mod actors;
pub mod aggregator;
pub mod bootstrap;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod reporter;
pub mod sensors;
pub mod slack;
pub mod util;

#[cfg(feature = "api")]
pub mod api;

pub use aggregator::{Aggregator, AggregatorFactory};
pub use command::Command;
pub use controller::{Controller, MonitorState};
pub use error::{AqiError, AqiResult};
pub use reporter::ReportingChannel;
