//! Actor-based runtime around the controllers
//!
//! Each actor runs as an independent tokio task and is driven through a
//! cloneable handle.
//!
//! ```text
//!   events endpoint ──Mention──▶ ControllerActor (one per channel)
//!                                      │ owns
//!                                      ▼
//!                                  Controller ──start/cancel──▶ MonitorActor
//!                                                                  │ tick
//!                                                                  ▼
//!                                                   Aggregator → ReportingChannel
//! ```
//!
//! ## Actor Types
//!
//! - **ControllerActor**: serializes mentions for one channel
//! - **MonitorActor**: the recurring tick loop of one aggregator, owned by
//!   its [`monitor::MonitorHandle`]

pub mod controller;
pub mod messages;
pub mod monitor;
