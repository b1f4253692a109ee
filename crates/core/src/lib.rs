//! Session client for a local device bridge.
//!
//! The bridge is an HTTP service that hands out exclusive sessions on
//! attached hardware devices. This crate provides:
//!
//! - [`BridgeClient`] - typed, stateless access to every bridge route
//! - [`SessionClient`] - per-device `Unacquired -> Acquired -> Unacquired`
//!   tracking on top of any [`DeviceBridge`]
//! - [`Poller`] - the enumerate / acquire / call / release loop with an
//!   injectable stop signal
//!
//! # Example
//!
//! ```ignore
//! use devbridge::{BridgeClient, BridgeConfig, Poller, PollConfig};
//!
//! let (client, info) = BridgeClient::connect(BridgeConfig::default()).await?;
//! let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//! let summary = Poller::new(client, PollConfig::default())?.run(stop_rx).await?;
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod session;

pub use bridge::DeviceBridge;
pub use client::{BridgeClient, Reply};
pub use config::BridgeConfig;
pub use devbridge_protocol as protocol;
pub use devbridge_protocol::{BridgeInfo, CallMode, DeviceEntry, Message};
pub use error::{Error, Result, TransportError};
pub use poller::{CycleReport, FailurePolicy, Failure, PollConfig, Poller, RunSummary, Stage};
pub use session::{DeviceState, Session, SessionClient};
