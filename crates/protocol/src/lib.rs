//! Wire types for the device bridge HTTP API.
//!
//! The bridge is a local HTTP service that mediates access to attached
//! hardware devices. Every operation is a `POST`; bodies are either JSON
//! documents or hex-encoded message frames.
//!
//! # Main Types
//!
//! - [`Endpoint`] - Typed bridge routes and their path segments
//! - [`DeviceEntry`] - One device as reported by `/enumerate` and `/listen`
//! - [`SessionInfo`] - Acquisition result carrying the session token
//! - [`Message`] - A device message frame with its hex transport encoding

pub mod endpoint;
pub mod message;
pub mod types;

pub use endpoint::{CallMode, Endpoint};
pub use message::{FrameError, Message};
pub use types::{BridgeError, BridgeInfo, DeviceEntry, SessionInfo};

/// Default address the bridge listens on.
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:21325";

/// Origin sent with every request unless configured otherwise.
///
/// The bridge rejects requests whose `Origin` header is not on its allow list.
pub const DEFAULT_ORIGIN: &str = "https://test.trezor.io";

/// Bridge major version this crate speaks.
pub const SUPPORTED_MAJOR_VERSION: &str = "2";
