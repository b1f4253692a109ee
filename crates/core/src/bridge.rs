//! The bridge operations the session layer is built on.

use async_trait::async_trait;
use devbridge_protocol::{DeviceEntry, Message};

use crate::error::Result;

/// Raw, stateless access to a device bridge.
///
/// [`BridgeClient`](crate::BridgeClient) implements this over HTTP. The
/// session layer and the poller only depend on this trait, so tests can
/// substitute an in-memory bridge.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
	/// Lists connected devices in bridge order.
	async fn enumerate(&self) -> Result<Vec<DeviceEntry>>;

	/// Takes the device at `path`, returning the new session token.
	///
	/// `previous` must name the session the bridge currently associates with
	/// the device, or be `None` when the device is free.
	async fn acquire(&self, path: &str, previous: Option<&str>) -> Result<String>;

	/// Writes `message` under `session` and reads the device's reply.
	async fn call(&self, session: &str, message: &Message) -> Result<Message>;

	/// Ends `session`, making the device acquirable again.
	async fn release(&self, session: &str) -> Result<()>;

	/// Whether sessions are taken on the debug link.
	fn debug_link(&self) -> bool {
		false
	}
}
