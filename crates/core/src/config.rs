//! Connection settings for the bridge client.

use std::time::Duration;

use devbridge_protocol::{DEFAULT_BRIDGE_URL, DEFAULT_ORIGIN};
use serde::{Deserialize, Serialize};

/// Where the bridge lives and how requests are sent to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
	/// Base origin of the bridge, e.g. `http://127.0.0.1:21325`.
	pub url: String,
	/// Value of the `Origin` header; the bridge rejects unknown origins with `403`.
	pub origin: String,
	/// Per-request timeout in milliseconds, `0` disables it.
	///
	/// Never applied to `/listen`, which blocks until the device list changes.
	pub timeout_ms: u64,
	/// Route acquire, release, and message calls through the debug link.
	pub debug_link: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_BRIDGE_URL.to_string(),
			origin: DEFAULT_ORIGIN.to_string(),
			timeout_ms: 30_000,
			debug_link: false,
		}
	}
}

impl BridgeConfig {
	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = origin.into();
		self
	}

	pub fn with_debug_link(mut self, debug_link: bool) -> Self {
		self.debug_link = debug_link;
		self
	}

	pub fn timeout(&self) -> Option<Duration> {
		(self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
	}
}
