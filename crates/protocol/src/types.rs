//! JSON bodies exchanged with the bridge.

use serde::{Deserialize, Serialize};

use crate::SUPPORTED_MAJOR_VERSION;

/// Response of `POST /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeInfo {
	/// Bridge version, e.g. `"2.0.27"`.
	pub version: String,
}

impl BridgeInfo {
	/// Leading component of [`version`](Self::version).
	pub fn major(&self) -> &str {
		self.version.split('.').next().unwrap_or_default()
	}

	pub fn is_supported(&self) -> bool {
		self.major() == SUPPORTED_MAJOR_VERSION
	}
}

/// A connected device as listed by `/enumerate` and `/listen`.
///
/// Only `path` is guaranteed. The path is unique per physical connection:
/// a device that is unplugged and plugged back in gets a new path, while
/// acquire and release leave it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
	pub path: String,
	/// Session currently holding the device, if any.
	#[serde(default)]
	pub session: Option<String>,
	/// Session currently holding the debug link, if any.
	#[serde(default)]
	pub debug_session: Option<String>,
	#[serde(default)]
	pub vendor: Option<u16>,
	#[serde(default)]
	pub product: Option<u16>,
	/// Whether the device exposes a debug link.
	#[serde(default)]
	pub debug: bool,
}

impl DeviceEntry {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			session: None,
			debug_session: None,
			vendor: None,
			product: None,
			debug: false,
		}
	}

	/// Session holding the normal or debug interface, depending on `debug`.
	pub fn holder(&self, debug: bool) -> Option<&str> {
		if debug { self.debug_session.as_deref() } else { self.session.as_deref() }
	}
}

/// Response of `/acquire/{path}/{previous}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
	pub session: String,
}

/// Body of a `400 Bad Request` from the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeError {
	pub error: String,
}
