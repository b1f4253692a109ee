//! Error types for bridge operations.

use devbridge_protocol::{BridgeError, Endpoint, FrameError};
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the session client.
#[derive(Debug, Error)]
pub enum Error {
	/// The bridge could not be reached or answered outside the protocol.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The device is held by another session or is no longer connected.
	#[error("cannot acquire {path}: {reason}")]
	Acquisition { path: String, reason: String },

	/// The session was released, never acquired, or invalidated by the bridge.
	#[error("session {session} is not usable: {reason}")]
	Session { session: String, reason: String },

	/// The bridge refused a well-formed session request for another reason
	/// (e.g. malformed message data, another call in progress).
	#[error("bridge rejected {endpoint}: {reason}")]
	Rejected { endpoint: String, reason: String },

	#[error("unsupported bridge version {0}, need 2.x")]
	UnsupportedVersion(String),

	/// A message frame could not be encoded or decoded.
	#[error(transparent)]
	Frame(#[from] FrameError),

	#[error("invalid configuration: {0}")]
	Config(String),
}

/// Failures below the bridge protocol: connection, status, and decoding.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("request to {endpoint} failed: {source}")]
	Request {
		endpoint: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("{endpoint} returned HTTP {status}{}", hint(.status))]
	Status { endpoint: String, status: u16, body: String },

	#[error("could not decode response from {endpoint}: {source}")]
	Decode {
		endpoint: String,
		#[source]
		source: serde_json::Error,
	},
}

fn hint(status: &u16) -> &'static str {
	match *status {
		403 => " (origin not allowed by the bridge)",
		404 => " (route unknown to this bridge version)",
		_ => "",
	}
}

impl Error {
	pub fn is_transport(&self) -> bool {
		matches!(self, Error::Transport(_))
	}

	pub fn is_acquisition(&self) -> bool {
		matches!(self, Error::Acquisition { .. })
	}

	pub fn is_session(&self) -> bool {
		matches!(self, Error::Session { .. })
	}

	/// Maps a non-success response to the error taxonomy.
	///
	/// The bridge reports protocol failures as `400` with `{"error": "..."}`.
	/// On `/acquire` any such report means the device could not be taken; on
	/// session routes only reports naming the session or device mean the
	/// session is stale. Everything else is a transport failure.
	pub(crate) fn from_response(endpoint: &Endpoint, status: u16, body: String) -> Self {
		let reason = (status == 400).then(|| serde_json::from_str::<BridgeError>(&body).ok()).flatten().map(|b| b.error);

		let Some(reason) = reason else {
			return TransportError::Status {
				endpoint: endpoint.to_string(),
				status,
				body,
			}
			.into();
		};

		match endpoint {
			Endpoint::Acquire { path, .. } => Error::Acquisition { path: path.clone(), reason },
			_ => match endpoint.session() {
				Some(session) if is_stale_reason(&reason) => Error::Session {
					session: session.to_string(),
					reason,
				},
				Some(_) => Error::Rejected {
					endpoint: endpoint.to_string(),
					reason,
				},
				None => TransportError::Status {
					endpoint: endpoint.to_string(),
					status,
					body: reason,
				}
				.into(),
			},
		}
	}
}

fn is_stale_reason(reason: &str) -> bool {
	let reason = reason.to_ascii_lowercase();
	reason.contains("session not found")
		|| reason.contains("device not found")
		|| reason.contains("disconnected")
		|| reason.contains("closed device")
}

#[cfg(test)]
mod tests {
	use devbridge_protocol::CallMode;

	use super::*;

	fn call(session: &str) -> Endpoint {
		Endpoint::Call {
			session: session.into(),
			mode: CallMode::Call,
			debug: false,
		}
	}

	#[test]
	fn acquire_rejection_is_acquisition_error() {
		let endpoint = Endpoint::Acquire {
			path: "usb:1:2".into(),
			previous: None,
			debug: false,
		};
		let err = Error::from_response(&endpoint, 400, r#"{"error":"wrong previous session"}"#.into());
		assert!(err.is_acquisition());
		assert_eq!(err.to_string(), "cannot acquire usb:1:2: wrong previous session");
	}

	#[test]
	fn unknown_session_is_session_error() {
		let err = Error::from_response(&call("5"), 400, r#"{"error":"session not found"}"#.into());
		assert!(err.is_session());
	}

	#[test]
	fn malformed_payload_is_rejected_not_stale() {
		let err = Error::from_response(&call("5"), 400, r#"{"error":"malformed data"}"#.into());
		assert!(matches!(err, Error::Rejected { .. }));
	}

	#[test]
	fn forbidden_origin_is_transport_error_with_hint() {
		let err = Error::from_response(&Endpoint::Enumerate, 403, String::new());
		assert!(err.is_transport());
		assert!(err.to_string().contains("origin not allowed"));
	}

	#[test]
	fn enumerate_bad_request_is_transport_error() {
		let err = Error::from_response(&Endpoint::Enumerate, 400, r#"{"error":"libusb failure"}"#.into());
		assert!(err.is_transport());
	}

	#[test]
	fn non_json_bad_request_is_transport_error() {
		let err = Error::from_response(&call("1"), 400, "oops".into());
		assert!(err.is_transport());
	}
}
