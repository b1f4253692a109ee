//! Typed bridge routes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path segment standing in for "no previous session" in `/acquire`.
pub const NULL_SESSION: &str = "null";

/// How a message exchange uses the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
	/// Write a message and read the reply.
	#[default]
	Call,
	/// Write a message without reading a reply.
	Post,
	/// Read one pending message without writing.
	Read,
}

impl CallMode {
	pub fn route(self) -> &'static str {
		match self {
			CallMode::Call => "call",
			CallMode::Post => "post",
			CallMode::Read => "read",
		}
	}

	/// Whether the request carries a hex message body.
	pub fn writes(self) -> bool {
		!matches!(self, CallMode::Read)
	}
}

/// A bridge route together with its path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
	/// `POST /` - bridge version.
	Info,
	/// `POST /enumerate` - connected devices.
	Enumerate,
	/// `POST /listen` - block until the device list changes.
	Listen,
	/// `POST [/debug]/acquire/{path}/{previous}`.
	Acquire {
		path: String,
		previous: Option<String>,
		debug: bool,
	},
	/// `POST [/debug]/release/{session}`.
	Release { session: String, debug: bool },
	/// `POST [/debug]/{call|post|read}/{session}`.
	Call {
		session: String,
		mode: CallMode,
		debug: bool,
	},
}

impl Endpoint {
	/// Unencoded path segments, in order.
	pub fn segments(&self) -> Vec<&str> {
		let (debug, rest): (bool, Vec<&str>) = match self {
			Endpoint::Info => (false, vec![]),
			Endpoint::Enumerate => (false, vec!["enumerate"]),
			Endpoint::Listen => (false, vec!["listen"]),
			Endpoint::Acquire { path, previous, debug } => {
				(*debug, vec!["acquire", path.as_str(), previous.as_deref().unwrap_or(NULL_SESSION)])
			}
			Endpoint::Release { session, debug } => (*debug, vec!["release", session.as_str()]),
			Endpoint::Call { session, mode, debug } => (*debug, vec![mode.route(), session.as_str()]),
		};

		if debug {
			let mut segments = Vec::with_capacity(rest.len() + 1);
			segments.push("debug");
			segments.extend(rest);
			segments
		} else {
			rest
		}
	}

	/// Whether the response body is plain text rather than JSON.
	///
	/// Message exchanges answer with hex text (possibly empty); every other
	/// route answers with JSON regardless of whether a request body was sent.
	pub fn expects_text(&self) -> bool {
		matches!(self, Endpoint::Call { .. })
	}

	/// Session the route operates on, if any.
	pub fn session(&self) -> Option<&str> {
		match self {
			Endpoint::Release { session, .. } | Endpoint::Call { session, .. } => Some(session.as_str()),
			_ => None,
		}
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let segments = self.segments();
		if segments.is_empty() {
			return f.write_str("/");
		}
		for segment in segments {
			write!(f, "/{segment}")?;
		}
		Ok(())
	}
}
