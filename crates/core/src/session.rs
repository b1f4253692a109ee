//! Per-device session tracking.
//!
//! [`SessionClient`] wraps a [`DeviceBridge`] and keeps the state machine
//! `Unacquired -> Acquired -> Unacquired` for every device it has touched.
//! It refuses locally what the bridge would refuse anyway (acquiring a device
//! it already holds, using or releasing a session it no longer holds), so the
//! client never has two open sessions on one device.

use std::collections::HashMap;

use devbridge_protocol::{DeviceEntry, Message};
use tracing::{debug, warn};

use crate::bridge::DeviceBridge;
use crate::error::{Error, Result};

/// An acquired session on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	token: String,
	path: String,
	debug: bool,
}

impl Session {
	pub fn token(&self) -> &str {
		&self.token
	}

	/// Path of the device this session was issued for.
	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn is_debug(&self) -> bool {
		self.debug
	}
}

/// Client-side view of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceState {
	#[default]
	Unacquired,
	Acquired { session: String },
}

/// Session-tracking client over a [`DeviceBridge`].
pub struct SessionClient<B> {
	bridge: B,
	devices: HashMap<String, DeviceState>,
}

impl<B: DeviceBridge> SessionClient<B> {
	pub fn new(bridge: B) -> Self {
		Self {
			bridge,
			devices: HashMap::new(),
		}
	}

	pub fn bridge(&self) -> &B {
		&self.bridge
	}

	/// Current state of the device at `path`.
	pub fn state(&self, path: &str) -> DeviceState {
		self.devices.get(path).cloned().unwrap_or_default()
	}

	/// Number of devices this client currently holds a session on.
	pub fn held(&self) -> usize {
		self.devices.values().filter(|state| matches!(state, DeviceState::Acquired { .. })).count()
	}

	/// Lists connected devices and reconciles tracked sessions with them.
	///
	/// A tracked session is dropped when its device is gone or the bridge no
	/// longer reports it as the device's holder.
	pub async fn enumerate(&mut self) -> Result<Vec<DeviceEntry>> {
		let entries = self.bridge.enumerate().await?;
		let debug = self.bridge.debug_link();

		self.devices.retain(|path, state| {
			let DeviceState::Acquired { session } = state else {
				return false;
			};
			let entry = entries.iter().find(|entry| entry.path == *path);
			let still_held = entry.is_some_and(|entry| entry.holder(debug) == Some(session.as_str()));
			if !still_held {
				warn!(path = %path, session = %session, "bridge no longer reports tracked session, dropping it");
			}
			still_held
		});

		Ok(entries)
	}

	/// Takes exclusive access to the device at `path`.
	pub async fn acquire(&mut self, path: &str) -> Result<Session> {
		self.acquire_with_previous(path, None).await
	}

	/// Takes the device at `path`, naming the session the bridge currently
	/// associates with it (`None` when free).
	pub async fn acquire_with_previous(&mut self, path: &str, previous: Option<&str>) -> Result<Session> {
		if let DeviceState::Acquired { session } = self.state(path) {
			return Err(Error::Acquisition {
				path: path.to_string(),
				reason: format!("already held by this client as session {session}"),
			});
		}

		let token = self.bridge.acquire(path, previous).await?;
		debug!(path, session = %token, "acquired");
		self.devices.insert(path.to_string(), DeviceState::Acquired { session: token.clone() });

		Ok(Session {
			token,
			path: path.to_string(),
			debug: self.bridge.debug_link(),
		})
	}

	/// Sends `message` under `session` and returns the device's reply.
	///
	/// If the bridge reports the session stale, the device returns to
	/// `Unacquired`.
	pub async fn send(&mut self, session: &Session, message: &Message) -> Result<Message> {
		self.ensure_held(session)?;

		match self.bridge.call(&session.token, message).await {
			Err(err) if err.is_session() => {
				self.devices.remove(&session.path);
				Err(err)
			}
			result => result,
		}
	}

	/// Ends `session`.
	///
	/// Releasing a session this client does not hold is reported as
	/// [`Error::Session`] without contacting the bridge. A transport failure
	/// leaves the device `Acquired` so the release can be retried.
	pub async fn release(&mut self, session: &Session) -> Result<()> {
		self.ensure_held(session)?;

		match self.bridge.release(&session.token).await {
			Ok(()) => {
				debug!(path = %session.path, session = %session.token, "released");
				self.devices.remove(&session.path);
				Ok(())
			}
			Err(err) if err.is_session() => {
				self.devices.remove(&session.path);
				Err(err)
			}
			Err(err) => Err(err),
		}
	}

	fn ensure_held(&self, session: &Session) -> Result<()> {
		match self.devices.get(&session.path) {
			Some(DeviceState::Acquired { session: held }) if *held == session.token => Ok(()),
			_ => Err(Error::Session {
				session: session.token.clone(),
				reason: format!("not held on {}, it was released or never acquired", session.path),
			}),
		}
	}
}
