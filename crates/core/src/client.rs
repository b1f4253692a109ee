//! HTTP client for the bridge API.

use async_trait::async_trait;
use devbridge_protocol::{BridgeInfo, CallMode, DeviceEntry, Endpoint, Message, SessionInfo};
use reqwest::header::ORIGIN;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::bridge::DeviceBridge;
use crate::config::BridgeConfig;
use crate::error::{Error, Result, TransportError};

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
	Json(Value),
	Text(String),
}

impl Reply {
	/// Deserializes the body, parsing text replies as JSON first.
	pub fn into_json<T: DeserializeOwned>(self, endpoint: &Endpoint) -> Result<T> {
		let decoded = match self {
			Reply::Json(value) => serde_json::from_value(value),
			Reply::Text(text) => serde_json::from_str(&text),
		};
		decoded.map_err(|source| {
			TransportError::Decode {
				endpoint: endpoint.to_string(),
				source,
			}
			.into()
		})
	}

	pub fn into_text(self) -> String {
		match self {
			Reply::Text(text) => text,
			Reply::Json(value) => value.to_string(),
		}
	}
}

/// Stateless client for one bridge instance.
///
/// Every request is a `POST` carrying the configured `Origin` header. The
/// client keeps no session bookkeeping; see [`SessionClient`](crate::SessionClient)
/// for the per-device state machine layered on top.
#[derive(Debug, Clone)]
pub struct BridgeClient {
	http: reqwest::Client,
	base: Url,
	config: BridgeConfig,
}

impl BridgeClient {
	pub fn new(config: BridgeConfig) -> Result<Self> {
		let base = Url::parse(&config.url).map_err(|e| Error::Config(format!("bridge url {:?}: {e}", config.url)))?;
		if base.cannot_be_a_base() {
			return Err(Error::Config(format!("bridge url {:?} cannot carry a path", config.url)));
		}

		let http = reqwest::Client::builder()
			.build()
			.map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

		Ok(Self { http, base, config })
	}

	/// Creates a client and verifies the bridge speaks a supported version.
	pub async fn connect(config: BridgeConfig) -> Result<(Self, BridgeInfo)> {
		let client = Self::new(config)?;
		let info = client.info().await?;
		if !info.is_supported() {
			return Err(Error::UnsupportedVersion(info.version));
		}
		debug!(version = %info.version, url = %client.base, "connected to bridge");
		Ok((client, info))
	}

	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	/// Absolute URL of `endpoint`, with path parameters percent-encoded.
	pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url> {
		let segments = endpoint.segments();
		let mut url = self.base.clone();
		if segments.is_empty() {
			return Ok(url);
		}

		url.path_segments_mut()
			.map_err(|_| Error::Config(format!("bridge url {:?} cannot carry a path", self.config.url)))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// Sends one request.
	///
	/// `expect_text` selects how a successful body is read: as plain text
	/// (message exchanges) or as JSON (everything else). Non-success
	/// responses are mapped through the error taxonomy.
	pub async fn request(&self, endpoint: &Endpoint, body: Option<String>, expect_text: bool) -> Result<Reply> {
		let url = self.url_for(endpoint)?;
		let mut request = self.http.post(url).header(ORIGIN, self.config.origin.as_str());

		if let Some(timeout) = self.config.timeout().filter(|_| *endpoint != Endpoint::Listen) {
			request = request.timeout(timeout);
		}
		if let Some(body) = body {
			request = request.body(body);
		}

		debug!(%endpoint, "bridge request");
		let transport = |source| TransportError::Request {
			endpoint: endpoint.to_string(),
			source,
		};
		let response = request.send().await.map_err(transport)?;
		let status = response.status();
		let text = response.text().await.map_err(transport)?;
		trace!(%endpoint, status = status.as_u16(), body = %text, "bridge response");

		if !status.is_success() {
			return Err(Error::from_response(endpoint, status.as_u16(), text));
		}

		if expect_text {
			return Ok(Reply::Text(text));
		}
		serde_json::from_str(&text).map(Reply::Json).map_err(|source| {
			TransportError::Decode {
				endpoint: endpoint.to_string(),
				source,
			}
			.into()
		})
	}

	async fn request_json<T: DeserializeOwned>(&self, endpoint: Endpoint, body: Option<String>) -> Result<T> {
		self.request(&endpoint, body, false).await?.into_json(&endpoint)
	}

	pub async fn info(&self) -> Result<BridgeInfo> {
		self.request_json(Endpoint::Info, None).await
	}

	pub async fn enumerate(&self) -> Result<Vec<DeviceEntry>> {
		self.request_json(Endpoint::Enumerate, None).await
	}

	/// Blocks until the bridge's device list differs from `previous`.
	///
	/// The bridge may also return an unchanged list after its own timeout,
	/// and a change of session counts as a change; compare before reacting.
	pub async fn listen(&self, previous: &[DeviceEntry]) -> Result<Vec<DeviceEntry>> {
		let body = serde_json::to_string(previous).map_err(|source| TransportError::Decode {
			endpoint: Endpoint::Listen.to_string(),
			source,
		})?;
		self.request_json(Endpoint::Listen, Some(body)).await
	}

	pub async fn acquire(&self, path: &str, previous: Option<&str>) -> Result<String> {
		let endpoint = Endpoint::Acquire {
			path: path.to_string(),
			previous: previous.map(str::to_string),
			debug: self.config.debug_link,
		};
		let info: SessionInfo = self.request_json(endpoint, None).await?;
		Ok(info.session)
	}

	/// Releases `session`, returning the bridge's status object verbatim.
	pub async fn release(&self, session: &str) -> Result<Value> {
		let endpoint = Endpoint::Release {
			session: session.to_string(),
			debug: self.config.debug_link,
		};
		self.request_json(endpoint, None).await
	}

	/// Writes `message` and reads the reply.
	pub async fn call(&self, session: &str, message: &Message) -> Result<Message> {
		let text = self.exchange(session, CallMode::Call, Some(message)).await?;
		Ok(Message::from_hex(&text)?)
	}

	/// Writes `message` without waiting for a reply.
	pub async fn post(&self, session: &str, message: &Message) -> Result<()> {
		self.exchange(session, CallMode::Post, Some(message)).await.map(drop)
	}

	/// Reads one message the device has queued.
	pub async fn read(&self, session: &str) -> Result<Message> {
		let text = self.exchange(session, CallMode::Read, None).await?;
		Ok(Message::from_hex(&text)?)
	}

	async fn exchange(&self, session: &str, mode: CallMode, message: Option<&Message>) -> Result<String> {
		let endpoint = Endpoint::Call {
			session: session.to_string(),
			mode,
			debug: self.config.debug_link,
		};
		let body = message.filter(|_| mode.writes()).map(Message::to_hex);
		Ok(self.request(&endpoint, body, true).await?.into_text())
	}
}

#[async_trait]
impl DeviceBridge for BridgeClient {
	async fn enumerate(&self) -> Result<Vec<DeviceEntry>> {
		BridgeClient::enumerate(self).await
	}

	async fn acquire(&self, path: &str, previous: Option<&str>) -> Result<String> {
		BridgeClient::acquire(self, path, previous).await
	}

	async fn call(&self, session: &str, message: &Message) -> Result<Message> {
		BridgeClient::call(self, session, message).await
	}

	async fn release(&self, session: &str) -> Result<()> {
		BridgeClient::release(self, session).await.map(drop)
	}

	fn debug_link(&self) -> bool {
		self.config.debug_link
	}
}
