//! One-shot bridge operations.

use devbridge::{BridgeClient, CallMode, DeviceEntry, Message};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{AcquireArgs, CallArgs};
use crate::error::{CliError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoData {
	pub version: String,
	pub supported: bool,
}

/// Reports the version without failing on an unsupported one.
pub async fn info(client: &BridgeClient) -> Result<InfoData> {
	let info = client.info().await?;
	Ok(InfoData {
		supported: info.is_supported(),
		version: info.version,
	})
}

/// Blocks until the device list differs from the current one.
pub async fn listen(client: &BridgeClient) -> Result<Vec<DeviceEntry>> {
	let current = client.enumerate().await?;
	debug!(devices = current.len(), "waiting for device list to change");
	Ok(client.listen(&current).await?)
}

pub async fn acquire(client: &BridgeClient, args: &AcquireArgs) -> Result<String> {
	let session = client.acquire(&args.path, args.previous.as_deref()).await?;
	info!(path = %args.path, session = %session, "acquired");
	Ok(session)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallData {
	/// Hex-encoded reply frame; absent for `post`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reply: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub kind: Option<u16>,
}

pub async fn call(client: &BridgeClient, args: &CallArgs) -> Result<CallData> {
	let mode = CallMode::from(args.mode);
	let message = match args.payload.as_deref() {
		Some(hex) => Message::from_hex(hex).map_err(|e| CliError::InvalidInput(format!("payload: {e}")))?,
		None => Message::initialize(),
	};

	let reply = match mode {
		CallMode::Call => Some(client.call(&args.session, &message).await?),
		CallMode::Post => {
			client.post(&args.session, &message).await?;
			None
		}
		CallMode::Read => Some(client.read(&args.session).await?),
	};

	Ok(CallData {
		kind: reply.as_ref().map(|m| m.kind),
		reply: reply.map(|m| m.to_hex()),
	})
}
