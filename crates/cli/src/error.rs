use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Bridge(#[from] devbridge::Error),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("config file {}: {reason:#}", .path.display())]
	Config { path: PathBuf, reason: anyhow::Error },
}

impl CliError {
	/// Converts to the structured error printed in the result envelope.
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::Bridge(err) => bridge_error_code(err),
			CliError::InvalidInput(_) => (ErrorCode::InvalidInput, None),
			CliError::Config { path, .. } => (ErrorCode::ConfigError, Some(serde_json::json!({ "path": path }))),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}

fn bridge_error_code(err: &devbridge::Error) -> (ErrorCode, Option<serde_json::Value>) {
	use devbridge::{Error, TransportError};

	match err {
		Error::Transport(TransportError::Status { status, .. }) => {
			(ErrorCode::BridgeUnavailable, Some(serde_json::json!({ "status": status })))
		}
		Error::Transport(_) => (ErrorCode::BridgeUnavailable, None),
		Error::Acquisition { path, .. } => (ErrorCode::AcquisitionFailed, Some(serde_json::json!({ "path": path }))),
		Error::Session { session, .. } => (ErrorCode::SessionError, Some(serde_json::json!({ "session": session }))),
		Error::Rejected { endpoint, .. } => (ErrorCode::Rejected, Some(serde_json::json!({ "endpoint": endpoint }))),
		Error::UnsupportedVersion(version) => {
			(ErrorCode::UnsupportedVersion, Some(serde_json::json!({ "version": version })))
		}
		Error::Config(_) => (ErrorCode::ConfigError, None),
		Error::Frame(_) => (ErrorCode::InternalError, None),
	}
}
