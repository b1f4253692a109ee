//! Result envelope printed by every command.
//!
//! With `-f json` each command prints one object on stdout:
//!
//! ```json
//! { "ok": true, "command": "enumerate", "data": [ ... ], "timings": { "durationMs": 3 } }
//! ```
//!
//! and on failure:
//!
//! ```json
//! { "ok": false, "command": "acquire", "error": { "code": "ACQUISITION_FAILED", "message": "..." } }
//! ```


use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,

	/// Subcommand name (`enumerate`, `acquire`, ...)
	pub command: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable error codes for scripts driving the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Bridge unreachable, timed out, or answered with an unexpected status
	BridgeUnavailable,
	/// Bridge major version is not supported
	UnsupportedVersion,
	/// Device busy or absent
	AcquisitionFailed,
	/// Session invalid or stale
	SessionError,
	/// Bridge refused the request for another reason
	Rejected,
	/// Bad payload or argument
	InvalidInput,
	/// Config file unreadable or invalid
	ConfigError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ErrorCode::BridgeUnavailable => "BRIDGE_UNAVAILABLE",
			ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
			ErrorCode::AcquisitionFailed => "ACQUISITION_FAILED",
			ErrorCode::SessionError => "SESSION_ERROR",
			ErrorCode::Rejected => "REJECTED",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		write!(f, "{s}")
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Self {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

/// Builds a [`CommandResult`], timing from construction to [`build`](Self::build).
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
		}
	}

	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			ok: self.error.is_none(),
			command: self.command,
			data: self.data,
			error: self.error,
			timings: Some(Timings::from(self.start_time.elapsed())),
		}
	}
}

pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if let Some(ref data) = result.data {
		match serde_json::to_value(data) {
			// Bare strings (session ids, hex replies) print unquoted.
			Ok(serde_json::Value::String(s)) => {
				let _ = writeln!(stdout, "{s}");
			}
			Ok(serde_json::Value::Null) => {}
			Ok(value) => {
				if let Ok(json) = serde_json::to_string_pretty(&value) {
					let _ = writeln!(stdout, "{json}");
				}
			}
			Err(_) => {}
		}
	}
}

pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

/// Prints a successful result for `command`.
pub fn emit_success<T: Serialize>(command: &str, start: Instant, data: T, format: OutputFormat) {
	let result = ResultBuilder::new(command).started_at(start).data(data).build();
	print_result(&result, format);
}
