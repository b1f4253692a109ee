#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use devbridge::{CallMode, FailurePolicy};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for devbridge.
#[derive(Parser, Debug)]
#[command(name = "devbridge")]
#[command(about = "Talk to hardware devices through the local device bridge")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(flatten)]
	pub bridge: BridgeArgs,

	#[command(subcommand)]
	pub command: Commands,
}

/// Connection flags; each overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct BridgeArgs {
	/// Bridge base URL [default: http://127.0.0.1:21325]
	#[arg(long, global = true, value_name = "URL")]
	pub url: Option<String>,

	/// Origin header sent with every request
	#[arg(long, global = true, value_name = "ORIGIN")]
	pub origin: Option<String>,

	/// Use the debug-link interface of each device
	#[arg(long, global = true)]
	pub debug_link: bool,

	/// Per-request timeout in milliseconds (0 disables)
	#[arg(long, global = true, value_name = "MS")]
	pub timeout_ms: Option<u64>,

	/// Config file [default: $XDG_CONFIG_HOME/devbridge/config.json]
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Show the bridge version.
	Info,
	/// List connected devices.
	Enumerate,
	/// Wait until the device list changes, then print it.
	Listen,
	/// Take exclusive access to a device and print the session id.
	Acquire(AcquireArgs),
	/// Send a message frame under a session.
	Call(CallArgs),
	/// Release a session.
	Release {
		#[arg(value_name = "SESSION")]
		session: String,
	},
	/// Enumerate and cycle through every device until interrupted.
	Poll(PollArgs),
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Info => "info",
			Commands::Enumerate => "enumerate",
			Commands::Listen => "listen",
			Commands::Acquire(_) => "acquire",
			Commands::Call(_) => "call",
			Commands::Release { .. } => "release",
			Commands::Poll(_) => "poll",
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct AcquireArgs {
	/// Device path as reported by `enumerate`.
	#[arg(value_name = "PATH")]
	pub path: String,

	/// Session currently holding the device, to take it over.
	#[arg(long, value_name = "SESSION")]
	pub previous: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
	#[arg(value_name = "SESSION")]
	pub session: String,

	/// Hex-encoded message frame [default: Initialize]
	#[arg(long, value_name = "HEX")]
	pub payload: Option<String>,

	#[arg(long, value_enum, default_value = "call")]
	pub mode: CliCallMode,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
	/// Pause between iterations (0 polls back to back)
	#[arg(long, value_name = "MS")]
	pub interval_ms: Option<u64>,

	/// Stop after this many iterations
	#[arg(long, value_name = "N")]
	pub count: Option<u64>,

	/// What to do when a device fails
	#[arg(long, value_enum)]
	pub on_error: Option<CliFailurePolicy>,

	/// Hex-encoded message frame sent to every device
	#[arg(long, value_name = "HEX")]
	pub payload: Option<String>,
}

/// Exchange mode (CLI wrapper for devbridge::CallMode)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CliCallMode {
	/// Write the frame and read the reply
	#[default]
	Call,
	/// Write the frame only
	Post,
	/// Read one frame only
	Read,
}

impl From<CliCallMode> for CallMode {
	fn from(mode: CliCallMode) -> Self {
		match mode {
			CliCallMode::Call => CallMode::Call,
			CliCallMode::Post => CallMode::Post,
			CliCallMode::Read => CallMode::Read,
		}
	}
}

/// Failure policy (CLI wrapper for devbridge::FailurePolicy)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliFailurePolicy {
	/// Log, count, and continue with the next device
	Skip,
	/// Stop at the first failure
	Abort,
}

impl From<CliFailurePolicy> for FailurePolicy {
	fn from(policy: CliFailurePolicy) -> Self {
		match policy {
			CliFailurePolicy::Skip => FailurePolicy::Skip,
			CliFailurePolicy::Abort => FailurePolicy::Abort,
		}
	}
}
