//! Config file loading and flag overrides.
//!
//! Precedence, lowest first: built-in defaults, the JSON config file, flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use devbridge::{BridgeConfig, PollConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{BridgeArgs, PollArgs};
use crate::error::{CliError, Result};

/// Contents of `config.json`. Every field is optional.
///
/// ```json
/// { "bridge": { "url": "http://127.0.0.1:21325", "debugLink": false },
///   "poll": { "intervalMs": 500, "onError": "abort" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	pub bridge: BridgeConfig,
	pub poll: PollConfig,
}

/// `$XDG_CONFIG_HOME/devbridge/config.json`, falling back to `~/.config`.
pub fn default_path() -> Option<PathBuf> {
	std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
		.map(|home| home.join("devbridge").join("config.json"))
}

/// Loads settings and applies the connection flags.
///
/// An explicit `--config` must exist. The default file is optional, but
/// once present it has to parse.
pub fn resolve(args: &BridgeArgs) -> Result<Settings> {
	let mut settings = match (&args.config, default_path()) {
		(Some(path), _) => load_file(path)?,
		(None, Some(path)) if path.exists() => load_file(&path)?,
		_ => Settings::default(),
	};
	apply_bridge_args(&mut settings.bridge, args);
	Ok(settings)
}

pub fn load_file(path: &Path) -> Result<Settings> {
	debug!(path = %path.display(), "loading config");
	load_json(path).map_err(|reason| CliError::Config {
		path: path.to_path_buf(),
		reason,
	})
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
	let content = fs::read_to_string(path).context("cannot read file")?;
	serde_json::from_str(&content).context("invalid JSON")
}

pub fn apply_bridge_args(config: &mut BridgeConfig, args: &BridgeArgs) {
	if let Some(ref url) = args.url {
		config.url = url.clone();
	}
	if let Some(ref origin) = args.origin {
		config.origin = origin.clone();
	}
	if let Some(timeout_ms) = args.timeout_ms {
		config.timeout_ms = timeout_ms;
	}
	if args.debug_link {
		config.debug_link = true;
	}
}

pub fn apply_poll_args(config: &mut PollConfig, args: &PollArgs) {
	if let Some(interval_ms) = args.interval_ms {
		config.interval_ms = interval_ms;
	}
	if let Some(count) = args.count {
		config.max_iterations = Some(count);
	}
	if let Some(policy) = args.on_error {
		config.on_error = policy.into();
	}
	if let Some(ref payload) = args.payload {
		config.payload = payload.clone();
	}
}
