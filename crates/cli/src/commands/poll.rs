//! `devbridge poll`: the acquire / call / release loop until Ctrl+C.

use std::time::Instant;

use devbridge::{BridgeClient, Poller};
use tokio::sync::watch;
use tracing::info;

use crate::cli::PollArgs;
use crate::config::{Settings, apply_poll_args};
use crate::error::{CliError, Result};
use crate::output::{OutputFormat, emit_success};

pub async fn execute(settings: Settings, args: &PollArgs, start: Instant, format: OutputFormat) -> Result<()> {
	let mut poll = settings.poll;
	apply_poll_args(&mut poll, args);

	let (client, bridge) = BridgeClient::connect(settings.bridge).await?;
	info!(version = %bridge.version, url = %client.config().url, "connected to bridge");

	let mut poller = Poller::new(client, poll).map_err(|e| CliError::InvalidInput(format!("payload: {e}")))?;

	let (stop_tx, stop_rx) = watch::channel(false);
	let signal = tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			info!("received Ctrl+C, stopping after the current device");
			let _ = stop_tx.send(true);
		}
	});

	let result = poller.run(stop_rx).await;
	signal.abort();

	emit_success("poll", start, result?, format);
	Ok(())
}
