mod device;
mod poll;

use std::time::Instant;

use devbridge::{BridgeClient, BridgeConfig};

use crate::cli::{Cli, Commands};
use crate::config;
use crate::error::Result;
use crate::output::{OutputFormat, emit_success};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let start = Instant::now();
	let format = cli.format;
	let settings = config::resolve(&cli.bridge)?;
	let name = cli.command.name();

	match cli.command {
		Commands::Poll(args) => poll::execute(settings, &args, start, format).await,
		Commands::Info => emit(name, start, device::info(&client(settings.bridge)?).await?, format),
		Commands::Enumerate => emit(name, start, client(settings.bridge)?.enumerate().await?, format),
		Commands::Listen => emit(name, start, device::listen(&client(settings.bridge)?).await?, format),
		Commands::Acquire(args) => emit(name, start, device::acquire(&client(settings.bridge)?, &args).await?, format),
		Commands::Call(args) => emit(name, start, device::call(&client(settings.bridge)?, &args).await?, format),
		Commands::Release { session } => emit(name, start, client(settings.bridge)?.release(&session).await?, format),
	}
}

/// One-shot commands skip the version check; `poll` connects instead.
fn client(config: BridgeConfig) -> Result<BridgeClient> {
	Ok(BridgeClient::new(config)?)
}

fn emit<T: serde::Serialize>(command: &str, start: Instant, data: T, format: OutputFormat) -> Result<()> {
	emit_success(command, start, data, format);
	Ok(())
}
