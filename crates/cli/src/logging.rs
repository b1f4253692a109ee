use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the stderr subscriber.
///
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

fn default_filter(verbosity: u8) -> &'static str {
	// 0 = errors only
	// 1 (-v) = info for our crates, warn for the HTTP stack
	// 2+ (-vv) = debug for everything
	match verbosity {
		0 => "error",
		1 => "warn,devbridge=info,devbridge_cli=info",
		_ => "debug",
	}
}
