use clap::Parser;
use devbridge_cli::cli::Cli;
use devbridge_cli::commands;
use devbridge_cli::error::CliError;
use devbridge_cli::logging;
use devbridge_cli::output::{self, CommandResult, OutputFormat, ResultBuilder};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();

	if let Err(err) = commands::dispatch(cli).await {
		handle_error(command, &err, format);
		std::process::exit(1);
	}
}

fn handle_error(command: &str, err: &CliError, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	// Humans read stderr; scripts read the envelope on stdout.
	output::print_error_stderr(&cmd_error);

	if format == OutputFormat::Json {
		let result: CommandResult<()> = ResultBuilder::new(command).error(cmd_error).build();
		output::print_result(&result, format);
	}
}
