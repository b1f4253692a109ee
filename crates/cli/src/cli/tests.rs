use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_acquire_command() {
	let args = vec!["devbridge", "acquire", "usb:1:2"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Acquire(args) => {
			assert_eq!(args.path, "usb:1:2");
			assert_eq!(args.previous, None);
		}
		_ => panic!("Expected Acquire command"),
	}
}

#[test]
fn parse_acquire_with_previous() {
	let args = vec!["devbridge", "acquire", "usb:1:2", "--previous", "3"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Acquire(args) => assert_eq!(args.previous.as_deref(), Some("3")),
		_ => panic!("Expected Acquire command"),
	}
}

#[test]
fn parse_call_defaults() {
	let args = vec!["devbridge", "call", "0"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Call(args) => {
			assert_eq!(args.session, "0");
			assert_eq!(args.payload, None);
			assert_eq!(args.mode, CliCallMode::Call);
		}
		_ => panic!("Expected Call command"),
	}
}

#[test]
fn parse_call_with_payload_and_mode() {
	let args = vec!["devbridge", "call", "0", "--payload", "000000000000", "--mode", "post"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Call(args) => {
			assert_eq!(args.payload.as_deref(), Some("000000000000"));
			assert_eq!(CallMode::from(args.mode), CallMode::Post);
		}
		_ => panic!("Expected Call command"),
	}
}

#[test]
fn parse_release_command() {
	let cli = Cli::try_parse_from(["devbridge", "release", "7"]).unwrap();
	assert!(matches!(cli.command, Commands::Release { ref session } if session == "7"));
	assert_eq!(cli.command.name(), "release");
}

#[test]
fn parse_poll_command() {
	let args = vec![
		"devbridge",
		"poll",
		"--interval-ms",
		"0",
		"--count",
		"3",
		"--on-error",
		"abort",
	];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Poll(args) => {
			assert_eq!(args.interval_ms, Some(0));
			assert_eq!(args.count, Some(3));
			assert_eq!(args.on_error.map(FailurePolicy::from), Some(FailurePolicy::Abort));
			assert_eq!(args.payload, None);
		}
		_ => panic!("Expected Poll command"),
	}
}

#[test]
fn parse_poll_defaults_leave_config_untouched() {
	let cli = Cli::try_parse_from(["devbridge", "poll"]).unwrap();

	match cli.command {
		Commands::Poll(args) => {
			assert_eq!(args.interval_ms, None);
			assert_eq!(args.count, None);
			assert_eq!(args.on_error, None);
		}
		_ => panic!("Expected Poll command"),
	}
}

#[test]
fn simple_commands_parse() {
	for (arg, name) in [("info", "info"), ("enumerate", "enumerate"), ("listen", "listen")] {
		let cli = Cli::try_parse_from(["devbridge", arg]).unwrap();
		assert_eq!(cli.command.name(), name);
	}
}

#[test]
fn global_bridge_flags_after_subcommand() {
	let args = vec![
		"devbridge",
		"enumerate",
		"--url",
		"http://127.0.0.1:9999",
		"--origin",
		"https://example.test",
		"--debug-link",
		"--timeout-ms",
		"500",
		"--config",
		"/tmp/bridge.json",
	];
	let cli = Cli::try_parse_from(args).unwrap();

	assert_eq!(cli.bridge.url.as_deref(), Some("http://127.0.0.1:9999"));
	assert_eq!(cli.bridge.origin.as_deref(), Some("https://example.test"));
	assert!(cli.bridge.debug_link);
	assert_eq!(cli.bridge.timeout_ms, Some(500));
	assert_eq!(cli.bridge.config, Some(PathBuf::from("/tmp/bridge.json")));
}

#[test]
fn verbose_flag_short_and_long() {
	let short_cli = Cli::try_parse_from(["devbridge", "-v", "info"]).unwrap();
	assert_eq!(short_cli.verbose, 1);

	let long_cli = Cli::try_parse_from(["devbridge", "--verbose", "info"]).unwrap();
	assert_eq!(long_cli.verbose, 1);

	let double = Cli::try_parse_from(["devbridge", "-vv", "info"]).unwrap();
	assert_eq!(double.verbose, 2);
}

#[test]
fn format_flag() {
	let cli = Cli::try_parse_from(["devbridge", "info"]).unwrap();
	assert_eq!(cli.format, OutputFormat::Text);

	let cli = Cli::try_parse_from(["devbridge", "-f", "json", "info"]).unwrap();
	assert_eq!(cli.format, OutputFormat::Json);

	assert!(Cli::try_parse_from(["devbridge", "-f", "yaml", "info"]).is_err());
}

#[test]
fn missing_arguments_are_rejected() {
	assert!(Cli::try_parse_from(["devbridge", "acquire"]).is_err());
	assert!(Cli::try_parse_from(["devbridge", "call"]).is_err());
	assert!(Cli::try_parse_from(["devbridge", "poll", "--on-error", "retry"]).is_err());
}
