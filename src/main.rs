use std::{env, process};

use foxdream::{
	FoxDream,
	cli::{Cli, Mode},
};
use log::LevelFilter;
use palc::Parser;

fn main() {
	let Cli { mode } = match Cli::try_parse_from(env::args_os()) {
		Ok(cli) => cli,
		Err(e) => {
			eprintln!("{e}");
			process::exit(foxdream::EXIT_USAGE);
		}
	};
	let (config, verbose) = mode.config();

	// RUST_LOG, when set, overrides the level picked by `--verbose`.
	env_logger::Builder::new()
		.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn })
		.parse_default_env()
		.init();

	let mut foxdream = FoxDream::new(config);
	match mode {
		Mode::File { path, .. } => {
			if let Err(e) = foxdream.run_file(&path) {
				eprintln!("{e}");
				process::exit(e.exit_code());
			}
		}
		Mode::Repl { .. } => {
			if let Err(e) = foxdream.run_prompt() {
				eprintln!("Failed run prompt: {e:#}");
				process::exit(foxdream::EXIT_SOFTWARE);
			}
		}
	}
}
