use std::path::PathBuf;

use palc::{Parser, Subcommand};

use crate::Config;

#[derive(Parser)]
#[command(name = "foxdream", after_long_help = "A tree-walking interpreter for the FoxDream scripting language.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Run a script file
	File {
		path:       PathBuf,
		/// Directory `import` statements load modules from
		#[arg(long)]
		import_dir: Option<PathBuf>,
		/// Abort after executing this many statements
		#[arg(long)]
		max_steps:  Option<u64>,
		/// Limit of nested function calls
		#[arg(long)]
		max_depth:  Option<usize>,
		/// Log at debug level
		#[arg(short, long)]
		verbose:    bool,
	},
	/// Start the interactive prompt
	Repl {
		/// Directory `import` statements load modules from
		#[arg(long)]
		import_dir: Option<PathBuf>,
		/// Abort a line after executing this many statements
		#[arg(long)]
		max_steps:  Option<u64>,
		/// Limit of nested function calls
		#[arg(long)]
		max_depth:  Option<usize>,
		/// Log at debug level
		#[arg(short, long)]
		verbose:    bool,
	},
}

impl Mode {
	/// The driver configuration and whether verbose logging was requested.
	pub fn config(&self) -> (Config, bool) {
		let (import_dir, max_steps, max_depth, verbose) = match self {
			Mode::File { import_dir, max_steps, max_depth, verbose, .. }
			| Mode::Repl { import_dir, max_steps, max_depth, verbose } => (import_dir, max_steps, max_depth, verbose),
		};
		let mut config = Config { max_steps: *max_steps, ..Config::default() };
		if let Some(dir) = import_dir {
			config.import_dir = dir.clone();
		}
		if let Some(depth) = max_depth {
			config.max_depth = *depth;
		}
		(config, *verbose)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn settings_from_arguments() {
		let mode =
			Mode::Repl { import_dir: Some(PathBuf::from("lib")), max_steps: Some(10), max_depth: Some(8), verbose: true };
		let (config, verbose) = mode.config();
		assert_eq!(config.import_dir, PathBuf::from("lib"));
		assert_eq!(config.max_steps, Some(10));
		assert_eq!(config.max_depth, 8);
		assert!(verbose);

		let mode =
			Mode::File { path: PathBuf::from("a.prg"), import_dir: None, max_steps: None, max_depth: None, verbose: false };
		assert_eq!(mode.config().0, Config::default());
	}

	#[test]
	fn bad_invocations_are_rejected() {
		for args in [&["foxdream", "--bogus"][..], &["foxdream"], &["foxdream", "file", "a.prg", "b.prg"]] {
			assert!(Cli::try_parse_from(args.iter().copied()).is_err(), "{args:?}");
		}
		let Ok(Cli { mode: Mode::File { path, max_depth, .. } }) =
			Cli::try_parse_from(["foxdream", "file", "a.prg", "--max-depth", "5"])
		else {
			panic!("expected a file invocation");
		};
		assert_eq!(path, PathBuf::from("a.prg"));
		assert_eq!(max_depth, Some(5));
	}
}
