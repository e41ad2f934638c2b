use std::{
	fs::read_to_string,
	io::{self, BufRead, Write},
	path::{Path, PathBuf},
	rc::Rc,
};

use anyhow::Context;
use log::info;

use crate::{
	connector::{Driver, DriverRegistry},
	error::FoxError,
	interpreter::{DEFAULT_CALL_DEPTH, Interpreter},
	parser::Parser,
	resolver::{FsResolver, SourceResolver},
};

const PROMPT: &str = "fox-dream> ";

/// Library-side settings of a [`FoxDream`] session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	/// Base directory of the file-system import resolver.
	pub import_dir: PathBuf,
	/// Statement budget per run; unlimited when `None`.
	pub max_steps:  Option<u64>,
	/// Nested user function calls allowed before a run fails.
	pub max_depth:  usize,
}

impl Default for Config {
	fn default() -> Self { Self { import_dir: PathBuf::from("."), max_steps: None, max_depth: DEFAULT_CALL_DEPTH } }
}

/// FoxDream parses and runs source units against one long-lived interpreter,
/// so globals defined by a run stay visible to the next one.
pub struct FoxDream {
	config:      Config,
	resolver:    Rc<dyn SourceResolver>,
	output:      Option<Box<dyn Write>>,
	drivers:     DriverRegistry,
	interpreter: Option<Interpreter>,
}

impl FoxDream {
	/// A session printing to stdout and importing from `config.import_dir`.
	pub fn new(config: Config) -> Self {
		Self {
			resolver: Rc::new(FsResolver::new(config.import_dir.clone())),
			config,
			output: None,
			drivers: DriverRegistry::default(),
			interpreter: None,
		}
	}

	/// Send `print` output to `output` instead of stdout.
	pub fn with_output(mut self, output: impl Write + 'static) -> Self {
		self.output = Some(Box::new(output));
		self
	}

	pub fn with_resolver(mut self, resolver: impl SourceResolver + 'static) -> Self {
		self.resolver = Rc::new(resolver);
		self
	}

	/// Register a database driver under a `connection.provider` id.
	pub fn with_driver(mut self, provider: i64, driver: impl Driver + 'static) -> Self {
		self.drivers.register(provider, Rc::new(driver));
		self
	}

	/// Run the script at `path`.
	pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), FoxError> {
		let path = path.as_ref();
		let source = read_to_string(path).with_context(|| format!("Failed open source file `{}`", path.display()))?;
		self.run(&source)
	}

	/// Run the REPL prompt until end of input. Errors are reported and the
	/// session goes on.
	pub fn run_prompt(&mut self) -> anyhow::Result<()> {
		let stdin = io::stdin();
		let mut input = String::new();
		loop {
			input.clear();
			print!("{PROMPT}");
			io::stdout().flush().context("Failed flush prompt")?;
			if stdin.lock().read_line(&mut input).context("Failed read line")? == 0 {
				println!();
				return Ok(());
			}
			if input.trim().is_empty() {
				continue;
			}
			if let Err(e) = self.run(&input) {
				eprintln!("{e}");
			}
		}
	}

	/// Parse and run one source unit. Syntax errors stop the unit before
	/// anything executes.
	pub fn run(&mut self, source: &str) -> Result<(), FoxError> {
		let statements = Parser::new(self.resolver.clone()).parse(source)?;
		self.interpreter().interpret(&statements)?;
		Ok(())
	}

	fn interpreter(&mut self) -> &mut Interpreter {
		self.interpreter.get_or_insert_with(|| {
			info!("starting interpreter, import dir `{}`", self.config.import_dir.display());
			let output = self.output.take().unwrap_or_else(|| Box::new(io::stdout()));
			let mut interpreter = Interpreter::with_drivers(output, self.drivers.clone());
			interpreter.set_max_steps(self.config.max_steps);
			interpreter.set_max_call_depth(self.config.max_depth);
			interpreter
		})
	}
}
