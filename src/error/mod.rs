pub mod interpreter;
pub mod parser;
pub mod scanner;

use interpreter::RuntimeError;
use parser::{ParseError, ParserError};

/// Exit code for a bad command line.
pub const EXIT_USAGE: i32 = 64;
/// Exit code for a source unit with syntax errors.
pub const EXIT_SYNTAX: i32 = 65;
/// Exit code for a failed execution.
pub const EXIT_SOFTWARE: i32 = 70;

/// FoxError is the top-level error type for the FoxDream interpreter.
#[derive(thiserror::Error, Debug)]
pub enum FoxError {
	/// Internal interpreter error, mostly I/O around the run
	#[error("InternalError: {0:#}")]
	InternalError(#[from] anyhow::Error),
	/// Syntax errors encountered during scanning and parsing
	#[error("{}", display_errors(.0))]
	SyntaxErrors(Vec<ParseError>),
	/// Runtime error that aborted the unit
	#[error("{0}")]
	RuntimeError(#[from] RuntimeError),
}

impl FoxError {
	/// Process exit code for this failure.
	pub fn exit_code(&self) -> i32 {
		match self {
			FoxError::SyntaxErrors(_) => EXIT_SYNTAX,
			FoxError::RuntimeError(_) | FoxError::InternalError(_) => EXIT_SOFTWARE,
		}
	}
}

impl From<ParserError> for FoxError {
	fn from(error: ParserError) -> Self {
		match error {
			ParserError::InternalError(e) => FoxError::InternalError(e),
			ParserError::SyntaxErrors(errors) => FoxError::SyntaxErrors(errors),
		}
	}
}

fn display_errors(errors: &[ParseError]) -> String {
	errors.iter().map(|e| format!("{}", e)).collect::<Vec<String>>().join("\n")
}
