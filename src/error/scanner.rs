/// A specific scanning error with its position and type.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[{line}:{column}] Scanning error: {type}")]
pub struct ScanError {
	/// The line number where the error occurred.
	pub line:   usize,
	/// The column of the offending character.
	pub column: usize,
	/// The type of scanning error.
	pub r#type: ScanErrorType,
}

impl ScanError {
	pub fn new(line: usize, column: usize, r#type: ScanErrorType) -> Self { Self { line, column, r#type } }
}

/// Types of scanning errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanErrorType {
	/// No rule matched this character.
	UnexpectedCharacter(char),
	/// Digits and dots that do not form a number, e.g. `1.2.3`.
	InvalidNumber(String),
}

impl std::fmt::Display for ScanErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ScanErrorType::*;
		match self {
			UnexpectedCharacter(c) => {
				write!(f, "Unexpected character '{c}'")
			}
			InvalidNumber(text) => {
				write!(f, "Invalid number literal '{text}'")
			}
		}
	}
}
