use crate::{
	error::scanner::{ScanError, ScanErrorType},
	scanner::{Token, TokenKind},
};

/// Failure of a whole parse: either the machinery broke or the unit had syntax
/// errors. Syntax errors are collected so one pass reports all of them.
#[derive(thiserror::Error, Debug)]
pub enum ParserError {
	/// Internal parser error, should never happen
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	/// Every syntax error found in the unit
	#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
	SyntaxErrors(Vec<ParseError>),
}

/// A syntax error with the position and text of the offending token.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[{line}:{column}] Parsing error {}: {type}", near(.lexeme))]
pub struct ParseError {
	pub line:   usize,
	pub column: usize,
	/// Offending lexeme, `None` at end of input.
	pub lexeme: Option<String>,
	pub r#type: ParseErrorType,
}

fn near(lexeme: &Option<String>) -> String {
	match lexeme.as_deref() {
		None => "at end".to_string(),
		Some(l) if l.starts_with('\n') || l.starts_with(';') => "at end of line".to_string(),
		Some(l) => format!("near of `{l}`"),
	}
}

impl ParseError {
	pub fn new(token: &Token, r#type: ParseErrorType) -> Self {
		let lexeme = (token.kind != TokenKind::Eof).then(|| token.lexeme.clone());
		Self { line: token.line, column: token.column, lexeme, r#type }
	}
}

impl From<ScanError> for ParseError {
	fn from(error: ScanError) -> Self {
		let lexeme = match &error.r#type {
			ScanErrorType::UnexpectedCharacter(c) => c.to_string(),
			ScanErrorType::InvalidNumber(text) => text.clone(),
		};
		Self { line: error.line, column: error.column, lexeme: Some(lexeme), r#type: ParseErrorType::Scan(error.r#type) }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
	/// A required token is missing; carries the full diagnostic.
	Expected(&'static str),
	/// The token cannot start an expression.
	UnexpectedPrimary,
	/// Assignment to something that is neither an identifier nor a member.
	InvalidAssignmentTarget,
	/// `release` of something other than a plain identifier.
	InvalidRelease,
	/// The import resolver could not provide the module source.
	UnresolvedImport { module: String, reason: String },
	/// A module that (transitively) imports itself.
	CircularImport(String),
	/// A syntax error inside an imported module.
	InModule { module: String, error: Box<ParseError> },
	/// A lexical error surfaced through the parser.
	Scan(ScanErrorType),
}

impl std::fmt::Display for ParseErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorType::*;
		match self {
			Expected(message) => write!(f, "{message}"),
			UnexpectedPrimary => write!(f, "Unexpected primary expression."),
			InvalidAssignmentTarget => write!(f, "Invalid left-hand side in assignment expression."),
			InvalidRelease => write!(f, "Invalid RELEASE expression."),
			UnresolvedImport { module, reason } => write!(f, "Invalid module path or file name `{module}`: {reason}"),
			CircularImport(module) => write!(f, "Circular import of module `{module}`."),
			InModule { module, error } => write!(f, "in module `{module}`: {error}"),
			Scan(kind) => write!(f, "{kind}"),
		}
	}
}
