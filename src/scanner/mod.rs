//! Turns source text into a token stream.
//!
//! Tokenization is table driven: the scanner keeps an ordered list of
//! recognizer rules (see [`rules`]) and at every position takes the first rule
//! whose pattern matches the remaining input. This is priority matching, not
//! maximal munch. The table order is what makes `and` a logical operator and
//! `endif` a keyword rather than identifiers, so rules are never reordered for
//! speed.
//!
//! Statements are terminated by separators instead of a statement keyword:
//! one or more newlines, or a `;` immediately followed by a newline, produce a
//! single [`TokenKind::Separator`]. A lone `;` anywhere else is insignificant.
//! Runs of separators collapse into one and nothing is emitted before the
//! first real token.
mod rules;
mod token;

use anyhow::anyhow;
use log::trace;
use rules::{Action, RULES};
pub use token::*;

use crate::error::scanner::{ScanError, ScanErrorType};

/// Tokens of one source unit together with the errors found while scanning.
/// Scanning never stops at the first bad character.
#[derive(Debug)]
pub struct Scanned {
	pub tokens: Vec<Token>,
	pub errors: Vec<ScanError>,
}

/// A scanner for FoxDream source code.
pub struct Scanner<'a> {
	/// User input source code
	source: &'a str,
	/// Byte offset of the next unread character
	cursor: usize,
	/// Line of the next unread character
	line:   usize,
	/// Column of the next unread character
	column: usize,
	tokens: Vec<Token>,
	errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		Self { source, cursor: 0, line: 1, column: 1, tokens: Vec::new(), errors: Vec::new() }
	}

	/// Scan all tokens from the source code. The only hard failure is an
	/// unusable rule table; lexical errors are collected in [`Scanned::errors`].
	pub fn scan_tokens(mut self) -> anyhow::Result<Scanned> {
		let rules = RULES.as_ref().map_err(|e| anyhow!("invalid scanner rule: {e}"))?;
		// A trailing newline guarantees the last statement is terminated.
		let owned;
		let source = if self.source.ends_with('\n') {
			self.source
		} else {
			owned = format!("{}\n", self.source);
			owned.as_str()
		};

		while self.cursor < source.len() {
			let rest = &source[self.cursor..];
			let matched = rules.iter().find_map(|rule| rule.pattern.find(rest).map(|m| (rule, m.as_str())));
			match matched {
				Some((rule, text)) if !text.is_empty() => self.emit(&rule.action, text),
				_ => {
					let Some(c) = rest.chars().next() else { break };
					self.errors.push(ScanError::new(self.line, self.column, ScanErrorType::UnexpectedCharacter(c)));
					self.consume(&rest[..c.len_utf8()]);
				}
			}
		}

		self.tokens.push(Token::eof(self.line, self.column));
		trace!("scanned {} tokens, {} errors", self.tokens.len(), self.errors.len());
		Ok(Scanned { tokens: self.tokens, errors: self.errors })
	}

	/// Produce the token for `text` according to `action`, then move past it.
	fn emit(&mut self, action: &Action, text: &str) {
		let (line, column) = (self.line, self.column);
		let token = match action {
			Action::Skip => None,
			Action::Separator => {
				let collapse = self.tokens.last().is_none_or(|t| t.kind == TokenKind::Separator);
				(!collapse).then(|| Token::new(TokenKind::Separator, Category::Generic, text, line, column))
			}
			Action::Number => match text.replace('_', "").parse::<f64>() {
				Ok(n) => Some(
					Token::new(TokenKind::Number, Category::Literal, text, line, column).with_literal(Literal::Number(n)),
				),
				Err(_) => {
					self.errors.push(ScanError::new(line, column, ScanErrorType::InvalidNumber(text.to_string())));
					None
				}
			},
			Action::QuotedString => {
				let content = unescape(&text[1..text.len() - 1]);
				Some(
					Token::new(TokenKind::String, Category::Literal, text, line, column)
						.with_literal(Literal::String(content)),
				)
			}
			Action::RawString => {
				let content = text[1..text.len() - 1].to_string();
				Some(
					Token::new(TokenKind::String, Category::Literal, text, line, column)
						.with_literal(Literal::String(content)),
				)
			}
			Action::Operator(kind) => Some(Token::new(*kind, Category::of_operator(text), text, line, column)),
			Action::Logical(kind, category) => Some(Token::new(*kind, *category, text, line, column)),
			Action::Keyword(kind) => Some(Token::new(*kind, Category::Keyword, text, line, column)),
			Action::Constant(kind, literal) => {
				Some(Token::new(*kind, Category::Literal, text, line, column).with_literal(literal.clone()))
			}
			Action::Identifier => Some(Token::new(TokenKind::Identifier, Category::Identifier, text, line, column)),
			Action::Punctuation(kind) => Some(Token::new(*kind, Category::Generic, text, line, column)),
		};
		if let Some(token) = token {
			self.tokens.push(token);
		}
		self.consume(text);
	}

	/// Advance over `text`, keeping line and column in sync.
	fn consume(&mut self, text: &str) {
		for c in text.chars() {
			if c == '\n' {
				self.line += 1;
				self.column = 1;
			} else {
				self.column += 1;
			}
		}
		self.cursor += text.len();
	}
}

/// Decode the escapes of a quoted string. Unknown escapes are kept verbatim.
fn unescape(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	let mut chars = raw.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('r') => out.push('\r'),
			Some('n') => out.push('\n'),
			Some('t') => out.push('\t'),
			Some('"') => out.push('"'),
			Some('\'') => out.push('\''),
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use TokenKind::*;

	fn scan(input: &str, ok: bool) -> Vec<Token> {
		let scanned = Scanner::new(input).scan_tokens().unwrap();
		assert_eq!(scanned.errors.is_empty(), ok, "input: {input:?}, errors: {:?}", scanned.errors);
		scanned.tokens
	}

	fn kinds(input: &str) -> Vec<TokenKind> { scan(input, true).into_iter().map(|t| t.kind).collect() }

	#[test]
	fn scan_punctuation() {
		assert_eq!(kinds("( ) [ ] , . : ?"), vec![
			LeftParen,
			RightParen,
			LeftBracket,
			RightBracket,
			Comma,
			Dot,
			Colon,
			Question,
			Separator,
			Eof
		]);
	}

	#[test]
	fn scan_operators() {
		let tokens = scan("a += 1 - 2 * 3 / 4 <= 5 != 6", true);
		let categories: Vec<Category> =
			tokens.iter().filter(|t| t.category != Category::Literal).map(|t| t.category).collect();
		assert_eq!(categories, vec![
			Category::Identifier,
			Category::Plus,
			Category::Minus,
			Category::Mul,
			Category::Div,
			Category::LessEq,
			Category::NotEq,
			Category::Generic,
			Category::Generic
		]);
		assert_eq!(tokens[1].kind, ComplexAssign);
		assert_eq!(tokens[9].kind, RelationalOperator);
	}

	#[test]
	fn scan_numbers() {
		let tokens = scan("1_000 3.25 1_0.5", true);
		assert_eq!(tokens[0].literal, Literal::Number(1000.0));
		assert_eq!(tokens[1].literal, Literal::Number(3.25));
		assert_eq!(tokens[2].literal, Literal::Number(10.5));
		scan("1.2.3", false);
	}

	#[test]
	fn scan_strings() {
		let tokens = scan(r#""a\tb\"c" 'it\'s' `raw\n`"#, true);
		assert_eq!(tokens[0].literal, Literal::String("a\tb\"c".into()));
		assert_eq!(tokens[1].literal, Literal::String("it's".into()));
		assert_eq!(tokens[2].literal, Literal::String("raw\\n".into()));
	}

	#[test]
	fn scan_keywords_case_insensitively() {
		assert_eq!(kinds("IF x THEN"), vec![If, Identifier, Then, Separator, Eof]);
		assert_eq!(kinds("EndFunc"), vec![EndFunc, Separator, Eof]);
		assert_eq!(kinds("iffy endiff"), vec![Identifier, Identifier, Separator, Eof]);
	}

	#[test]
	fn scan_literal_keywords() {
		let tokens = scan(".T. false .null. True", true);
		assert_eq!(tokens[0].literal, Literal::Boolean(true));
		assert_eq!(tokens[1].literal, Literal::Boolean(false));
		assert_eq!(tokens[2].literal, Literal::Null);
		assert_eq!(tokens[3].literal, Literal::Boolean(true));
		assert_eq!(scan("trueish", true)[0].kind, Identifier);
	}

	#[test]
	fn scan_logical_operators() {
		assert_eq!(kinds("a .and. b or !c"), vec![
			Identifier, LogicalAnd, Identifier, LogicalOr, LogicalNot, Identifier, Separator, Eof
		]);
		assert_eq!(kinds("android"), vec![Identifier, Separator, Eof]);
	}

	#[test]
	fn scan_separators() {
		assert_eq!(kinds("\n\na\n\n\n\nb"), vec![Identifier, Separator, Identifier, Separator, Eof]);
		assert_eq!(kinds("a;\nb"), vec![Identifier, Separator, Identifier, Separator, Eof]);
		assert_eq!(kinds("a; b"), vec![Identifier, Identifier, Separator, Eof]);
		assert_eq!(kinds("a \n  \n b"), vec![Identifier, Separator, Identifier, Separator, Eof]);
	}

	#[test]
	fn scan_comments() {
		assert_eq!(kinds("a // note\nb"), vec![Identifier, Separator, Identifier, Separator, Eof]);
		assert_eq!(kinds("a /* multi\nline */ b"), vec![Identifier, Identifier, Separator, Eof]);
	}

	#[test]
	fn scan_positions() {
		let tokens = scan("local x\n  y = 1", true);
		assert_eq!((tokens[1].line, tokens[1].column), (1, 7));
		assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
	}

	#[test]
	fn scan_recovers_from_unexpected_characters() {
		let scanned = Scanner::new("a @ b # c").scan_tokens().unwrap();
		assert_eq!(scanned.errors.len(), 2);
		let identifiers = scanned.tokens.iter().filter(|t| t.kind == Identifier).count();
		assert_eq!(identifiers, 3);
	}
}
