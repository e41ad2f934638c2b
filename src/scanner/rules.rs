//! The ordered recognizer table. Earlier rules win.

use std::sync::LazyLock;

use regex::Regex;

use super::{Category, Literal, TokenKind};

/// What the scanner does with the text a rule matched.
#[derive(Debug)]
pub(super) enum Action {
	Skip,
	Separator,
	Number,
	QuotedString,
	RawString,
	Operator(TokenKind),
	Logical(TokenKind, Category),
	Keyword(TokenKind),
	Constant(TokenKind, Literal),
	Identifier,
	Punctuation(TokenKind),
}

pub(super) struct Rule {
	pub pattern: Regex,
	pub action:  Action,
}

pub(super) static RULES: LazyLock<Result<Vec<Rule>, regex::Error>> = LazyLock::new(build);

#[rustfmt::skip]
const KEYWORDS: &[(&str, TokenKind)] = {
	use TokenKind::*;
	&[
		("as", As), ("local", Local), ("public", Public), ("const", Const),
		("if", If), ("then", Then), ("else", Else), ("endif", EndIf),
	]
};

#[rustfmt::skip]
const LATE_KEYWORDS: &[(&str, TokenKind)] = {
	use TokenKind::*;
	&[
		("return", Return), ("while", While), ("endwhile", EndWhile), ("enddo", EndDo),
		("repeat", Repeat), ("print", Print), ("until", Until), ("class", Class),
		("endclass", EndClass), ("this", This), ("createobject", CreateObject), ("for", For),
		("to", To), ("step", Step), ("endfor", EndFor), ("dodefault", DoDefault),
		("function", Function), ("lparameters", LParameters), ("endfunc", EndFunc), ("do", Do),
		("case", Case), ("otherwise", Otherwise), ("endcase", EndCase), ("exit", Exit),
		("loop", Loop), ("private", Private), ("import", Import), ("module", Module),
		("endmodule", EndModule), ("release", Release), ("defer", Defer), ("enddefer", EndDefer),
	]
};

#[rustfmt::skip]
const PUNCTUATION: &[(&str, TokenKind)] = {
	use TokenKind::*;
	&[
		(r"\(", LeftParen), (r"\)", RightParen), (r"\[", LeftBracket), (r"\]", RightBracket),
		(",", Comma), (r"\.", Dot), (":", Colon), (r"\?", Question), ("&", Ampersand),
	]
};

fn rule(pattern: &str, action: Action) -> Result<Rule, regex::Error> {
	Ok(Rule { pattern: Regex::new(&format!("^(?:{pattern})"))?, action })
}

fn keyword((word, kind): &(&str, TokenKind)) -> Result<Rule, regex::Error> {
	rule(&format!(r"(?i){word}\b"), Action::Keyword(*kind))
}

fn build() -> Result<Vec<Rule>, regex::Error> {
	use Action::*;

	let mut rules = vec![
		rule(r"[ \t\r\f]+", Skip)?,
		rule(r"//.*", Skip)?,
		rule(r"/\*[\s\S]*?\*/", Skip)?,
		rule(r";[ \t\r\f]*\n+", Separator)?,
		rule(";", Skip)?,
		rule(r"\n+", Separator)?,
		rule(r"[0-9]+[_.0-9]*", Number)?,
		rule(r#""(?:[^"\\]|\\[\s\S])*""#, QuotedString)?,
		rule(r"'(?:[^'\\]|\\[\s\S])*'", QuotedString)?,
		rule(r"`[^`]*`", RawString)?,
		rule(r"[<>]=?", Operator(TokenKind::RelationalOperator))?,
		rule(r"[=!]=", Operator(TokenKind::EqualityOperator))?,
		rule(r"(?i)\.and\.|and\b", Logical(TokenKind::LogicalAnd, Category::And))?,
		rule(r"(?i)\.or\.|or\b", Logical(TokenKind::LogicalOr, Category::Or))?,
		rule("!", Operator(TokenKind::LogicalNot))?,
	];
	for entry in KEYWORDS {
		rules.push(keyword(entry)?);
	}
	rules.push(rule(r"(?i)\.t\.|\.true\.|true\b", Constant(TokenKind::True, Literal::Boolean(true)))?);
	rules.push(rule(r"(?i)\.f\.|\.false\.|false\b", Constant(TokenKind::False, Literal::Boolean(false)))?);
	rules.push(rule(r"(?i)\.null\.|null\b", Constant(TokenKind::Null, Literal::Null))?);
	for entry in LATE_KEYWORDS {
		rules.push(keyword(entry)?);
	}
	rules.push(rule("=", Operator(TokenKind::SimpleAssign))?);
	rules.push(rule(r"[+\-*/]=", Operator(TokenKind::ComplexAssign))?);
	rules.push(rule(r"[+\-]", Operator(TokenKind::TermOperator))?);
	rules.push(rule(r"[*/]", Operator(TokenKind::FactorOperator))?);
	rules.push(rule(r"\w+", Identifier)?);
	for (pattern, kind) in PUNCTUATION {
		rules.push(rule(pattern, Punctuation(*kind))?);
	}
	Ok(rules)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_compiles() { assert!(RULES.as_ref().is_ok()) }

	#[test]
	fn keywords_precede_identifiers() {
		let rules = RULES.as_ref().unwrap();
		let identifier = rules.iter().position(|r| matches!(r.action, Action::Identifier)).unwrap();
		let last_keyword = rules.iter().rposition(|r| matches!(r.action, Action::Keyword(_))).unwrap();
		assert!(last_keyword < identifier);
	}
}
