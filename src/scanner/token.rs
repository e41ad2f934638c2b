use std::fmt::Display;

/// A token produced by the scanner. Tokens are immutable once produced and
/// own their lexeme so the AST can outlive the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind:     TokenKind,
	pub category: Category,
	pub lexeme:   String,
	pub literal:  Literal,
	pub line:     usize,
	pub column:   usize,
}

impl Token {
	pub fn new(kind: TokenKind, category: Category, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
		Self { kind, category, lexeme: lexeme.into(), literal: Literal::None, line, column }
	}

	pub fn with_literal(mut self, literal: Literal) -> Self {
		self.literal = literal;
		self
	}

	pub fn eof(line: usize, column: usize) -> Self { Self::new(TokenKind::Eof, Category::Generic, "", line, column) }
}

/// Value of a literal token, resolved at scan time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Literal {
	#[default]
	None,
	Null,
	Boolean(bool),
	Number(f64),
	String(String),
}

impl Display for Literal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal::None => Ok(()),
			Literal::Null => write!(f, "null"),
			Literal::Boolean(b) => write!(f, "{b}"),
			Literal::Number(n) => write!(f, "{n}"),
			Literal::String(s) => write!(f, "\"{s}\""),
		}
	}
}

/// Coarse token kind, what the parser dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// Statement separator: newlines, or `;` right before a newline.
	Separator,
	/// Left parenthesis `(`.
	LeftParen,
	/// Right parenthesis `)`.
	RightParen,
	/// Left bracket `[`.
	LeftBracket,
	/// Right bracket `]`.
	RightBracket,
	/// Comma `,`.
	Comma,
	/// Dot `.`.
	Dot,
	/// Colon `:`.
	Colon,
	/// Question mark `?`, print shorthand.
	Question,
	/// Ampersand `&`, macro substitution prefix.
	Ampersand,

	/// `=`.
	SimpleAssign,
	/// `+=`, `-=`, `*=`, `/=`.
	ComplexAssign,
	/// `<`, `<=`, `>`, `>=`.
	RelationalOperator,
	/// `==`, `!=`.
	EqualityOperator,
	/// `+`, `-`.
	TermOperator,
	/// `*`, `/`.
	FactorOperator,
	/// `.and.`, `and`.
	LogicalAnd,
	/// `.or.`, `or`.
	LogicalOr,
	/// `!`.
	LogicalNot,

	Number,
	String,
	Identifier,

	As,
	Local,
	Public,
	Const,
	If,
	Then,
	Else,
	EndIf,
	True,
	False,
	Null,
	Return,
	While,
	EndWhile,
	EndDo,
	Repeat,
	Print,
	Until,
	Class,
	EndClass,
	This,
	CreateObject,
	For,
	To,
	Step,
	EndFor,
	DoDefault,
	Function,
	LParameters,
	EndFunc,
	Do,
	Case,
	Otherwise,
	EndCase,
	Exit,
	Loop,
	Private,
	Import,
	Module,
	EndModule,
	Release,
	Defer,
	EndDefer,

	Eof,
}

/// Fine grained classification. Operator tokens carry the semantic operation
/// derived from their lexeme so the evaluator never re-reads lexeme text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	Generic,
	Literal,
	Keyword,
	Identifier,
	Plus,
	Minus,
	Mul,
	Div,
	Less,
	LessEq,
	Greater,
	GreaterEq,
	Equal,
	NotEq,
	Bang,
	Assign,
	And,
	Or,
}

impl Category {
	/// Category of an operator lexeme. Compound assignments map to the
	/// arithmetic operation they apply.
	pub fn of_operator(lexeme: &str) -> Self {
		use Category::*;

		match lexeme {
			"+" | "+=" => Plus,
			"-" | "-=" => Minus,
			"*" | "*=" => Mul,
			"/" | "/=" => Div,
			"<" => Less,
			"<=" => LessEq,
			">" => Greater,
			">=" => GreaterEq,
			"==" => Equal,
			"!=" => NotEq,
			"!" => Bang,
			"=" => Assign,
			_ => Generic,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn operator_categories() {
		assert_eq!(Category::of_operator("+="), Category::Plus);
		assert_eq!(Category::of_operator("/"), Category::Div);
		assert_eq!(Category::of_operator("<="), Category::LessEq);
		assert_eq!(Category::of_operator("!="), Category::NotEq);
		assert_eq!(Category::of_operator("??"), Category::Generic);
	}
}
