//! Expression AST nodes
//!
//! An `Expression` is a tree structure representing code like
//! `total + items.len() * 2` as nested nodes. The variant set is closed; the
//! interpreter dispatches on it with a single `match`.

use std::fmt::Display;

use Expression::*;

use crate::scanner::Token;

/// Expression AST nodes
#[derive(Debug, Clone)]
pub enum Expression {
	/// Number, string, boolean or null. The value sits on the token.
	Literal(Token),
	Identifier(Token),
	Unary {
		operator: Token,
		right:    Box<Expression>,
	},
	Binary {
		left:     Box<Expression>,
		operator: Token,
		right:    Box<Expression>,
	},
	/// Short circuiting `and`/`or`.
	Logical {
		left:     Box<Expression>,
		operator: Token,
		right:    Box<Expression>,
	},
	/// `object.name` (not computed) or `object[expression]` (computed).
	Member {
		token:    Token,
		computed: bool,
		object:   Box<Expression>,
		property: Box<Expression>,
	},
	Call {
		token:     Token,
		callee:    Box<Expression>,
		arguments: Vec<NamedArgument>,
	},
	/// `createobject("name", args...)`
	CreateObject {
		token:     Token,
		name:      Token,
		arguments: Vec<Expression>,
	},
	/// `consequence if condition [else alternative]`
	Conditional {
		token:       Token,
		condition:   Box<Expression>,
		consequence: Box<Expression>,
		alternative: Option<Box<Expression>>,
	},
	This(Token),
	/// `&name`, reserved for macro substitution.
	Macro(Token),
}

/// A call argument: positional when `label` is `None`, otherwise `label: value`.
#[derive(Debug, Clone)]
pub struct NamedArgument {
	pub token: Token,
	pub label: Option<String>,
	pub value: Expression,
}

impl NamedArgument {
	/// The bare `_` placeholder marks an argument as explicitly omitted.
	pub fn is_omitted(&self) -> bool { matches!(&self.value, Identifier(t) if t.lexeme == "_") }
}

impl Expression {
	pub fn unary(operator: Token, right: Self) -> Self { Unary { operator, right: Box::new(right) } }

	pub fn binary(left: Self, operator: Token, right: Self) -> Self {
		Binary { left: Box::new(left), operator, right: Box::new(right) }
	}

	pub fn logical(left: Self, operator: Token, right: Self) -> Self {
		Logical { left: Box::new(left), operator, right: Box::new(right) }
	}

	pub fn member(token: Token, computed: bool, object: Self, property: Self) -> Self {
		Member { token, computed, object: Box::new(object), property: Box::new(property) }
	}

	pub fn call(token: Token, callee: Self, arguments: Vec<NamedArgument>) -> Self {
		Call { token, callee: Box::new(callee), arguments }
	}

	pub fn conditional(token: Token, consequence: Self, condition: Self, alternative: Option<Self>) -> Self {
		Conditional {
			token,
			condition: Box::new(condition),
			consequence: Box::new(consequence),
			alternative: alternative.map(Box::new),
		}
	}

	/// The token diagnostics point at.
	pub fn token(&self) -> &Token {
		match self {
			Literal(token) | Identifier(token) | This(token) | Macro(token) => token,
			Unary { operator, .. } | Binary { operator, .. } | Logical { operator, .. } => operator,
			Member { token, .. } | Call { token, .. } | CreateObject { token, .. } | Conditional { token, .. } => token,
		}
	}

	/// The name a call site uses for its callee: the identifier itself, or the
	/// last property of a member chain (`list.add` gives `add`).
	pub fn callee_name(&self) -> Option<&str> {
		match self {
			Identifier(token) => Some(&token.lexeme),
			Member { computed: false, property, .. } => property.callee_name(),
			_ => None,
		}
	}
}

impl Display for Expression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal(token) => write!(f, "{}", token.literal),
			Identifier(token) => write!(f, "{}", token.lexeme),
			Unary { operator, right } => write!(f, "({} {right})", operator.lexeme),
			Binary { left, operator, right } | Logical { left, operator, right } => {
				write!(f, "({} {left} {right})", operator.lexeme.to_lowercase())
			}
			Member { computed: false, object, property, .. } => write!(f, "(. {object} {property})"),
			Member { computed: true, object, property, .. } => write!(f, "([] {object} {property})"),
			Call { callee, arguments, .. } => {
				write!(f, "(call {callee}")?;
				for argument in arguments {
					write!(f, " {argument}")?;
				}
				write!(f, ")")
			}
			CreateObject { name, arguments, .. } => {
				write!(f, "(createobject {}", name.literal)?;
				for argument in arguments {
					write!(f, " {argument}")?;
				}
				write!(f, ")")
			}
			Conditional { condition, consequence, alternative: Some(alternative), .. } => {
				write!(f, "(if {condition} {consequence} {alternative})")
			}
			Conditional { condition, consequence, alternative: None, .. } => write!(f, "(if {condition} {consequence})"),
			This(_) => write!(f, "this"),
			Macro(token) => write!(f, "&{}", token.lexeme),
		}
	}
}

impl Display for NamedArgument {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.label {
			Some(label) => write!(f, "{label}: {}", self.value),
			None => write!(f, "{}", self.value),
		}
	}
}
