//! There is no place in the grammar where both an expression and a statement
//! are allowed. Compound statements own their bodies as [`Block`]s; every
//! block is closed by its own keyword (`endif`, `enddo`, `endfor`, ...) and
//! there is no free standing brace block.

use std::{fmt::Display, rc::Rc};

use crate::{parser::expression::Expression, scanner::Token};

/// A statement in the programming language.
#[derive(Debug)]
pub enum Statement {
	/// An expression used as a statement.
	Expression(Expression),
	/// `print a, b` or `? a, b`.
	Print { token: Token, expressions: Vec<Expression> },
	/// `return [a [, b ...]]`.
	Return { token: Token, values: Vec<Expression> },
	/// `local ...` or `public ...`.
	VarDeclaration { token: Token, scope: DeclarationScope, form: DeclarationForm },
	If { token: Token, condition: Expression, then_branch: Block, else_branch: Block },
	DoCase { token: Token, branches: Vec<CaseBranch>, otherwise: Option<Block> },
	/// Pre-test loop, `do while cond ... enddo`.
	DoWhile { token: Token, condition: Expression, body: Block },
	/// Post-test loop, `do ... while cond`.
	Do { token: Token, condition: Expression, body: Block },
	Exit(Token),
	Loop(Token),
	For {
		token:    Token,
		variable: Token,
		start:    Expression,
		end:      Expression,
		step:     Option<Expression>,
		body:     Block,
	},
	Function(Rc<FunctionDeclaration>),
	Class(Rc<ClassDeclaration>),
	Const { token: Token, name: Token, value: Expression },
	Module { token: Token, name: Token, body: Vec<Statement> },
	Release { token: Token, targets: Vec<Token> },
	/// Only reachable at top level or inside blocks; function bodies collect
	/// their defers into [`FunctionDeclaration::defers`].
	Defer(Block),
	SimpleAssignment { token: Token, target: Expression, value: Expression },
	/// `target op= value`; the operator token carries the arithmetic category.
	ComplexAssignment { operator: Token, target: Expression, value: Expression },
	MultipleAssignment { token: Token, targets: Vec<Expression>, values: Vec<Expression> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationScope {
	Local,
	Public,
}

#[derive(Debug)]
pub enum DeclarationForm {
	/// `local a as number, b = 2`
	Each(Vec<VariableDeclarator>),
	/// `local (a, b) = 1, 2`
	Destructure { names: Vec<Token>, values: Vec<Expression> },
}

#[derive(Debug)]
pub struct VariableDeclarator {
	pub name:        Token,
	/// Optional `as type` annotation, only consulted for the default value.
	pub type_name:   Option<Token>,
	pub initializer: Option<Expression>,
}

#[derive(Debug)]
pub struct Block {
	pub token:      Token,
	pub statements: Vec<Statement>,
}

#[derive(Debug)]
pub struct CaseBranch {
	pub token:      Token,
	pub conditions: Vec<Expression>,
	pub body:       Block,
}

#[derive(Debug)]
pub struct Parameter {
	pub name:    Token,
	/// External name callers use for named arguments.
	pub alias:   Option<Token>,
	pub default: Option<Expression>,
}

impl Parameter {
	/// Whether a named argument `label` addresses this parameter.
	pub fn accepts(&self, label: &str) -> bool {
		self.name.lexeme.eq_ignore_ascii_case(label) || self.alias.as_ref().is_some_and(|a| a.lexeme.eq_ignore_ascii_case(label))
	}
}

#[derive(Debug)]
pub struct FunctionDeclaration {
	pub token:      Token,
	pub name:       Token,
	pub parameters: Vec<Parameter>,
	pub body:       Vec<Statement>,
	/// Defer blocks in source order; run in reverse after a return.
	pub defers:     Vec<Block>,
}

#[derive(Debug)]
pub struct ClassDeclaration {
	pub token:      Token,
	pub name:       Token,
	pub superclass: Option<Expression>,
	pub properties: Vec<Property>,
	pub methods:    Vec<Rc<FunctionDeclaration>>,
}

#[derive(Debug)]
pub struct Property {
	pub name:  Token,
	pub value: Expression,
}

impl Statement {
	/// The token runtime diagnostics about this statement point at.
	pub fn token(&self) -> &Token {
		use Statement::*;
		match self {
			Statement::Expression(expression) => expression.token(),
			Print { token, .. }
			| Return { token, .. }
			| VarDeclaration { token, .. }
			| If { token, .. }
			| DoCase { token, .. }
			| DoWhile { token, .. }
			| Do { token, .. }
			| For { token, .. }
			| Const { token, .. }
			| Module { token, .. }
			| Release { token, .. }
			| SimpleAssignment { token, .. }
			| MultipleAssignment { token, .. }
			| Exit(token)
			| Loop(token) => token,
			Function(function) => &function.token,
			Class(class) => &class.token,
			Defer(block) => &block.token,
			ComplexAssignment { operator, .. } => operator,
		}
	}
}

fn join<T: Display>(items: &[T]) -> String { items.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ") }

impl Display for Block {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "(block {})", join(&self.statements)) }
}

impl Display for Statement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use Statement::*;
		match self {
			Statement::Expression(expression) => write!(f, "{expression}"),
			Print { expressions, .. } => write!(f, "(print {})", join(expressions)),
			Return { values, .. } => write!(f, "(return {})", join(values)),
			VarDeclaration { scope, form, .. } => {
				let keyword = match scope {
					DeclarationScope::Local => "local",
					DeclarationScope::Public => "public",
				};
				match form {
					DeclarationForm::Each(declarators) => {
						write!(f, "({keyword}")?;
						for declarator in declarators {
							match &declarator.initializer {
								Some(init) => write!(f, " (= {} {init})", declarator.name.lexeme)?,
								None => write!(f, " {}", declarator.name.lexeme)?,
							}
						}
						write!(f, ")")
					}
					DeclarationForm::Destructure { names, values } => {
						let names = names.iter().map(|n| n.lexeme.as_str()).collect::<Vec<_>>().join(" ");
						write!(f, "({keyword} ({names}) {})", join(values))
					}
				}
			}
			If { condition, then_branch, else_branch, .. } => write!(f, "(if {condition} {then_branch} {else_branch})"),
			DoCase { branches, otherwise, .. } => {
				write!(f, "(do-case")?;
				for branch in branches {
					write!(f, " (case {} {})", join(&branch.conditions), branch.body)?;
				}
				if let Some(otherwise) = otherwise {
					write!(f, " (otherwise {otherwise})")?;
				}
				write!(f, ")")
			}
			DoWhile { condition, body, .. } => write!(f, "(do-while {condition} {body})"),
			Do { condition, body, .. } => write!(f, "(do {body} {condition})"),
			Exit(_) => write!(f, "(exit)"),
			Loop(_) => write!(f, "(loop)"),
			For { variable, start, end, step, body, .. } => match step {
				Some(step) => write!(f, "(for {} {start} {end} {step} {body})", variable.lexeme),
				None => write!(f, "(for {} {start} {end} {body})", variable.lexeme),
			},
			Function(function) => {
				let parameters = function.parameters.iter().map(|p| p.name.lexeme.as_str()).collect::<Vec<_>>();
				write!(f, "(function {} ({}) {}", function.name.lexeme, parameters.join(" "), join(&function.body))?;
				for defer in &function.defers {
					write!(f, " (defer {defer})")?;
				}
				write!(f, ")")
			}
			Class(class) => {
				let methods = class.methods.iter().map(|m| m.name.lexeme.as_str()).collect::<Vec<_>>();
				write!(f, "(class {} ({}))", class.name.lexeme, methods.join(" "))
			}
			Const { name, value, .. } => write!(f, "(const {} {value})", name.lexeme),
			Module { name, body, .. } => write!(f, "(module {} {})", name.lexeme, join(body)),
			Release { targets, .. } => {
				let names = targets.iter().map(|t| t.lexeme.as_str()).collect::<Vec<_>>();
				write!(f, "(release {})", names.join(" "))
			}
			Defer(body) => write!(f, "(defer {body})"),
			SimpleAssignment { target, value, .. } => write!(f, "(= {target} {value})"),
			ComplexAssignment { operator, target, value } => write!(f, "({} {target} {value})", operator.lexeme),
			MultipleAssignment { targets, values, .. } => write!(f, "(= ({}) {})", join(targets), join(values)),
		}
	}
}
