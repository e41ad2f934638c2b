//! The `Scanner` use `Lexical grammar`, implement `alphabet` as `Characters`,
//! `string` as `Lexme` or `Token`
//! The `Parser` use `Syntactic grammar`, implement `alphabet` as `Tokens`,
//! `string` as `Statement` and `Expression`
//!
//! Statements end at a separator token (a newline, or `;` before a newline).
//! Every compound statement is closed by its own keyword, there is no brace
//! block.
//!
//! |Name|Operators|Associates
//! --|--|--
//! Or|.or. or|Left
//! And|.and. and|Left
//! Equality|== !=|Left
//! Comparison|< > <= >=|Left
//! Term|+ -|Left
//! Factor|* /|Left
//! Unary|! - +|Right
//! Postfix|. [] ()|Left
//!
//! Grammar:
//!
//! ``` BNF
//! program        → declaration* EOF ;
//! declaration    → varDecl | constDecl | funDecl | moduleDecl | classDecl | statement ;
//! varDecl        → ( "local" | "public" ) ( declarator ( "," declarator )*
//!                  | "(" names ")" "=" expressions ) SEP ;
//! declarator     → IDENTIFIER ( "as" IDENTIFIER )? ( "=" conditional )? ;
//! statement      → printStmt | returnStmt | ifStmt | doStmt | forStmt | "exit" SEP
//!                  | "loop" SEP | importStmt | releaseStmt | deferStmt
//!                  | multiAssign | exprStmt ;
//! ifStmt         → "if" expression "then"? SEP declaration* ( "else" SEP declaration* )? "endif" SEP ;
//! doStmt         → "do" ( "case" SEP caseBranch* ( "otherwise" SEP declaration* )? "endcase"
//!                  | "while" expression SEP declaration* "enddo"
//!                  | SEP statement* "while" expression ) SEP ;
//! forStmt        → "for" IDENTIFIER "=" expression "to" expression ( "step" expression )? SEP
//!                  declaration* "endfor" SEP ;
//! exprStmt       → expression ( ( "=" | "+=" | "-=" | "*=" | "/=" ) expression )? SEP ;
//! conditional    → expression ( "if" expression ( "else" expression )? )? ;
//! expression     → or ;
//! or             → and ( ".or." and )* ;
//! and            → equality ( ".and." equality )* ;
//! equality       → comparison ( ( "!=" | "==" ) comparison )* ;
//! comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
//! term           → factor ( ( "-" | "+" ) factor )* ;
//! factor         → unary ( ( "/" | "*" ) unary )* ;
//! unary          → ( "!" | "-" | "+" ) unary | postfix ;
//! postfix        → primary ( "." IDENTIFIER | "[" expression "]" | "(" arguments? ")" )* ;
//! arguments      → argument ( "," argument )* ;
//! argument       → ( IDENTIFIER ":" )? expression ;
//! primary        → NUMBER | STRING | "true" | "false" | "null" | IDENTIFIER | "this"
//!                  | "&" IDENTIFIER | "createobject" "(" STRING ( "," expression )* ")"
//!                  | "(" expression ")" ;
//! ```

pub mod expression;

use std::{mem, rc::Rc};

use TokenKind::*;
use expression::{Expression, NamedArgument};
use log::debug;

use crate::{
	error::parser::{ParseError, ParseErrorType, ParserError},
	resolver::SourceResolver,
	scanner::{Scanned, Scanner, Token, TokenKind},
	statement::{
		Block, CaseBranch, ClassDeclaration, DeclarationForm, DeclarationScope, FunctionDeclaration, Parameter,
		Property, Statement, VariableDeclarator,
	},
};

type ParseResult<T> = Result<T, ParseError>;

/// Tokens that start a statement; error recovery resumes at them.
const STATEMENT_START: &[TokenKind] = &[Class, Function, Local, Public, For, If, Do, Print, Return];

/// A recursive-descent parser producing the statements of one source unit.
pub struct Parser {
	tokens:    Vec<Token>,
	current:   usize,
	errors:    Vec<ParseError>,
	/// Provides the source of `import`ed modules.
	resolver:  Rc<dyn SourceResolver>,
	/// Lowercased names of the modules being imported, outermost first.
	importing: Vec<std::string::String>,
}

impl Parser {
	pub fn new(resolver: Rc<dyn SourceResolver>) -> Self {
		Self { tokens: Vec::new(), current: 0, errors: Vec::new(), resolver, importing: Vec::new() }
	}

	/// Parse a unit that is not allowed to import modules.
	#[cfg(test)]
	pub fn parse_source(source: &str) -> Result<Vec<Statement>, ParserError> {
		Parser::new(Rc::new(crate::resolver::NoImports)).parse(source)
	}

	/// Parse a whole source unit. Scan and syntax errors are collected and
	/// reported together; any of them fails the unit.
	pub fn parse(&mut self, source: &str) -> Result<Vec<Statement>, ParserError> {
		let Scanned { tokens, errors } = Scanner::new(source).scan_tokens()?;
		self.tokens = tokens;
		if self.tokens.last().is_none_or(|t| t.kind != Eof) {
			self.tokens.push(Token::eof(1, 1));
		}
		self.current = 0;
		self.errors = errors.into_iter().map(ParseError::from).collect();

		let mut statements = Vec::new();
		while !self.is_at_end() {
			if let Some(statement) = self.declaration() {
				statements.push(statement);
			}
		}

		if self.errors.is_empty() { Ok(statements) } else { Err(ParserError::SyntaxErrors(mem::take(&mut self.errors))) }
	}

	/// Parse one declaration, recovering from a syntax error by skipping to
	/// the next statement boundary.
	fn declaration(&mut self) -> Option<Statement> {
		if self.matches(&[Separator]) {
			return None;
		}
		let kind = self.peek().kind;
		let result = match kind {
			Local | Public | Const | Function | Module | Class => {
				let keyword = self.advance().kind;
				match keyword {
					Local => self.variable_declaration(DeclarationScope::Local),
					Public => self.variable_declaration(DeclarationScope::Public),
					Const => self.constant_declaration(),
					Function => self.function_declaration().map(Statement::Function),
					Module => self.module_declaration(),
					_ => self.class_declaration(),
				}
			}
			_ => self.statement(),
		};
		match result {
			Ok(statement) => Some(statement),
			Err(error) => {
				self.errors.push(error);
				self.synchronize();
				None
			}
		}
	}

	fn statement(&mut self) -> ParseResult<Statement> {
		if self.matches(&[Print, Question]) {
			return self.print_statement();
		}
		if self.matches(&[Return]) {
			return self.return_statement();
		}
		if self.matches(&[If]) {
			return self.if_statement();
		}
		if self.matches(&[Do]) {
			if self.matches(&[Case]) {
				return self.do_case_statement();
			}
			if self.matches(&[While]) {
				return self.do_while_statement();
			}
			return self.do_statement();
		}
		if self.matches(&[Exit, Loop]) {
			let token = self.previous().clone();
			self.consume_separator("Expect new line.")?;
			return Ok(if token.kind == Exit { Statement::Exit(token) } else { Statement::Loop(token) });
		}
		if self.matches(&[For]) {
			return self.for_statement();
		}
		if self.matches(&[Import]) {
			return self.import_statement();
		}
		if self.matches(&[Release]) {
			return self.release_statement();
		}
		if self.matches(&[Defer]) {
			let token = self.previous().clone();
			self.consume_separator("Expect new line after 'DEFER'.")?;
			let statements = self.block_until(&[EndDefer]);
			self.consume(EndDefer, "Expect 'ENDDEFER' after defer block.")?;
			self.consume_separator("Expect new line after 'ENDDEFER'.")?;
			return Ok(Statement::Defer(Block { token, statements }));
		}
		if self.check(LeftParen) && self.closing_paren_then(&[SimpleAssign]) {
			self.advance();
			return self.multiple_assignment();
		}
		self.expression_statement()
	}

	/// `print a, b`, `? a`, or `print(a, b)`.
	fn print_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let parenthesized = self.check(LeftParen) && self.closing_paren_then(&[Separator, Eof]);
		if parenthesized {
			self.advance();
		}
		let expressions = if self.check(Separator) || self.is_at_end() || (parenthesized && self.check(RightParen)) {
			Vec::new()
		} else {
			self.expression_list()?
		};
		if parenthesized {
			self.consume(RightParen, "Expect ')' after expressions.")?;
		}
		self.consume_separator("Expect new line after `print()` statement.")?;
		Ok(Statement::Print { token, expressions })
	}

	fn return_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let mut values = Vec::new();
		if !self.check(Separator) && !self.is_at_end() {
			loop {
				let value = self.expression()?;
				values.push(self.conditional(value)?);
				if !self.matches(&[Comma]) {
					break;
				}
			}
		}
		self.consume_separator("Expect new line after `return` statement.")?;
		Ok(Statement::Return { token, values })
	}

	fn variable_declaration(&mut self, scope: DeclarationScope) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let form = if self.matches(&[LeftParen]) {
			let mut names = Vec::new();
			loop {
				names.push(self.consume(Identifier, "Expect variable name.")?.clone());
				if self.matches(&[As]) {
					self.consume(Identifier, "Expect variable type name.")?;
				}
				if !self.matches(&[Comma]) {
					break;
				}
			}
			self.consume(RightParen, "Expect `)` after variable declarations.")?;
			self.consume(SimpleAssign, "Expect `=` after variable declarations.")?;
			DeclarationForm::Destructure { names, values: self.expression_list()? }
		} else {
			let mut declarators = Vec::new();
			loop {
				let name = self.consume(Identifier, "Expect variable name.")?.clone();
				let type_name =
					if self.matches(&[As]) { Some(self.consume(Identifier, "Expect variable type name.")?.clone()) } else { None };
				let initializer = if self.matches(&[SimpleAssign]) {
					let value = self.expression()?;
					Some(self.conditional(value)?)
				} else {
					None
				};
				declarators.push(VariableDeclarator { name, type_name, initializer });
				if !self.matches(&[Comma]) {
					break;
				}
			}
			DeclarationForm::Each(declarators)
		};
		self.consume_separator("Expect new line after variable declarations.")?;
		Ok(Statement::VarDeclaration { token, scope, form })
	}

	fn constant_declaration(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let name = self.consume(Identifier, "Expect constant name.")?.clone();
		self.consume(SimpleAssign, "Expect `=` after constant name.")?;
		let value = self.expression()?;
		let value = self.conditional(value)?;
		self.consume_separator("Expect new line after constant declaration.")?;
		Ok(Statement::Const { token, name, value })
	}

	fn if_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let condition = self.expression()?;
		self.matches(&[Then]);
		self.consume_separator("Expect new line before block.")?;

		let then_branch = Block { token: token.clone(), statements: self.block_until(&[Else, EndIf]) };
		let mut else_branch = Block { token: token.clone(), statements: Vec::new() };
		if self.matches(&[Else]) {
			self.consume_separator("Expect new line in else branch.")?;
			else_branch.statements = self.block_until(&[EndIf]);
		}
		self.consume(EndIf, "Expect 'ENDIF' after if statement.")?;
		self.consume_separator("Expect new line after if statement.")?;
		Ok(Statement::If { token, condition, then_branch, else_branch })
	}

	fn do_case_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		self.consume_separator("Expect new line after 'CASE'.")?;

		let mut branches = Vec::new();
		while self.matches(&[Case]) {
			let case = self.previous().clone();
			let conditions = self.expression_list()?;
			self.consume_separator("Expect new line after case conditions.")?;
			let body = Block { token: self.peek().clone(), statements: self.block_until(&[Case, Otherwise, EndCase]) };
			branches.push(CaseBranch { token: case, conditions, body });
		}

		let mut otherwise = None;
		if self.matches(&[Otherwise]) {
			let token = self.previous().clone();
			self.consume_separator("Expect new line after otherwise.")?;
			otherwise = Some(Block { token, statements: self.block_until(&[EndCase]) });
		}

		self.consume(EndCase, "Expect keyword 'ENDCASE'.")?;
		self.consume_separator("Expect new line at the end of `DO CASE` statement.")?;
		Ok(Statement::DoCase { token, branches, otherwise })
	}

	fn do_while_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let condition = self.expression()?;
		self.consume_separator("Expect new line after 'WHILE' condition.")?;
		let body = Block { token: token.clone(), statements: self.block_until(&[EndDo]) };
		self.consume(EndDo, "Expect 'ENDDO' after loop body.")?;
		self.consume_separator("Expect new line.")?;
		Ok(Statement::DoWhile { token, condition, body })
	}

	/// Post-test loop. Its body holds plain statements only, no declarations.
	fn do_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		self.consume_separator("Expect new line after 'DO' keyword.")?;

		let mut statements = Vec::new();
		while !self.is_at_end() && !self.check(While) {
			if self.matches(&[Separator]) {
				continue;
			}
			statements.push(self.statement()?);
		}
		self.consume(While, "Expect 'WHILE' after loop body.")?;
		let condition = self.expression()?;
		self.consume_separator("Expect new line.")?;
		Ok(Statement::Do { token: token.clone(), condition, body: Block { token, statements } })
	}

	fn for_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let variable = self.consume(Identifier, "Expect variable name.")?.clone();
		self.consume(SimpleAssign, "Expect '=' after variable name.")?;
		let start = self.expression()?;
		self.consume(To, "Expect keyword 'TO'")?;
		let end = self.expression()?;
		let step = if self.matches(&[Step]) { Some(self.expression()?) } else { None };
		self.consume_separator("Expect new line.")?;

		let body = Block { token: token.clone(), statements: self.block_until(&[EndFor]) };
		self.consume(EndFor, "Expect 'ENDFOR' after loop body.")?;
		self.consume_separator("Expect new line.")?;
		Ok(Statement::For { token, variable, start, end, step, body })
	}

	/// `function name[(parameters)] ... endfunc`. Defer blocks are pulled out
	/// of the body and kept in source order.
	fn function_declaration(&mut self) -> ParseResult<Rc<FunctionDeclaration>> {
		let token = self.previous().clone();
		let name = self.consume(Identifier, "Expect function name.")?.clone();

		let mut parameters = Vec::new();
		if self.matches(&[LeftParen]) {
			if !self.check(RightParen) {
				loop {
					parameters.push(self.parameter()?);
					if !self.matches(&[Comma]) {
						break;
					}
				}
			}
			self.consume(RightParen, "Expect ')' after parameters.")?;
		}
		self.consume_separator("Expect new line.")?;

		let mut body = Vec::new();
		let mut defers = Vec::new();
		for statement in self.block_until(&[EndFunc]) {
			match statement {
				Statement::Defer(block) => defers.push(block),
				statement => body.push(statement),
			}
		}
		self.consume(EndFunc, "Expect 'ENDFUNC' after function body.")?;
		self.consume_separator("Expect new line.")?;
		Ok(Rc::new(FunctionDeclaration { token, name, parameters, body, defers }))
	}

	/// `name [as alias] [= default]`
	fn parameter(&mut self) -> ParseResult<Parameter> {
		let name = self.consume(Identifier, "Expect parameter name.")?.clone();
		let alias =
			if self.matches(&[As]) { Some(self.consume(Identifier, "Expect alias name for parameter.")?.clone()) } else { None };
		let default = if self.matches(&[SimpleAssign]) { Some(self.expression()?) } else { None };
		Ok(Parameter { name, alias, default })
	}

	fn module_declaration(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let name = self.consume(Identifier, "Expect module name.")?.clone();
		self.consume_separator("Expect new line after module name.")?;
		let body = self.block_until(&[EndModule]);
		self.consume(EndModule, "Expect 'ENDMODULE' after module body.")?;
		self.consume_separator("Expect new line.")?;
		Ok(Statement::Module { token, name, body })
	}

	/// `class Name [as Super]` followed by `name = value` properties and
	/// function methods, closed by `endclass`.
	fn class_declaration(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let name = self.consume(Identifier, "Expect class name.")?.clone();
		let superclass = if self.matches(&[As]) {
			Some(Expression::Identifier(self.consume(Identifier, "Expect superclass name.")?.clone()))
		} else {
			None
		};
		self.consume_separator("Expect new line after class name.")?;

		let mut properties = Vec::new();
		let mut methods = Vec::new();
		while !self.is_at_end() && !self.check(EndClass) {
			if self.matches(&[Separator]) {
				continue;
			}
			if self.matches(&[Function]) {
				methods.push(self.function_declaration()?);
				continue;
			}
			let name = self.consume(Identifier, "Expect property name.")?.clone();
			self.consume(SimpleAssign, "Expect `=` after property name.")?;
			let value = self.expression()?;
			self.consume_separator("Expect new line after property.")?;
			properties.push(Property { name, value });
		}
		self.consume(EndClass, "Expect 'ENDCLASS' after class body.")?;
		self.consume_separator("Expect new line.")?;
		Ok(Statement::Class(Rc::new(ClassDeclaration { token, name, superclass, properties, methods })))
	}

	/// Resolve, wrap and parse an imported unit into a module declaration.
	fn import_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let name = self.consume(Identifier, "Expect import name.")?.lexeme.clone();
		self.consume_separator("Expect new line after import name.")?;

		let key = name.to_lowercase();
		if self.importing.contains(&key) {
			return Err(ParseError::new(&token, ParseErrorType::CircularImport(name)));
		}
		let unresolved = |reason: std::string::String| ParseError::new(&token, ParseErrorType::UnresolvedImport {
			module: name.clone(),
			reason,
		});
		let source = self.resolver.resolve(&name).map_err(|e| unresolved(format!("{e:#}")))?;
		debug!("importing module `{name}`");

		let mut parser = Parser::new(self.resolver.clone());
		parser.importing = self.importing.iter().cloned().chain([key]).collect();
		match parser.parse(&format!("module {name}\n{source}\nendmodule\n")) {
			Ok(mut statements) if statements.len() == 1 => statements.pop().ok_or_else(|| unresolved(std::string::String::new())),
			Ok(_) => Err(unresolved("`endmodule` found in the module body".to_string())),
			Err(ParserError::InternalError(e)) => Err(unresolved(format!("{e:#}"))),
			Err(ParserError::SyntaxErrors(errors)) => {
				let mut errors: Vec<_> = errors
					.into_iter()
					.map(|error| {
						ParseError::new(&token, ParseErrorType::InModule { module: name.clone(), error: Box::new(error) })
					})
					.collect();
				let last = errors.pop().ok_or_else(|| unresolved(std::string::String::new()))?;
				self.errors.extend(errors);
				Err(last)
			}
		}
	}

	fn release_statement(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let mut targets = Vec::new();
		loop {
			match self.expression()? {
				Expression::Identifier(name) => targets.push(name),
				other => return Err(ParseError::new(other.token(), ParseErrorType::InvalidRelease)),
			}
			if !self.matches(&[Comma]) {
				break;
			}
		}
		self.consume_separator("Expect new line after 'RELEASE' expression.")?;
		Ok(Statement::Release { token, targets })
	}

	/// `(a, b) = x, y`, the opening parenthesis already consumed.
	fn multiple_assignment(&mut self) -> ParseResult<Statement> {
		let token = self.previous().clone();
		let mut targets = Vec::new();
		loop {
			let target = self.expression()?;
			targets.push(assignment_target(target)?);
			if !self.matches(&[Comma]) {
				break;
			}
		}
		self.consume(RightParen, "Expect `)` after variable name.")?;
		self.consume(SimpleAssign, "Expect `=` after variable name.")?;
		let values = self.expression_list()?;
		self.consume_separator("Expect new line after expression.")?;
		Ok(Statement::MultipleAssignment { token, targets, values })
	}

	fn expression_statement(&mut self) -> ParseResult<Statement> {
		let expression = self.expression()?;
		if self.matches(&[SimpleAssign, ComplexAssign]) {
			let operator = self.previous().clone();
			let target = assignment_target(expression)?;
			let value = self.expression()?;
			self.consume_separator("Expect new line after expression.")?;
			return Ok(if operator.kind == SimpleAssign {
				Statement::SimpleAssignment { token: operator, target, value }
			} else {
				Statement::ComplexAssignment { operator, target, value }
			});
		}
		self.consume_separator("Expect new line after expression.")?;
		Ok(Statement::Expression(expression))
	}

	/// Declarations up to, not including, one of `terminators`.
	fn block_until(&mut self, terminators: &[TokenKind]) -> Vec<Statement> {
		let mut statements = Vec::new();
		while !self.is_at_end() && !terminators.iter().any(|kind| self.check(*kind)) {
			if let Some(statement) = self.declaration() {
				statements.push(statement);
			}
		}
		statements
	}

	fn expression_list(&mut self) -> ParseResult<Vec<Expression>> {
		let mut expressions = vec![self.expression()?];
		while self.matches(&[Comma]) {
			expressions.push(self.expression()?);
		}
		Ok(expressions)
	}

	/// Wrap `consequence` in a trailing `if condition [else alternative]`.
	fn conditional(&mut self, consequence: Expression) -> ParseResult<Expression> {
		if !self.matches(&[If]) {
			return Ok(consequence);
		}
		let token = self.previous().clone();
		let condition = self.expression()?;
		let alternative = if self.matches(&[Else]) { Some(self.expression()?) } else { None };
		Ok(Expression::conditional(token, consequence, condition, alternative))
	}

	fn expression(&mut self) -> ParseResult<Expression> { self.or() }

	fn or(&mut self) -> ParseResult<Expression> {
		let mut expression = self.and()?;
		while self.matches(&[LogicalOr]) {
			let operator = self.previous().clone();
			expression = Expression::logical(expression, operator, self.and()?);
		}
		Ok(expression)
	}

	fn and(&mut self) -> ParseResult<Expression> {
		let mut expression = self.equality()?;
		while self.matches(&[LogicalAnd]) {
			let operator = self.previous().clone();
			expression = Expression::logical(expression, operator, self.equality()?);
		}
		Ok(expression)
	}

	/// Parse equality expressions.
	fn equality(&mut self) -> ParseResult<Expression> {
		let mut expression = self.comparison()?;
		while self.matches(&[EqualityOperator]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.comparison()?);
		}
		Ok(expression)
	}

	/// Parse comparison expressions.
	fn comparison(&mut self) -> ParseResult<Expression> {
		let mut expression = self.term()?;
		while self.matches(&[RelationalOperator]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.term()?);
		}
		Ok(expression)
	}

	/// Parse term expressions.
	fn term(&mut self) -> ParseResult<Expression> {
		let mut expression = self.factor()?;
		while self.matches(&[TermOperator]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.factor()?);
		}
		Ok(expression)
	}

	/// Parse factor expressions.
	fn factor(&mut self) -> ParseResult<Expression> {
		let mut expression = self.unary()?;
		while self.matches(&[FactorOperator]) {
			let operator = self.previous().clone();
			expression = Expression::binary(expression, operator, self.unary()?);
		}
		Ok(expression)
	}

	/// Parse unary expressions.
	fn unary(&mut self) -> ParseResult<Expression> {
		if self.matches(&[LogicalNot, TermOperator]) {
			let operator = self.previous().clone();
			return Ok(Expression::unary(operator, self.unary()?));
		}
		self.postfix()
	}

	/// Member access, indexing and calls, in any order.
	fn postfix(&mut self) -> ParseResult<Expression> {
		let mut expression = self.primary()?;
		loop {
			if self.matches(&[Dot]) {
				let property = self.consume(Identifier, "Expect property name.")?.clone();
				expression =
					Expression::member(property.clone(), false, expression, Expression::Identifier(property));
			} else if self.matches(&[LeftBracket]) {
				let token = self.previous().clone();
				let property = self.expression()?;
				self.consume(RightBracket, "Expect ']' after expression.")?;
				expression = Expression::member(token, true, expression, property);
			} else if self.matches(&[LeftParen]) {
				let arguments = self.arguments()?;
				expression = Expression::call(expression.token().clone(), expression, arguments);
			} else {
				return Ok(expression);
			}
		}
	}

	fn arguments(&mut self) -> ParseResult<Vec<NamedArgument>> {
		let mut arguments = Vec::new();
		if !self.check(RightParen) {
			loop {
				arguments.push(self.argument()?);
				if !self.matches(&[Comma]) {
					break;
				}
			}
		}
		self.consume(RightParen, "Expect ')' after arguments.")?;
		Ok(arguments)
	}

	/// `label: value` when an identifier is followed by a colon, else positional.
	fn argument(&mut self) -> ParseResult<NamedArgument> {
		if self.check(Identifier) && self.peek_next().kind == Colon {
			let token = self.advance().clone();
			self.advance();
			let value = self.expression()?;
			return Ok(NamedArgument { label: Some(token.lexeme.clone()), token, value });
		}
		let value = self.expression()?;
		Ok(NamedArgument { token: value.token().clone(), label: None, value })
	}

	/// Parse primary expressions.
	fn primary(&mut self) -> ParseResult<Expression> {
		let token = self.peek().clone();
		match token.kind {
			Number | String | True | False | Null => {
				self.advance();
				Ok(Expression::Literal(token))
			}
			Identifier => {
				self.advance();
				Ok(Expression::Identifier(token))
			}
			This => {
				self.advance();
				Ok(Expression::This(token))
			}
			Ampersand => {
				self.advance();
				Ok(Expression::Macro(self.consume(Identifier, "Expect name after '&'.")?.clone()))
			}
			CreateObject => {
				self.advance();
				self.consume(LeftParen, "Expect '(' after 'CREATEOBJECT'")?;
				let name = self.consume(String, "Expect object name.")?.clone();
				let mut arguments = Vec::new();
				while self.matches(&[Comma]) {
					arguments.push(self.expression()?);
				}
				self.consume(RightParen, "Expect ')' after arguments.")?;
				Ok(Expression::CreateObject { token, name, arguments })
			}
			LeftParen => {
				self.advance();
				if self.check(RightParen) {
					return Err(ParseError::new(self.peek(), ParseErrorType::Expected("Expect expression inside '()'.")));
				}
				let expression = self.expression()?;
				self.consume(RightParen, "Expect ')' after expression.")?;
				Ok(expression)
			}
			_ => Err(ParseError::new(&token, ParseErrorType::UnexpectedPrimary)),
		}
	}

	/// With the current token an opening parenthesis, whether the token after
	/// its matching closing one is one of `kinds`.
	fn closing_paren_then(&self, kinds: &[TokenKind]) -> bool {
		let mut depth = 0usize;
		for (index, token) in self.tokens.iter().enumerate().skip(self.current) {
			match token.kind {
				LeftParen => depth += 1,
				RightParen => {
					depth = depth.saturating_sub(1);
					if depth == 0 {
						return self.tokens.get(index + 1).is_some_and(|next| kinds.contains(&next.kind));
					}
				}
				Separator | Eof => return false,
				_ => {}
			}
		}
		false
	}

	fn matches(&mut self, kinds: &[TokenKind]) -> bool {
		if kinds.iter().any(|kind| self.check(*kind)) {
			self.advance();
			return true;
		}
		false
	}

	fn consume(&mut self, kind: TokenKind, message: &'static str) -> ParseResult<&Token> {
		if self.check(kind) {
			return Ok(self.advance());
		}
		Err(ParseError::new(self.peek(), ParseErrorType::Expected(message)))
	}

	/// A statement ends at a separator or at the end of input.
	fn consume_separator(&mut self, message: &'static str) -> ParseResult<()> {
		if self.is_at_end() || self.matches(&[Separator]) {
			return Ok(());
		}
		Err(ParseError::new(self.peek(), ParseErrorType::Expected(message)))
	}

	fn check(&self, kind: TokenKind) -> bool { !self.is_at_end() && self.peek().kind == kind }

	fn advance(&mut self) -> &Token {
		if !self.is_at_end() {
			self.current += 1;
		}
		self.previous()
	}

	fn is_at_end(&self) -> bool { self.peek().kind == Eof }

	// `parse` guarantees the token stream ends with `Eof` and `current` never
	// moves past it.
	fn peek(&self) -> &Token { &self.tokens[self.current] }

	fn peek_next(&self) -> &Token { self.tokens.get(self.current + 1).unwrap_or_else(|| self.peek()) }

	fn previous(&self) -> &Token { &self.tokens[self.current.saturating_sub(1)] }

	/// Discard tokens until a statement boundary.
	fn synchronize(&mut self) {
		self.advance();
		while !self.is_at_end() {
			if self.previous().kind == Separator || STATEMENT_START.contains(&self.peek().kind) {
				return;
			}
			self.advance();
		}
	}
}

fn assignment_target(expression: Expression) -> ParseResult<Expression> {
	match expression {
		Expression::Identifier(_) | Expression::Member { .. } => Ok(expression),
		other => Err(ParseError::new(other.token(), ParseErrorType::InvalidAssignmentTarget)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resolver::MemoryResolver;

	fn parse(input: &str, equals: &str) {
		let statements = Parser::parse_source(input).unwrap();
		let rendered = statements.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
		assert_eq!(rendered, equals, "input: {input}");
	}

	fn errors(input: &str) -> Vec<ParseError> {
		match Parser::parse_source(input) {
			Err(ParserError::SyntaxErrors(errors)) => errors,
			other => panic!("expected syntax errors, got {other:?}"),
		}
	}

	#[test]
	fn parse_expressions() {
		parse("3 + 4 * (-2 - 1)", "(+ 3 (* 4 (- (- 2) 1)))");
		parse("1 + 2 * 3 / 4 - 5", "(- (+ 1 (/ (* 2 3) 4)) 5)");
		parse("1 < 2 == 3 >= 4", "(== (< 1 2) (>= 3 4))");
		parse("1 != 2 == 3", "(== (!= 1 2) 3)");
	}

	#[test]
	fn parse_logical() {
		parse("a .or. b .and. c", "(.or. a (.and. b c))");
		parse("a OR b or c", "(or (or a b) c)");
		parse("!a and -b < +c", "(and (! a) (< (- b) (+ c)))");
	}

	#[test]
	fn parse_literals() {
		parse("42", "42");
		parse("1_000.5", "1000.5");
		parse("\"hello\"", "\"hello\"");
		parse(".T.", "true");
		parse(".f.", "false");
		parse("null", "null");
	}

	#[test]
	fn parse_postfix_chain() {
		parse("a.b[1](2)(3)", "(call (call ([] (. a b) 1) 2) 3)");
		parse("list.add(1).len()", "(call (. (call (. list add) 1) len))");
		parse("f(1, name: 2, _)", "(call f 1 name: 2 _)");
		parse("createobject(\"array\", 1, 2)", "(createobject \"array\" 1 2)");
		parse("&name", "&name");
	}

	#[test]
	fn parse_declarations() {
		parse("local x = 1 if y else 2, z as string", "(local (= x (if y 1 2)) z)");
		parse("public (a, b) = 1, 2", "(public (a b) 1 2)");
		parse("const MAX = 10", "(const MAX 10)");
		parse("module m\nx = 1\nendmodule", "(module m (= x 1))");
	}

	#[test]
	fn parse_assignments() {
		parse("x = 1", "(= x 1)");
		parse("a.b += 2", "(+= (. a b) 2)");
		parse("(a, b[0]) = 1, 2", "(= (a ([] b 0)) 1 2)");
		parse("(1 + 2) * 3", "(* (+ 1 2) 3)");
	}

	#[test]
	fn parse_print() {
		parse("print 1, 2", "(print 1 2)");
		parse("? (1 + 2) * 3", "(print (* (+ 1 2) 3))");
		parse("print(1, 2)", "(print 1 2)");
		parse("print()", "(print )");
	}

	#[test]
	fn parse_control_flow() {
		parse("if x then\n? 1\nelse\n? 2\nendif", "(if x (block (print 1)) (block (print 2)))");
		parse("if x\nendif", "(if x (block ) (block ))");
		parse(
			"do case\ncase a, b\n? 1\ncase c\notherwise\n? 2\nendcase",
			"(do-case (case a b (block (print 1))) (case c (block )) (otherwise (block (print 2))))",
		);
		parse("do while x < 3\nx += 1\nenddo", "(do-while (< x 3) (block (+= x 1)))");
		parse("do\nx += 1\nwhile x < 3", "(do (block (+= x 1)) (< x 3))");
		parse("for i = 1 to 10 step 2\nloop\nexit\nendfor", "(for i 1 10 2 (block (loop) (exit)))");
		parse("return 1 if x else 2, 3", "(return (if x 1 2) 3)");
		parse("release a, b", "(release a b)");
	}

	#[test]
	fn parse_functions() {
		parse(
			"function f(a as b, c = 1)\ndefer\n? a\nenddefer\nreturn a\nendfunc",
			"(function f (a c) (return a) (defer (block (print a))))",
		);
		parse("function g\nendfunc", "(function g () )");
		parse("class Foo as Bar\nx = 1\nfunction init(a)\nendfunc\nendclass", "(class Foo (init))");
	}

	#[test]
	fn separators_collapse() {
		let dense = Parser::parse_source("x = 1\ny = 2").unwrap();
		let sparse = Parser::parse_source("x = 1;\n\n\n\ny = 2").unwrap();
		assert_eq!(
			dense.iter().map(ToString::to_string).collect::<Vec<_>>(),
			sparse.iter().map(ToString::to_string).collect::<Vec<_>>()
		);
	}

	#[test]
	fn reports_every_error() {
		let errors = errors("local = 1\nprint (\n? 1 +\n? 2");
		assert_eq!(errors.iter().map(|e| e.line).collect::<Vec<_>>(), vec![1, 2, 3]);
		assert_eq!(errors[0].r#type, ParseErrorType::Expected("Expect variable name."));
		assert_eq!(errors[1].r#type, ParseErrorType::UnexpectedPrimary);
	}

	#[test]
	fn rejects_invalid_targets() {
		assert_eq!(errors("1 = 2")[0].r#type, ParseErrorType::InvalidAssignmentTarget);
		assert_eq!(errors("f() += 2")[0].r#type, ParseErrorType::InvalidAssignmentTarget);
		assert_eq!(errors("release a.b")[0].r#type, ParseErrorType::InvalidRelease);
		assert_eq!(errors("if x\n? 1")[0].r#type, ParseErrorType::Expected("Expect 'ENDIF' after if statement."));
	}

	#[test]
	fn scan_errors_become_syntax_errors() {
		let errors = errors("? 1.2.3 + 1\n? @2");
		assert_eq!(errors.len(), 2);
		assert!(errors.iter().all(|e| matches!(e.r#type, ParseErrorType::Scan(_))));
	}

	#[test]
	fn imports_wrap_modules() {
		let resolver = MemoryResolver::default().with("util", "const PI = 3\n\nfunction twice(x)\nreturn x * 2\nendfunc");
		let statements = Parser::new(Rc::new(resolver)).parse("import util\n? util.pi").unwrap();
		assert_eq!(statements[0].to_string(), "(module util (const PI 3) (function twice (x) (return (* x 2))))");
		assert_eq!(statements[1].to_string(), "(print (. util pi))");
	}

	#[test]
	fn import_failures() {
		let errors = errors("import nothing");
		assert!(matches!(&errors[0].r#type, ParseErrorType::UnresolvedImport { module, .. } if module == "nothing"));

		let resolver = MemoryResolver::default().with("a", "import b").with("b", "import a");
		let Err(ParserError::SyntaxErrors(errors)) = Parser::new(Rc::new(resolver)).parse("import a") else {
			panic!("circular import must fail")
		};
		let ParseErrorType::InModule { module, error } = &errors[0].r#type else { panic!("{errors:?}") };
		assert_eq!(module, "a");
		assert!(matches!(&error.r#type, ParseErrorType::InModule { module, .. } if module == "b"));

		let resolver = MemoryResolver::default().with("bad", "x = ");
		let Err(ParserError::SyntaxErrors(errors)) = Parser::new(Rc::new(resolver)).parse("import bad\n? 1") else {
			panic!("broken module must fail")
		};
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].line, 1);
	}
}
