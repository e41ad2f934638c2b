//! FoxDream tree-walking interpreter.
//!
//! The interpreter walks the AST produced by the parser against a chain of
//! scopes. It keeps one "current scope"; blocks, function calls and module
//! bodies swap it for a child scope and restore it on every exit path,
//! including errors.
//!
//! `return`, `loop` and `exit` are not errors: statement execution yields a
//! [`Signal`] that loops and function calls inspect and consume. A runtime
//! error aborts the rest of the unit.

pub mod array;
pub mod builtin;
pub mod callable;
pub mod class;
pub mod function;
pub mod value;

use std::{io::Write, rc::Rc};

use array::Array;
use callable::{ArgValue, CallSite};
use class::Class;
use function::Function;
use log::{debug, info, warn};
use value::Value;

use crate::{
	connector::{self, DriverRegistry},
	environment::{BindingKind, Environment, Scope, ScopeError},
	error::interpreter::{RuntimeError, RuntimeErrorType},
	parser::expression::{Expression, NamedArgument},
	scanner::{Category, Literal, Token},
	statement::{
		Block, ClassDeclaration, DeclarationForm, DeclarationScope, FunctionDeclaration, Statement, VariableDeclarator,
	},
};

/// How a statement completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
	Normal,
	/// `return`, unwinding to the nearest function call.
	Returned(Value),
	/// `loop`, continuing the nearest loop.
	Looped,
	/// `exit`, leaving the nearest loop.
	Exited,
}

fn positioned(token: &Token) -> impl FnOnce(ScopeError) -> RuntimeError + '_ {
	move |error| RuntimeError::new(token, error.into())
}

/// Interpreter that executes FoxDream statements.
pub struct Interpreter {
	globals:     Scope,
	environment: Scope,
	output:      Box<dyn Write>,
	steps:       u64,
	max_steps:   Option<u64>,
	depth:       usize,
	max_depth:   usize,
}

/// Nested user function calls allowed before a unit is aborted.
pub const DEFAULT_CALL_DEPTH: usize = 64;

impl Interpreter {
	/// A fresh interpreter with builtins and an empty driver registry.
	#[cfg(test)]
	pub fn new(output: Box<dyn Write>) -> Self { Self::with_drivers(output, DriverRegistry::default()) }

	pub fn with_drivers(output: Box<dyn Write>, drivers: DriverRegistry) -> Self {
		info!("initializing interpreter");
		let globals = Scope::new(Environment::default());
		builtin::register(&globals);
		connector::install(&globals, drivers);
		Self {
			environment: globals.clone(),
			globals,
			output,
			steps: 0,
			max_steps: None,
			depth: 0,
			max_depth: DEFAULT_CALL_DEPTH,
		}
	}

	/// Statement budget per unit; `None` is unlimited.
	pub fn set_max_steps(&mut self, max_steps: Option<u64>) { self.max_steps = max_steps }

	pub fn set_max_call_depth(&mut self, max_depth: usize) { self.max_depth = max_depth }

	/// Account for one more nested function call, failing past the limit.
	pub(crate) fn enter_call(&mut self, site: &CallSite) -> Result<(), RuntimeError> {
		if self.depth >= self.max_depth {
			return Err(site.error(RuntimeErrorType::CallDepthExceeded(self.max_depth)));
		}
		self.depth += 1;
		Ok(())
	}

	pub(crate) fn leave_call(&mut self) { self.depth = self.depth.saturating_sub(1) }

	/// Execute one top-level unit. A top-level `return` ends the unit quietly.
	pub fn interpret(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
		debug!("interpreting {} statements", statements.len());
		self.steps = 0;
		self.depth = 0;
		self.environment = self.globals.clone();
		for statement in statements {
			match self.execute(statement)? {
				Signal::Normal => {}
				Signal::Returned(value) => {
					debug!("top-level return discards `{value}`");
					break;
				}
				Signal::Looped => return Err(Self::outside_loop(statement, "loop")),
				Signal::Exited => return Err(Self::outside_loop(statement, "exit")),
			}
		}
		Ok(())
	}

	fn outside_loop(statement: &Statement, keyword: &'static str) -> RuntimeError {
		RuntimeError::new(statement.token(), RuntimeErrorType::ControlOutsideLoop(keyword))
	}

	/// Run `statements` with `scope` as the current scope, restoring the
	/// previous one afterwards whatever happens.
	pub(crate) fn execute_block(&mut self, statements: &[Statement], scope: Scope) -> Result<Signal, RuntimeError> {
		let previous = std::mem::replace(&mut self.environment, scope);
		let result = self.execute_all(statements);
		self.environment = previous;
		result
	}

	/// Evaluate `expression` with `scope` as the current scope.
	pub(crate) fn evaluate_in(&mut self, expression: &Expression, scope: Scope) -> Result<Value, RuntimeError> {
		let previous = std::mem::replace(&mut self.environment, scope);
		let result = self.evaluate(expression);
		self.environment = previous;
		result
	}

	fn execute_all(&mut self, statements: &[Statement]) -> Result<Signal, RuntimeError> {
		for statement in statements {
			let signal = self.execute(statement)?;
			if signal != Signal::Normal {
				return Ok(signal);
			}
		}
		Ok(Signal::Normal)
	}

	/// Blocks of compound statements get their own scope. Empty blocks don't.
	fn execute_nested(&mut self, block: &Block) -> Result<Signal, RuntimeError> {
		if block.statements.is_empty() {
			return Ok(Signal::Normal);
		}
		let scope = Environment::child(&self.environment);
		self.execute_block(&block.statements, scope)
	}

	/// Every executed statement and every loop iteration costs one step.
	fn consume_step(&mut self, token: &Token) -> Result<(), RuntimeError> {
		self.steps += 1;
		if let Some(max) = self.max_steps
			&& self.steps > max
		{
			return Err(RuntimeError::new(token, RuntimeErrorType::StepBudgetExceeded(max)));
		}
		Ok(())
	}

	fn execute(&mut self, statement: &Statement) -> Result<Signal, RuntimeError> {
		self.consume_step(statement.token())?;
		match statement {
			Statement::Expression(expression) => {
				self.evaluate(expression)?;
			}
			Statement::Print { token, expressions } => {
				for expression in expressions {
					let value = self.evaluate(expression)?;
					writeln!(self.output, "{value}")
						.map_err(|e| RuntimeError::new(token, RuntimeErrorType::Host(format!("Failed write output: {e}"))))?;
				}
			}
			Statement::Return { values, .. } => {
				let value = match values.as_slice() {
					[] => Value::Null,
					[value] => self.evaluate(value)?,
					values => Value::Array(Array::from_values(self.evaluate_all(values)?)),
				};
				return Ok(Signal::Returned(value));
			}
			Statement::VarDeclaration { token, scope, form } => self.declare(token, *scope, form)?,
			Statement::If { condition, then_branch, else_branch, .. } => {
				return if self.evaluate(condition)?.is_truthy() {
					self.execute_nested(then_branch)
				} else {
					self.execute_nested(else_branch)
				};
			}
			Statement::DoCase { branches, otherwise, .. } => {
				for branch in branches {
					for condition in &branch.conditions {
						if self.evaluate(condition)?.is_truthy() {
							return self.execute_nested(&branch.body);
						}
					}
				}
				if let Some(otherwise) = otherwise {
					return self.execute_nested(otherwise);
				}
			}
			Statement::DoWhile { token, condition, body } => {
				while self.evaluate(condition)?.is_truthy() {
					self.consume_step(token)?;
					match self.execute_nested(body)? {
						Signal::Normal | Signal::Looped => {}
						Signal::Exited => break,
						returned @ Signal::Returned(_) => return Ok(returned),
					}
				}
			}
			Statement::Do { token, condition, body } => loop {
				self.consume_step(token)?;
				match self.execute_nested(body)? {
					Signal::Normal | Signal::Looped => {}
					Signal::Exited => break,
					returned @ Signal::Returned(_) => return Ok(returned),
				}
				if !self.evaluate(condition)?.is_truthy() {
					break;
				}
			},
			Statement::Exit(_) => return Ok(Signal::Exited),
			Statement::Loop(_) => return Ok(Signal::Looped),
			Statement::For { token, variable, start, end, step, body } => {
				return self.execute_for(token, variable, start, end, step.as_ref(), body);
			}
			Statement::Function(declaration) => self.define_function(declaration)?,
			Statement::Class(declaration) => self.define_class(declaration)?,
			Statement::Const { name, value, .. } => {
				let value = self.evaluate(value)?;
				if self.environment.borrow().kind_of(&name.lexeme) == Some(BindingKind::Constant) {
					return Err(RuntimeError::new(name, RuntimeErrorType::ConstantRedefinition(name.lexeme.clone())));
				}
				self.environment.borrow_mut().define(&name.lexeme, value, BindingKind::Constant).map_err(positioned(name))?;
			}
			Statement::Module { name, body, .. } => {
				debug!("executing module `{}`", name.lexeme);
				let scope = Environment::child(&self.environment);
				match self.execute_block(body, scope.clone())? {
					Signal::Normal | Signal::Returned(_) => {}
					Signal::Looped => return Err(Self::outside_loop(statement, "loop")),
					Signal::Exited => return Err(Self::outside_loop(statement, "exit")),
				}
				self.environment
					.borrow_mut()
					.define(&name.lexeme, Value::Scope(scope), BindingKind::Constant)
					.map_err(positioned(name))?;
			}
			Statement::Release { targets, .. } => {
				for target in targets {
					self.environment.borrow_mut().release(&target.lexeme);
				}
			}
			Statement::Defer(block) => {
				debug!("[{}:{}] defer outside of a function body ignored", block.token.line, block.token.column);
			}
			Statement::SimpleAssignment { target, value, .. } => {
				let value = self.evaluate(value)?;
				self.assign_target(target, value)?;
			}
			Statement::ComplexAssignment { operator, target, value } => {
				let right = self.evaluate(value)?;
				let left = self.evaluate(target)?;
				let result = left.binary_op(operator.category, &right).map_err(|e| RuntimeError::new(operator, e))?;
				self.assign_target(target, result)?;
			}
			Statement::MultipleAssignment { token, targets, values } => {
				let values = self.flatten(values)?;
				check_counts(token, targets.len(), values.len())?;
				for (target, value) in targets.iter().zip(values) {
					if is_discard(target) {
						continue;
					}
					self.assign_target(target, value)?;
				}
			}
		}
		Ok(Signal::Normal)
	}

	fn declare(&mut self, token: &Token, scope: DeclarationScope, form: &DeclarationForm) -> Result<(), RuntimeError> {
		let target = match scope {
			DeclarationScope::Local => self.environment.clone(),
			DeclarationScope::Public => self.globals.clone(),
		};
		match form {
			DeclarationForm::Each(declarators) => {
				for declarator in declarators {
					let value = match &declarator.initializer {
						Some(initializer) => self.evaluate(initializer)?,
						None => default_value(declarator),
					};
					let name = &declarator.name;
					target.borrow_mut().define(&name.lexeme, value, BindingKind::Variable).map_err(positioned(name))?;
				}
			}
			DeclarationForm::Destructure { names, values } => {
				let values = self.flatten(values)?;
				check_counts(token, names.len(), values.len())?;
				for (name, value) in names.iter().zip(values) {
					if name.lexeme == "_" {
						continue;
					}
					target.borrow_mut().define(&name.lexeme, value, BindingKind::Variable).map_err(positioned(name))?;
				}
			}
		}
		Ok(())
	}

	fn execute_for(
		&mut self,
		token: &Token,
		variable: &Token,
		start: &Expression,
		end: &Expression,
		step: Option<&Expression>,
		body: &Block,
	) -> Result<Signal, RuntimeError> {
		let scope = Environment::child(&self.environment);
		let start = self.evaluate(start)?;
		scope.borrow_mut().define(&variable.lexeme, start.clone(), BindingKind::Variable).map_err(positioned(variable))?;
		let end = self.evaluate(end)?;
		let (Value::Number(mut current), Value::Number(end)) = (start, end) else {
			return Err(RuntimeError::new(token, RuntimeErrorType::ForBounds));
		};
		let increment = match step {
			Some(step) => match self.evaluate(step)? {
				Value::Number(n) => n,
				_ => return Err(RuntimeError::new(token, RuntimeErrorType::StepType)),
			},
			None => 1.0,
		};
		if increment == 0.0 {
			return Err(RuntimeError::new(token, RuntimeErrorType::ZeroStep));
		}
		let finished = |current: f64| (increment > 0.0 && current > end) || (increment < 0.0 && current < end);

		while !finished(current) {
			self.consume_step(token)?;
			match self.execute_block(&body.statements, scope.clone())? {
				Signal::Normal | Signal::Looped => {}
				Signal::Exited => break,
				returned @ Signal::Returned(_) => return Ok(returned),
			}
			// The body may have reassigned the variable.
			current = match scope.borrow().lookup(&variable.lexeme).map_err(positioned(variable))? {
				Value::Number(n) => n + increment,
				_ => return Err(RuntimeError::new(token, RuntimeErrorType::ForBounds)),
			};
			scope.borrow_mut().assign(&variable.lexeme, Value::Number(current)).map_err(positioned(variable))?;
		}
		Ok(Signal::Normal)
	}

	fn define_function(&mut self, declaration: &Rc<FunctionDeclaration>) -> Result<(), RuntimeError> {
		let function = Function::new(declaration.clone(), self.environment.clone());
		let name = &declaration.name;
		self.environment
			.borrow_mut()
			.define(&name.lexeme, Value::Function(Rc::new(function)), BindingKind::Constant)
			.map_err(positioned(name))
	}

	fn define_class(&mut self, declaration: &Rc<ClassDeclaration>) -> Result<(), RuntimeError> {
		let superclass = match &declaration.superclass {
			Some(expression) => match self.evaluate(expression)? {
				Value::Class(class) => Some(class),
				_ => return Err(RuntimeError::new(&declaration.token, RuntimeErrorType::SuperclassNotClass)),
			},
			None => None,
		};
		let class = Class::new(declaration.clone(), superclass);
		let name = &declaration.name;
		self.environment
			.borrow_mut()
			.define(&name.lexeme, Value::Class(Rc::new(class)), BindingKind::Constant)
			.map_err(positioned(name))
	}

	/// Write `value` into an identifier or member target.
	fn assign_target(&mut self, target: &Expression, value: Value) -> Result<(), RuntimeError> {
		match target {
			Expression::Identifier(name) => {
				self.environment.borrow_mut().assign(&name.lexeme, value).map_err(positioned(name))
			}
			Expression::Member { token, computed: false, object, property } => match self.evaluate(object)? {
				Value::Scope(scope) => {
					let name = property.token();
					scope.borrow_mut().assign_own(&name.lexeme, value).map_err(positioned(name))
				}
				_ => Err(RuntimeError::new(token, RuntimeErrorType::InvalidMemberTarget)),
			},
			Expression::Member { token, computed: true, object, property } => {
				let object = self.evaluate(object)?;
				let key = self.evaluate(property)?;
				match (object, key) {
					(Value::Array(array), Value::Number(index)) => {
						array.set(index, value).map(|_| ()).map_err(|e| RuntimeError::new(token, e))
					}
					(Value::Scope(scope), Value::String(name)) => {
						scope.borrow_mut().assign_own(&name, value).map_err(positioned(token))
					}
					_ => Err(RuntimeError::new(token, RuntimeErrorType::InvalidMemberTarget)),
				}
			}
			other => Err(RuntimeError::new(other.token(), RuntimeErrorType::InvalidMemberTarget)),
		}
	}

	/// Evaluate in order, spreading array results into their elements.
	fn flatten(&mut self, expressions: &[Expression]) -> Result<Vec<Value>, RuntimeError> {
		let mut values = Vec::with_capacity(expressions.len());
		for expression in expressions {
			match self.evaluate(expression)? {
				Value::Array(array) => values.extend(array.values()),
				value => values.push(value),
			}
		}
		Ok(values)
	}

	fn evaluate_all(&mut self, expressions: &[Expression]) -> Result<Vec<Value>, RuntimeError> {
		expressions.iter().map(|expression| self.evaluate(expression)).collect()
	}

	/// Evaluate the given expression and return its value.
	pub(crate) fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
		Ok(match expression {
			Expression::Literal(token) => Value::from(&token.literal),
			Expression::Identifier(token) => self.environment.borrow().lookup(&token.lexeme).map_err(positioned(token))?,
			Expression::Unary { operator, right } => {
				let right = self.evaluate(right)?;
				match (operator.category, right) {
					(Category::Bang, right) => Value::Boolean(!right.is_truthy()),
					(Category::Minus, Value::Number(n)) => Value::Number(-n),
					(Category::Plus, Value::Number(n)) => Value::Number(n),
					(Category::Minus | Category::Plus, _) => {
						return Err(RuntimeError::new(operator, RuntimeErrorType::OperandNotNumber));
					}
					_ => return Err(RuntimeError::new(operator, RuntimeErrorType::IncompatibleTypes)),
				}
			}
			Expression::Binary { left, operator, right } => {
				let left = self.evaluate(left)?;
				let right = self.evaluate(right)?;
				left.binary_op(operator.category, &right).map_err(|e| RuntimeError::new(operator, e))?
			}
			Expression::Logical { left, operator, right } => {
				let left = self.evaluate(left)?;
				let short_circuit = match operator.category {
					Category::Or => left.is_truthy(),
					_ => !left.is_truthy(),
				};
				if short_circuit { left } else { self.evaluate(right)? }
			}
			Expression::Member { token, computed, object, property } => {
				self.member(token, *computed, object, property)?
			}
			Expression::Call { token, callee, arguments } => self.call(token, callee, arguments)?,
			Expression::CreateObject { token, name, arguments } => self.create_object(token, name, arguments)?,
			Expression::Conditional { condition, consequence, alternative, .. } => {
				if self.evaluate(condition)?.is_truthy() {
					self.evaluate(consequence)?
				} else if let Some(alternative) = alternative {
					self.evaluate(alternative)?
				} else {
					Value::Null
				}
			}
			Expression::This(_) => Value::Null,
			Expression::Macro(token) => {
				warn!("[{}:{}] macro substitution `&{}` is not supported", token.line, token.column, token.lexeme);
				Value::Null
			}
		})
	}

	/// Member access. Anything that is neither a scope, a host object nor an
	/// indexable pair evaluates to the left operand itself.
	fn member(
		&mut self,
		token: &Token,
		computed: bool,
		object: &Expression,
		property: &Expression,
	) -> Result<Value, RuntimeError> {
		let left = self.evaluate(object)?;
		if computed {
			let key = self.evaluate(property)?;
			return match (&left, &key) {
				(Value::Array(array), Value::Number(index)) => array.get(*index).map_err(|e| RuntimeError::new(token, e)),
				(Value::Scope(scope), Value::String(name)) => scope.borrow().lookup(name).map_err(positioned(token)),
				_ => Ok(left.clone()),
			};
		}
		let name = property.token();
		match &left {
			Value::Scope(scope) => scope.borrow().lookup(&name.lexeme).map_err(positioned(name)),
			Value::Object(object) => match object.member(&name.lexeme) {
				Ok(Some(value)) => Ok(value),
				Ok(None) => Ok(left.clone()),
				Err(message) => Err(RuntimeError::new(name, RuntimeErrorType::Host(message))),
			},
			_ => Ok(left.clone()),
		}
	}

	fn call(&mut self, token: &Token, callee: &Expression, arguments: &[NamedArgument]) -> Result<Value, RuntimeError> {
		let value = self.evaluate(callee)?;
		let Some(callable) = value.as_callable() else {
			let name = callee.callee_name().unwrap_or(&callee.token().lexeme).to_string();
			return Err(RuntimeError::new(token, RuntimeErrorType::NotCallable(name)));
		};
		if callable.validates_arguments() && callable.arity() != arguments.len() {
			return Err(RuntimeError::new(callee.token(), RuntimeErrorType::ArityMismatch {
				expected: callable.arity(),
				got:      arguments.len(),
			}));
		}

		let mut values = Vec::with_capacity(arguments.len());
		for argument in arguments {
			let value = if argument.is_omitted() { Value::Null } else { self.evaluate(&argument.value)? };
			values.push(ArgValue { token: argument.token.clone(), label: argument.label.clone(), value });
		}

		let member = match callee {
			Expression::Member { computed: false, property, .. } => Some(property.token().lexeme.as_str()),
			_ => None,
		};
		callable.call(self, &CallSite { token, member }, values)
	}

	/// `createobject("name", ...)`: the prototype bound to `name` in the global
	/// scope. The array prototype is shared; arguments are appended to it.
	fn create_object(&mut self, token: &Token, name: &Token, arguments: &[Expression]) -> Result<Value, RuntimeError> {
		let key = match &name.literal {
			Literal::String(key) => key.clone(),
			_ => name.lexeme.clone(),
		};
		let prototype = self.globals.borrow().lookup(&key).map_err(positioned(name))?;
		if let Value::Array(array) = &prototype {
			for argument in arguments {
				let value = self.evaluate(argument)?;
				array.push(value);
			}
			debug!("[{}:{}] array prototype now holds {} element(s)", token.line, token.column, array.len());
		}
		Ok(prototype)
	}
}

fn is_discard(target: &Expression) -> bool { matches!(target, Expression::Identifier(t) if t.lexeme == "_") }

/// More values than targets and more targets than values are different errors.
fn check_counts(token: &Token, targets: usize, values: usize) -> Result<(), RuntimeError> {
	if targets < values {
		return Err(RuntimeError::new(token, RuntimeErrorType::WrongNumberOfVariables { expected: targets, got: values }));
	}
	if targets > values {
		return Err(RuntimeError::new(token, RuntimeErrorType::WrongNumberOfValues { expected: targets, got: values }));
	}
	Ok(())
}

/// Value of a declaration without initializer, from its `as type` annotation.
fn default_value(declarator: &VariableDeclarator) -> Value {
	let type_name = declarator.type_name.as_ref().map(|t| t.lexeme.to_lowercase());
	match type_name.as_deref() {
		Some("string") => Value::String(String::new()),
		Some("number") => Value::Number(0.0),
		Some("boolean") => Value::Boolean(false),
		_ => Value::Null,
	}
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, io, rc::Rc};

	use super::*;
	use crate::parser::Parser;

	/// Output sink the test keeps a handle to.
	#[derive(Clone, Default)]
	struct Buffer(Rc<RefCell<Vec<u8>>>);

	impl Write for Buffer {
		fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
			self.0.borrow_mut().extend_from_slice(bytes);
			Ok(bytes.len())
		}

		fn flush(&mut self) -> io::Result<()> { Ok(()) }
	}

	fn run(input: &str) -> (Result<(), RuntimeError>, String) {
		let statements = Parser::parse_source(input).unwrap();
		let buffer = Buffer::default();
		let mut interpreter = Interpreter::new(Box::new(buffer.clone()));
		let result = interpreter.interpret(&statements);
		let output = String::from_utf8(buffer.0.borrow().clone()).unwrap();
		(result, output)
	}

	fn output(input: &str) -> String {
		let (result, output) = run(input);
		assert_eq!(result, Ok(()), "input: {input}");
		output
	}

	fn error(input: &str) -> RuntimeErrorType { run(input).0.unwrap_err().r#type }

	#[test]
	fn test_variable_declaration() {
		assert_eq!(output("local x = 10\nprint x"), "10\n");
		assert_eq!(output("local s as string, n as Number, b as boolean, o\n? s, n, b, o"), "\n0\nfalse\nnull\n");
		assert_eq!(output("public g = 1\n? g"), "1\n");
	}

	#[test]
	fn test_variable_assignment() {
		assert_eq!(output("x = 10\nx = 20\nprint x"), "20\n");
		assert_eq!(output("x = 1\nx += 2\nx *= 10\n? x"), "30\n");
		assert_eq!(output("s = \"a\"\ns += 1\n? s"), "a1\n");
	}

	#[test]
	fn test_undefined_variable() {
		assert_eq!(error("print undefined_var"), RuntimeErrorType::UndefinedVariable("undefined_var".into()));
		assert_eq!(error("missing += 1"), RuntimeErrorType::UndefinedVariable("missing".into()));
	}

	#[test]
	fn arithmetic_and_coercion() {
		assert_eq!(output("? 5 + \"3\", \"3\" + 5, 5 + \"abc\", 10.0 / 4"), "8\n35\n5\n2.5\n");
		assert_eq!(error("? 10 / 0"), RuntimeErrorType::DivisionByZero);
		assert_eq!(error("? -\"a\""), RuntimeErrorType::OperandNotNumber);
		assert_eq!(error("? 1 < \"a\""), RuntimeErrorType::OperandsNotNumbers);
	}

	#[test]
	fn logical_operators_short_circuit() {
		assert_eq!(output("? null or 2, 0 and 3, .f. and missing, .t. .or. missing"), "2\n3\nfalse\ntrue\n");
		assert_eq!(output("? !null, !0"), "true\nfalse\n");
	}

	#[test]
	fn for_loops() {
		assert_eq!(output("for i = 1 to 5 step 2\n? i\nendfor"), "1\n3\n5\n");
		assert_eq!(output("for i = 3 to 1 step -1\n? i\nendfor"), "3\n2\n1\n");
		assert_eq!(output("for i = 5 to 1\n? i\nendfor"), "");
		assert_eq!(output("for i = 1 to 5\nif i == 2\nloop\nendif\nif i == 4\nexit\nendif\n? i\nendfor"), "1\n3\n");
		assert_eq!(error("for i = 1 to 5 step 0\nendfor"), RuntimeErrorType::ZeroStep);
		assert_eq!(error("for i = \"a\" to 5\nendfor"), RuntimeErrorType::ForBounds);
	}

	#[test]
	fn while_loops() {
		assert_eq!(output("i = 0\ndo while i < 3\ni += 1\n? i\nenddo"), "1\n2\n3\n");
		assert_eq!(output("i = 10\ndo\n? i\nwhile i < 3"), "10\n");
		assert_eq!(output("i = 0\ndo\ni += 1\nif i < 3\nloop\nendif\n? i\nexit\nwhile .t."), "3\n");
	}

	#[test]
	fn do_case_takes_the_first_truthy_branch() {
		let source = "x = 2\ndo case\ncase x == 1\n? \"one\"\ncase x == 2, x == 3\n? \"two\"\notherwise\n? \"other\"\nendcase";
		assert_eq!(output(source), "two\n");
		assert_eq!(output("do case\ncase .f.\n? 1\nendcase\n? \"done\""), "done\n");
	}

	#[test]
	fn loop_outside_of_loops_is_an_error() {
		assert_eq!(error("loop"), RuntimeErrorType::ControlOutsideLoop("loop"));
		assert_eq!(error("function f()\nexit\nendfunc\nf()"), RuntimeErrorType::ControlOutsideLoop("exit"));
	}

	#[test]
	fn constants() {
		assert_eq!(error("const X = 1\nconst X = 2"), RuntimeErrorType::ConstantRedefinition("X".into()));
		assert_eq!(error("const X = 1\nX = 2"), RuntimeErrorType::ConstantAssignment("X".into()));
		assert_eq!(
			error("const X = 1\nfunction f()\nconst x = 3\nendfunc\nf()"),
			RuntimeErrorType::ConstantRedefinition("x".into())
		);
	}

	#[test]
	fn multiple_assignment() {
		assert_eq!(output("(a, b) = 1, 2\n? a, b"), "1\n2\n");
		assert_eq!(output("(a, _, c) = 1, 2, 3\n? a, c"), "1\n3\n");
		assert_eq!(error("(a, b) = 1"), RuntimeErrorType::WrongNumberOfValues { expected: 2, got: 1 });
		assert_eq!(error("(a) = 1, 2"), RuntimeErrorType::WrongNumberOfVariables { expected: 1, got: 2 });
		assert_eq!(output("function pair()\nreturn 1, 2\nendfunc\nlocal (x, y) = pair()\n? y"), "2\n");
	}

	#[test]
	fn step_budget_stops_runaway_loops() {
		let statements = Parser::parse_source("do while .t.\nenddo").unwrap();
		let mut interpreter = Interpreter::new(Box::new(io::sink()));
		interpreter.set_max_steps(Some(100));
		let error = interpreter.interpret(&statements).unwrap_err();
		assert_eq!(error.r#type, RuntimeErrorType::StepBudgetExceeded(100));
	}
}
