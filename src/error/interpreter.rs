use crate::{environment::ScopeError, scanner::Token};

/// A runtime error, positioned at the token whose evaluation failed. Aborts
/// the rest of the current top-level unit.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[{line}:{column}] Runtime error near of `{lexeme}`: {type}")]
pub struct RuntimeError {
	pub line:   usize,
	pub column: usize,
	pub lexeme: String,
	pub r#type: RuntimeErrorType,
}

impl RuntimeError {
	pub fn new(token: &Token, r#type: RuntimeErrorType) -> Self {
		Self { line: token.line, column: token.column, lexeme: token.lexeme.clone(), r#type }
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Errors that can occur during interpretation
pub enum RuntimeErrorType {
	#[error("Operand must be a number.")]
	OperandNotNumber,
	#[error("Operands must be a number.")]
	OperandsNotNumbers,
	#[error("Division by zero.")]
	DivisionByZero,
	#[error("Incompatible types.")]
	IncompatibleTypes,
	#[error("Undefined variable `{0}`.")]
	UndefinedVariable(String),
	#[error("Constants cannot be redefined `{0}`")]
	ConstantRedefinition(String),
	#[error("Invalid constant assignment `{0}`")]
	ConstantAssignment(String),
	#[error("Not a function: {0}")]
	NotCallable(String),
	#[error("Wrong number of parameters/arguments. Expected: {expected}, got: {got}.")]
	ArityMismatch { expected: usize, got: usize },
	#[error("Wrong number of arguments, expected: {expected}, got: {got}")]
	ArgumentCount { expected: usize, got: usize },
	#[error("Wrong argument type, expected: {expected}, got: {got}")]
	ArgumentType { expected: &'static str, got: &'static str },
	#[error("Alias not found: `{0}`")]
	UnknownArgument(String),
	#[error("Function not defined for this data type.")]
	UnknownMethod,
	#[error("Invalid argument type for this function, expecting integer.")]
	IndexNotNumber,
	#[error("Index {index} out of bounds for length {len}.")]
	IndexOutOfBounds { index: f64, len: usize },
	#[error("Wrong number of values, expected: {expected}, got: {got}")]
	WrongNumberOfValues { expected: usize, got: usize },
	#[error("Wrong number of variables, expected: {expected}, got: {got}")]
	WrongNumberOfVariables { expected: usize, got: usize },
	#[error("Invalid member target, expected a scope or an array.")]
	InvalidMemberTarget,
	#[error("Incompatible types in 'FOR' statement.")]
	ForBounds,
	#[error("Invalid type for incrementer.")]
	StepType,
	#[error("Step increment cannot be zero.")]
	ZeroStep,
	#[error("Super class must be a class.")]
	SuperclassNotClass,
	#[error("`{0}` used outside of a loop.")]
	ControlOutsideLoop(&'static str),
	#[error("Execution step budget of {0} exceeded.")]
	StepBudgetExceeded(u64),
	#[error("Call depth limit of {0} exceeded.")]
	CallDepthExceeded(usize),
	#[error("{0}")]
	Host(String),
}

impl From<ScopeError> for RuntimeErrorType {
	fn from(error: ScopeError) -> Self {
		match error {
			ScopeError::Undefined(name) => RuntimeErrorType::UndefinedVariable(name),
			ScopeError::ConstantRedefinition(name) => RuntimeErrorType::ConstantRedefinition(name),
			ScopeError::ConstantAssignment(name) => RuntimeErrorType::ConstantAssignment(name),
		}
	}
}
