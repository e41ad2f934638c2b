use std::fmt::Debug;

use crate::{
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter,
		value::{ExpectedKind, Value},
	},
	scanner::Token,
};

/// Where a call happens. `member` is the property name when the callee was
/// reached through `object.name(...)`; methods of arrays, cursors and the
/// connector dispatch on it.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
	pub token:  &'a Token,
	pub member: Option<&'a str>,
}

impl CallSite<'_> {
	pub fn error(&self, r#type: RuntimeErrorType) -> RuntimeError { RuntimeError::new(self.token, r#type) }

	/// Lowercased member name, empty for a plain call.
	pub fn method(&self) -> String { self.member.map(str::to_lowercase).unwrap_or_default() }
}

/// An evaluated call argument. `label` is the name of a named argument.
#[derive(Debug, Clone)]
pub struct ArgValue {
	pub token: Token,
	pub label: Option<String>,
	pub value: Value,
}

/// The one invocation contract shared by user functions, classes, builtins,
/// arrays and host objects.
pub trait Callable: Debug {
	fn name(&self) -> &str;

	fn arity(&self) -> usize;

	/// Expected kinds of the positional parameters, checked only for callables
	/// that validate their arguments.
	fn parameter_kinds(&self) -> &[ExpectedKind] { &[] }

	/// Whether the interpreter enforces `arity` before invoking.
	fn validates_arguments(&self) -> bool { true }

	fn call(&self, interpreter: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError>;
}

/// A host registered object with named members, e.g. a database cursor.
pub trait HostObject: Callable {
	/// Value of a property. `Ok(None)` means the name is not a property, and
	/// the object itself is returned so a following call can dispatch on it.
	fn member(&self, name: &str) -> Result<Option<Value>, String>;

	fn as_callable(&self) -> &dyn Callable;

	fn describe(&self) -> String;
}

/// Check count first, then the permissive kind match.
pub fn check_arguments(
	site: &CallSite,
	kinds: &[ExpectedKind],
	arguments: &[ArgValue],
	check_types: bool,
) -> Result<(), RuntimeError> {
	if arguments.len() != kinds.len() {
		return Err(site.error(RuntimeErrorType::ArgumentCount { expected: kinds.len(), got: arguments.len() }));
	}
	if check_types {
		for (kind, argument) in kinds.iter().zip(arguments) {
			let tag = argument.value.tag();
			if !kind.accepts(tag) {
				return Err(RuntimeError::new(&argument.token, RuntimeErrorType::ArgumentType {
					expected: kind.name(),
					got:      tag.type_name(),
				}));
			}
		}
	}
	Ok(())
}
