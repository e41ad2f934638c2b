use std::{fmt::Display, rc::Rc};

use log::warn;

use crate::{
	error::interpreter::RuntimeError,
	interpreter::{
		Interpreter,
		callable::{ArgValue, CallSite, Callable},
		value::Value,
	},
	statement::ClassDeclaration,
};

/// A declared class. Classes can be bound, passed around and printed, but
/// instances are not constructed yet.
#[derive(Debug)]
pub struct Class {
	pub declaration: Rc<ClassDeclaration>,
	pub superclass:  Option<Rc<Class>>,
}

impl Class {
	pub fn new(declaration: Rc<ClassDeclaration>, superclass: Option<Rc<Class>>) -> Self {
		Self { declaration, superclass }
	}

	/// The `init` method, if the class declares one.
	fn initializer(&self) -> Option<usize> {
		let methods = &self.declaration.methods;
		methods.iter().find(|m| m.name.lexeme.eq_ignore_ascii_case("init")).map(|m| m.parameters.len())
	}
}

impl Display for Class {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "class({})", self.declaration.name.lexeme)
	}
}

impl Callable for Class {
	fn name(&self) -> &str { &self.declaration.name.lexeme }

	fn arity(&self) -> usize { self.initializer().unwrap_or(0) }

	fn validates_arguments(&self) -> bool { false }

	fn call(&self, _: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		warn!(
			"[{}:{}] construction of class `{}` is not supported, {} argument(s) ignored",
			site.token.line,
			site.token.column,
			self.name(),
			arguments.len()
		);
		Ok(Value::Null)
	}
}
