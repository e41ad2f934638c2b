use std::{fmt::Display, rc::Rc};

use log::trace;

use crate::{
	environment::{BindingKind, Environment, Scope},
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter, Signal,
		callable::{ArgValue, CallSite, Callable},
		value::Value,
	},
	statement::FunctionDeclaration,
};

/// A user function: its declaration plus the scope it was defined in.
#[derive(Debug)]
pub struct Function {
	pub declaration: Rc<FunctionDeclaration>,
	pub closure:     Scope,
}

impl Function {
	pub fn new(declaration: Rc<FunctionDeclaration>, closure: Scope) -> Self { Self { declaration, closure } }

	/// Bind parameters in the fresh call scope: defaults first, then the
	/// supplied arguments on top of them.
	fn bind(&self, interpreter: &mut Interpreter, scope: &Scope, arguments: Vec<ArgValue>) -> Result<(), RuntimeError> {
		let parameters = &self.declaration.parameters;
		for parameter in parameters {
			let value = match &parameter.default {
				Some(default) => interpreter.evaluate_in(default, scope.clone())?,
				None => Value::Null,
			};
			scope
				.borrow_mut()
				.define(&parameter.name.lexeme, value, BindingKind::Variable)
				.map_err(|e| RuntimeError::new(&parameter.name, e.into()))?;
		}

		for (position, argument) in arguments.into_iter().enumerate() {
			let parameter = match &argument.label {
				None => match parameters.get(position) {
					// An omitted or null positional argument keeps the default.
					Some(_) if matches!(argument.value, Value::Null) => continue,
					Some(parameter) => parameter,
					None => continue,
				},
				Some(label) => parameters
					.iter()
					.find(|p| p.accepts(label))
					.ok_or_else(|| RuntimeError::new(&argument.token, RuntimeErrorType::UnknownArgument(label.clone())))?,
			};
			scope
				.borrow_mut()
				.assign_own(&parameter.name.lexeme, argument.value)
				.map_err(|e| RuntimeError::new(&argument.token, e.into()))?;
		}
		Ok(())
	}

	/// Run the body in a fresh call scope, then the defers after a `return`.
	fn invoke(&self, interpreter: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		let scope = Environment::child(&self.closure);
		self.bind(interpreter, &scope, arguments)?;

		match interpreter.execute_block(&self.declaration.body, scope.clone())? {
			Signal::Normal => Ok(Value::Null),
			Signal::Returned(value) => {
				for defer in self.declaration.defers.iter().rev() {
					match interpreter.execute_block(&defer.statements, scope.clone())? {
						Signal::Normal | Signal::Returned(_) => {}
						Signal::Looped => return Err(site.error(RuntimeErrorType::ControlOutsideLoop("loop"))),
						Signal::Exited => return Err(site.error(RuntimeErrorType::ControlOutsideLoop("exit"))),
					}
				}
				Ok(value)
			}
			Signal::Looped => Err(site.error(RuntimeErrorType::ControlOutsideLoop("loop"))),
			Signal::Exited => Err(site.error(RuntimeErrorType::ControlOutsideLoop("exit"))),
		}
	}
}

impl Display for Function {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "fn({})", self.declaration.name.lexeme)
	}
}

impl Callable for Function {
	fn name(&self) -> &str { &self.declaration.name.lexeme }

	fn arity(&self) -> usize { self.declaration.parameters.len() }

	fn call(&self, interpreter: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		trace!("call {} with {} argument(s)", self.name(), arguments.len());
		interpreter.enter_call(site)?;
		let result = self.invoke(interpreter, site, arguments);
		interpreter.leave_call();
		result
	}
}

