//! Host functions and constants preloaded into the global scope.

use std::{
	rc::Rc,
	time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, info};

use crate::{
	environment::{Environment, Scope},
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter,
		array::Array,
		callable::{ArgValue, CallSite, Callable, check_arguments},
		value::{ExpectedKind, Value},
	},
};

type NativeFn = fn(&CallSite, &[ArgValue]) -> Result<Value, RuntimeError>;

/// A builtin function. Arity is the number of expected kinds; the kinds are
/// matched only when `check_types` is set.
#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
	pub name:        &'static str,
	pub kinds:       &'static [ExpectedKind],
	pub check_types: bool,
	pub function:    NativeFn,
}

impl Callable for NativeFunction {
	fn name(&self) -> &str { self.name }

	fn arity(&self) -> usize { self.kinds.len() }

	fn parameter_kinds(&self) -> &[ExpectedKind] { self.kinds }

	fn call(&self, _: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		check_arguments(site, self.parameter_kinds(), &arguments, self.check_types)?;
		(self.function)(site, &arguments)
	}
}

const BUILTINS: &[NativeFunction] = &[
	NativeFunction { name: "alltrim", kinds: &[ExpectedKind::String], check_types: true, function: alltrim },
	NativeFunction { name: "len", kinds: &[ExpectedKind::String], check_types: false, function: len },
	NativeFunction { name: "tick", kinds: &[], check_types: false, function: tick },
	NativeFunction { name: "tack", kinds: &[ExpectedKind::Number], check_types: true, function: tack },
];

/// Define the version constants, provider ids, prototypes and functions.
pub fn register(globals: &Scope) {
	info!("registering builtins");
	let mut globals = globals.borrow_mut();
	globals.define_native("_VERSION", Value::String("1.0".to_string()));
	globals.define_native("_AUTHOR", Value::String("FoxDream authors".to_string()));
	globals.define_native("_MYSQL", Value::Number(1.0));
	globals.define_native("_MSSQL", Value::Number(2.0));
	globals.define_native("empty", Value::Scope(Scope::new(Environment::default())));
	globals.define_native("array", Value::Array(Array::default()));

	for builtin in BUILTINS {
		debug!("defining native function '{}'", builtin.name);
		globals.define_native(builtin.name, Value::Native(Rc::new(*builtin)));
	}
}

fn now(site: &CallSite) -> Result<f64, RuntimeError> {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_secs_f64())
		.map_err(|e| site.error(RuntimeErrorType::Host(format!("Clock error: {e}"))))
}

fn alltrim(_: &CallSite, arguments: &[ArgValue]) -> Result<Value, RuntimeError> {
	Ok(match &arguments[0].value {
		Value::Null => Value::Null,
		value => Value::String(value.to_string().trim().to_string()),
	})
}

fn len(_: &CallSite, arguments: &[ArgValue]) -> Result<Value, RuntimeError> {
	Ok(match &arguments[0].value {
		Value::String(s) => Value::Number(s.chars().count() as f64),
		_ => Value::Number(0.0),
	})
}

fn tick(site: &CallSite, _: &[ArgValue]) -> Result<Value, RuntimeError> { Ok(Value::Number(now(site)?)) }

fn tack(site: &CallSite, arguments: &[ArgValue]) -> Result<Value, RuntimeError> {
	let start = match arguments[0].value {
		Value::Number(n) => n,
		_ => 0.0,
	};
	Ok(Value::Number(now(site)? - start))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scanner::{Category, Token, TokenKind};

	fn token() -> Token { Token::new(TokenKind::Identifier, Category::Identifier, "f", 1, 1) }

	fn argument(value: Value) -> ArgValue { ArgValue { token: token(), label: None, value } }

	#[test]
	fn builtins_are_constants() {
		let globals = Scope::new(Environment::default());
		register(&globals);
		assert_eq!(globals.borrow().lookup("_version").unwrap(), Value::String("1.0".into()));
		assert_eq!(globals.borrow().lookup("_MSSQL").unwrap(), Value::Number(2.0));
		assert!(globals.borrow_mut().assign("alltrim", Value::Null).is_err());
	}

	#[test]
	fn native_functions() {
		let token = token();
		let site = CallSite { token: &token, member: None };
		assert_eq!(alltrim(&site, &[argument(Value::String("  a b ".into()))]), Ok(Value::String("a b".into())));
		assert_eq!(alltrim(&site, &[argument(Value::Null)]), Ok(Value::Null));
		assert_eq!(len(&site, &[argument(Value::String("héllo".into()))]), Ok(Value::Number(5.0)));
		assert_eq!(len(&site, &[argument(Value::Number(12.0))]), Ok(Value::Number(0.0)));
		let Ok(Value::Number(start)) = tick(&site, &[]) else { panic!("tick must yield a number") };
		let Ok(Value::Number(elapsed)) = tack(&site, &[argument(Value::Number(start))]) else {
			panic!("tack must yield a number")
		};
		assert!(elapsed >= 0.0);
	}

	#[test]
	fn argument_checks_are_permissive() {
		let token = token();
		let site = CallSite { token: &token, member: None };
		let kinds = &[ExpectedKind::String];
		assert!(check_arguments(&site, kinds, &[argument(Value::Null)], true).is_ok());
		assert_eq!(
			check_arguments(&site, kinds, &[argument(Value::Number(1.0))], true).map_err(|e| e.r#type),
			Err(RuntimeErrorType::ArgumentType { expected: "String", got: "Double" })
		);
		assert!(check_arguments(&site, kinds, &[argument(Value::Number(1.0))], false).is_ok());
		assert_eq!(
			check_arguments(&site, kinds, &[], true).map_err(|e| e.r#type),
			Err(RuntimeErrorType::ArgumentCount { expected: 1, got: 0 })
		);
	}
}
