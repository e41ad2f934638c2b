use std::fmt::Display;

use crate::{
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter,
		callable::{ArgValue, CallSite, Callable},
		value::Value,
	},
	utils::RcCell,
};

/// Ordered, mutable and shared list of values. Clones alias the same storage.
#[derive(Debug, Clone, Default)]
pub struct Array(RcCell<Vec<Value>>);

impl Array {
	pub fn from_values(values: Vec<Value>) -> Self { Self(RcCell::new(values)) }

	pub fn push(&self, value: Value) { self.0.borrow_mut().push(value) }

	pub fn len(&self) -> usize { self.0.borrow().len() }

	/// Snapshot of the elements.
	pub fn values(&self) -> Vec<Value> { self.0.borrow().clone() }

	pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }

	/// Element at a numeric index, 0-based.
	pub fn get(&self, index: f64) -> Result<Value, RuntimeErrorType> {
		let slot = self.slot(index)?;
		Ok(self.0.borrow()[slot].clone())
	}

	/// Replace the element at `index`, yielding the previous one.
	pub fn set(&self, index: f64, value: Value) -> Result<Value, RuntimeErrorType> {
		let slot = self.slot(index)?;
		Ok(std::mem::replace(&mut self.0.borrow_mut()[slot], value))
	}

	fn slot(&self, index: f64) -> Result<usize, RuntimeErrorType> {
		let len = self.len();
		if index < 0.0 || index.fract() != 0.0 || index >= len as f64 {
			return Err(RuntimeErrorType::IndexOutOfBounds { index, len });
		}
		Ok(index as usize)
	}

	fn position(&self, value: &Value) -> Option<usize> { self.0.borrow().iter().position(|v| v.equals(value)) }
}

impl Array {
	/// Writes `[a, b]`. An array already on the `seen` path prints as `[...]`.
	pub(crate) fn render(&self, f: &mut std::fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> std::fmt::Result {
		let id = self.0.as_ptr();
		if seen.contains(&id) {
			return write!(f, "[...]");
		}
		seen.push(id);
		write!(f, "[")?;
		for (i, value) in self.0.borrow().iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			value.render(f, seen)?;
		}
		seen.pop();
		write!(f, "]")
	}
}

impl Display for Array {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.render(f, &mut Vec::new()) }
}

fn expect_count(site: &CallSite, arguments: &[ArgValue], expected: usize) -> Result<(), RuntimeError> {
	if arguments.len() != expected {
		return Err(site.error(RuntimeErrorType::ArityMismatch { expected, got: arguments.len() }));
	}
	Ok(())
}

fn index_of(argument: &ArgValue) -> Result<f64, RuntimeError> {
	match argument.value {
		Value::Number(n) => Ok(n),
		_ => Err(RuntimeError::new(&argument.token, RuntimeErrorType::IndexNotNumber)),
	}
}

/// Array methods dispatch on the member name used at the call site.
impl Callable for Array {
	fn name(&self) -> &str { "array" }

	fn arity(&self) -> usize { self.len() }

	fn validates_arguments(&self) -> bool { false }

	fn call(&self, _: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		match site.method().as_str() {
			"add" => {
				expect_count(site, &arguments, 1)?;
				self.push(arguments[0].value.clone());
				Ok(Value::Boolean(true))
			}
			"remove" => {
				expect_count(site, &arguments, 1)?;
				let removed = self.position(&arguments[0].value).map(|i| self.0.borrow_mut().remove(i));
				Ok(Value::Boolean(removed.is_some()))
			}
			"contains" => {
				expect_count(site, &arguments, 1)?;
				Ok(Value::Boolean(self.position(&arguments[0].value).is_some()))
			}
			"get" => {
				expect_count(site, &arguments, 1)?;
				let index = index_of(&arguments[0])?;
				self.get(index).map_err(|e| site.error(e))
			}
			"set" => {
				expect_count(site, &arguments, 2)?;
				let index = index_of(&arguments[0])?;
				self.set(index, arguments[1].value.clone()).map_err(|e| site.error(e))
			}
			"len" => {
				expect_count(site, &arguments, 0)?;
				Ok(Value::Number(self.len() as f64))
			}
			"indexof" => {
				expect_count(site, &arguments, 1)?;
				Ok(Value::Number(self.position(&arguments[0].value).map_or(-1.0, |i| i as f64)))
			}
			_ => Err(site.error(RuntimeErrorType::UnknownMethod)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clones_share_storage() {
		let array = Array::default();
		let alias = array.clone();
		alias.push(Value::Number(1.0));
		assert_eq!(array.len(), 1);
		assert!(array.ptr_eq(&alias));
		assert!(!array.ptr_eq(&Array::default()));
	}

	#[test]
	fn index_bounds() {
		let array = Array::from_values(vec![Value::Number(1.0), Value::String("b".into())]);
		assert_eq!(array.get(1.0), Ok(Value::String("b".into())));
		assert_eq!(array.get(2.0), Err(RuntimeErrorType::IndexOutOfBounds { index: 2.0, len: 2 }));
		assert!(array.get(-1.0).is_err());
		assert!(array.get(0.5).is_err());
		assert_eq!(array.set(0.0, Value::Null), Ok(Value::Number(1.0)));
		assert_eq!(array.to_string(), "[null, b]");
	}
}
