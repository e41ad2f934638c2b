use std::{fmt::Display, rc::Rc};

use crate::{
	environment::Scope,
	error::interpreter::RuntimeErrorType,
	interpreter::{
		array::Array,
		callable::{Callable, HostObject},
		class::Class,
		function::Function,
	},
	scanner::{Category, Literal},
};

/// Value represents a runtime value in FoxDream.
#[derive(Debug, Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Boolean(bool),
	Number(f64),
	String(String),
	Array(Array),
	Function(Rc<Function>),
	Class(Rc<Class>),
	/// Any scope accessed as a namespaced object, e.g. a module.
	Scope(Scope),
	/// Host registered callable such as a builtin.
	Native(Rc<dyn Callable>),
	/// Host registered object with its own member lookup, e.g. a cursor.
	Object(Rc<dyn HostObject>),
}

/// Closed set of runtime value tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
	Null,
	Boolean,
	Number,
	String,
	Array,
	Function,
	Class,
	Scope,
	Native,
	Object,
}

impl ValueTag {
	/// Runtime type name, the text builtin argument validation matches against.
	pub fn type_name(self) -> &'static str {
		match self {
			ValueTag::Null => "null",
			ValueTag::Boolean => "Boolean",
			ValueTag::Number => "Double",
			ValueTag::String => "String",
			ValueTag::Array => "RuntimeArray",
			ValueTag::Function => "RuntimeFunction",
			ValueTag::Class => "RuntimeClass",
			ValueTag::Scope => "Environment",
			ValueTag::Native => "BuiltinFunction",
			ValueTag::Object => "HostObject",
		}
	}
}

/// The kind of value a builtin parameter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
	String,
	Number,
}

impl ExpectedKind {
	pub fn name(self) -> &'static str {
		match self {
			ExpectedKind::String => "String",
			ExpectedKind::Number => "Double",
		}
	}

	/// Permissive compatibility: a value is accepted when its runtime type name
	/// contains the expected name, not only when it equals it. Null is
	/// accepted for every kind.
	pub fn accepts(self, tag: ValueTag) -> bool { tag == ValueTag::Null || tag.type_name().contains(self.name()) }
}

impl From<&Literal> for Value {
	fn from(literal: &Literal) -> Self {
		match literal {
			Literal::None | Literal::Null => Value::Null,
			Literal::Boolean(b) => Value::Boolean(*b),
			Literal::Number(n) => Value::Number(*n),
			Literal::String(s) => Value::String(s.clone()),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool { self.equals(other) }
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Boolean(b) => write!(f, "{b}"),
			Value::Number(n) => {
				if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
					write!(f, "{}", *n as i64)
				} else {
					write!(f, "{n}")
				}
			}
			Value::String(s) => write!(f, "{s}"),
			Value::Array(_) | Value::Scope(_) => self.render(f, &mut Vec::new()),
			Value::Function(function) => write!(f, "{function}"),
			Value::Class(class) => write!(f, "{class}"),
			Value::Native(native) => write!(f, "fn({})", native.name()),
			Value::Object(object) => write!(f, "{}", object.describe()),
		}
	}
}

impl Value {
	/// Display form of nested containers. `seen` holds the arrays and scopes
	/// being written further up, which print as `[...]` or `{...}` when met again.
	pub(crate) fn render(&self, f: &mut std::fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> std::fmt::Result {
		match self {
			Value::Array(array) => array.render(f, seen),
			Value::Scope(scope) => {
				let id = scope.as_ptr();
				if seen.contains(&id) {
					return write!(f, "{{...}}");
				}
				seen.push(id);
				scope.borrow().render(f, seen)?;
				seen.pop();
				Ok(())
			}
			other => write!(f, "{other}"),
		}
	}

	pub fn tag(&self) -> ValueTag {
		match self {
			Value::Null => ValueTag::Null,
			Value::Boolean(_) => ValueTag::Boolean,
			Value::Number(_) => ValueTag::Number,
			Value::String(_) => ValueTag::String,
			Value::Array(_) => ValueTag::Array,
			Value::Function(_) => ValueTag::Function,
			Value::Class(_) => ValueTag::Class,
			Value::Scope(_) => ValueTag::Scope,
			Value::Native(_) => ValueTag::Native,
			Value::Object(_) => ValueTag::Object,
		}
	}

	/// The Callable capability of this value, if it has one.
	pub fn as_callable(&self) -> Option<&dyn Callable> {
		match self {
			Value::Array(array) => Some(array),
			Value::Function(function) => Some(function.as_ref()),
			Value::Class(class) => Some(class.as_ref()),
			Value::Native(native) => Some(native.as_ref()),
			Value::Object(object) => Some(object.as_callable()),
			Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) | Value::Scope(_) => None,
		}
	}

	/// Null is false, booleans pass through, everything else is true.
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null => false,
			Value::Boolean(b) => *b,
			_ => true,
		}
	}

	/// Value equality for scalars, identity for shared values.
	pub fn equals(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Null, _) | (_, Value::Null) => false,
			(Value::Boolean(l), Value::Boolean(r)) => l == r,
			(Value::Number(l), Value::Number(r)) => l == r,
			(Value::String(l), Value::String(r)) => l == r,
			(Value::Array(l), Value::Array(r)) => l.ptr_eq(r),
			(Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
			(Value::Class(l), Value::Class(r)) => Rc::ptr_eq(l, r),
			(Value::Scope(l), Value::Scope(r)) => l.ptr_eq(r),
			(Value::Native(l), Value::Native(r)) => std::ptr::addr_eq(Rc::as_ptr(l), Rc::as_ptr(r)),
			(Value::Object(l), Value::Object(r)) => std::ptr::addr_eq(Rc::as_ptr(l), Rc::as_ptr(r)),
			_ => false,
		}
	}

	/// Performs a binary operation between two values.
	pub fn binary_op(&self, category: Category, right: &Self) -> Result<Value, RuntimeErrorType> {
		use Category::*;

		Ok(match category {
			Plus => self.plus(right)?,
			Minus => self.arithmetic(right, |l, r| l - r)?,
			Mul => self.arithmetic(right, |l, r| l * r)?,
			Div => self.divide(right)?,
			Greater => Value::Boolean(self.compare(right, |l, r| l > r)?),
			GreaterEq => Value::Boolean(self.compare(right, |l, r| l >= r)?),
			Less => Value::Boolean(self.compare(right, |l, r| l < r)?),
			LessEq => Value::Boolean(self.compare(right, |l, r| l <= r)?),
			Equal => Value::Boolean(self.equals(right)),
			NotEq => Value::Boolean(!self.equals(right)),
			_ => return Err(RuntimeErrorType::IncompatibleTypes),
		})
	}

	/// `+`: string-left concatenates, number-left adds. A non-number right
	/// operand is coerced through its textual form and, if that fails, the
	/// left operand is returned unchanged.
	pub fn plus(&self, right: &Self) -> Result<Value, RuntimeErrorType> {
		match (self, right) {
			(Value::String(l), r) => Ok(Value::String(format!("{l}{r}"))),
			(Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
			(Value::Number(l), r) => Ok(match parse_number(&r.numeric_text()) {
				Some(r) => Value::Number(l + r),
				None => self.clone(),
			}),
			_ => Err(RuntimeErrorType::IncompatibleTypes),
		}
	}

	/// Text used when coercing to a number: null is `0`, booleans `1`/`0`.
	fn numeric_text(&self) -> String {
		match self {
			Value::Null => "0".to_string(),
			Value::Boolean(b) => (if *b { "1" } else { "0" }).to_string(),
			other => other.to_string(),
		}
	}

	fn numbers(&self, right: &Self) -> Result<(f64, f64), RuntimeErrorType> {
		match (self, right) {
			(Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
			_ => Err(RuntimeErrorType::OperandsNotNumbers),
		}
	}

	fn arithmetic(&self, right: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Value, RuntimeErrorType> {
		let (l, r) = self.numbers(right)?;
		Ok(Value::Number(op(l, r)))
	}

	fn divide(&self, right: &Self) -> Result<Value, RuntimeErrorType> {
		let (l, r) = self.numbers(right)?;
		if r == 0.0 {
			return Err(RuntimeErrorType::DivisionByZero);
		}
		Ok(Value::Number(l / r))
	}

	fn compare(&self, right: &Self, op: impl Fn(f64, f64) -> bool) -> Result<bool, RuntimeErrorType> {
		let (l, r) = self.numbers(right)?;
		Ok(op(l, r))
	}
}

/// Decimal text to number. The only spelled-out values are exactly
/// `Infinity` and `NaN`, optionally signed; `inf` and friends are rejected.
fn parse_number(text: &str) -> Option<f64> {
	let text = text.trim();
	let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
	if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) && unsigned != "Infinity" && unsigned != "NaN" {
		return None;
	}
	text.parse().ok()
}
