use std::cell::Cell;

use crate::{
	connector::Row,
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter,
		callable::{ArgValue, CallSite, Callable, HostObject},
		value::Value,
	},
};

const METHODS: &[&str] = &["next", "eof", "close"];

/// Forward-only row cursor returned by `connection.open(table)`. It starts
/// on the first row; `cursor.column` reads a column of the current row.
#[derive(Debug)]
pub struct Cursor {
	rows:     Vec<Row>,
	position: Cell<usize>,
	closed:   Cell<bool>,
}

impl Cursor {
	pub fn new(rows: Vec<Row>) -> Self { Self { rows, position: Cell::new(0), closed: Cell::new(false) } }

	pub fn eof(&self) -> bool { self.position.get() >= self.rows.len() }

	/// Move to the next row; false once the rows are exhausted.
	pub fn advance(&self) -> bool {
		if !self.eof() {
			self.position.set(self.position.get() + 1);
		}
		!self.eof()
	}

	fn column(&self, name: &str) -> Result<Value, String> {
		if self.closed.get() {
			return Err("The cursor is closed.".to_string());
		}
		let row = self.rows.get(self.position.get()).ok_or_else(|| "The cursor is at end of file.".to_string())?;
		row.iter()
			.find(|(column, _)| column.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.clone())
			.ok_or_else(|| format!("Column `{name}` not found."))
	}
}

impl Callable for Cursor {
	fn name(&self) -> &str { "cursor" }

	fn arity(&self) -> usize { 0 }

	fn validates_arguments(&self) -> bool { false }

	fn call(&self, _: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		if !arguments.is_empty() {
			return Err(site.error(RuntimeErrorType::ArityMismatch { expected: 0, got: arguments.len() }));
		}
		match site.method().as_str() {
			"next" => Ok(Value::Boolean(self.advance())),
			"eof" => Ok(Value::Boolean(self.eof())),
			"close" => {
				self.closed.set(true);
				Ok(Value::Boolean(true))
			}
			_ => Err(site.error(RuntimeErrorType::UnknownMethod)),
		}
	}
}

impl HostObject for Cursor {
	fn member(&self, name: &str) -> Result<Option<Value>, String> {
		if METHODS.iter().any(|m| m.eq_ignore_ascii_case(name)) {
			return Ok(None);
		}
		self.column(name).map(Some)
	}

	fn as_callable(&self) -> &dyn Callable { self }

	fn describe(&self) -> String { format!("Object(Cursor, {} rows)", self.rows.len()) }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rows() -> Vec<Row> {
		vec![
			vec![("id".to_string(), Value::Number(1.0)), ("name".to_string(), Value::String("ada".into()))],
			vec![("id".to_string(), Value::Number(2.0)), ("name".to_string(), Value::String("bob".into()))],
		]
	}

	#[test]
	fn walks_rows_forward() {
		let cursor = Cursor::new(rows());
		assert_eq!(cursor.member("NAME"), Ok(Some(Value::String("ada".into()))));
		assert!(cursor.advance());
		assert_eq!(cursor.member("id"), Ok(Some(Value::Number(2.0))));
		assert!(!cursor.advance());
		assert!(cursor.eof());
		assert!(cursor.member("id").is_err());
	}

	#[test]
	fn methods_are_not_columns() {
		let cursor = Cursor::new(rows());
		assert_eq!(cursor.member("next"), Ok(None));
		assert_eq!(cursor.member("missing"), Err("Column `missing` not found.".to_string()));
	}
}
