use std::collections::HashMap;

use log::debug;

use crate::{
	connector::{ConnectionSettings, Driver, Row, Session},
	interpreter::value::Value,
};

/// A driver over tables held in memory. Table names are case insensitive.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
	tables: HashMap<String, Vec<Row>>,
}

impl MemoryDriver {
	pub fn new() -> Self { Self::default() }

	/// Add a table; every row lists its values in `columns` order.
	pub fn with_table(mut self, name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
		let rows = rows
			.into_iter()
			.map(|values| columns.iter().map(|c| c.to_string()).zip(values).collect::<Row>())
			.collect();
		self.tables.insert(name.to_lowercase(), rows);
		self
	}
}

impl Driver for MemoryDriver {
	fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn Session>, String> {
		debug!("memory driver connected for database `{}`", settings.database);
		Ok(Box::new(MemorySession { tables: self.tables.clone(), open: true }))
	}
}

#[derive(Debug)]
struct MemorySession {
	tables: HashMap<String, Vec<Row>>,
	open:   bool,
}

impl Session for MemorySession {
	fn open(&mut self, table: &str) -> Result<Vec<Row>, String> {
		if !self.open {
			return Err("The connection is closed.".to_string());
		}
		self.tables.get(&table.to_lowercase()).cloned().ok_or_else(|| format!("Table `{table}` doesn't exist."))
	}

	fn close(&mut self) -> Result<(), String> {
		self.open = false;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sessions_read_tables() {
		let driver = MemoryDriver::new().with_table("People", &["id", "name"], vec![vec![
			Value::Number(1.0),
			Value::String("ada".into()),
		]]);
		let mut session = driver.connect(&ConnectionSettings::default()).unwrap();
		let rows = session.open("people").unwrap();
		assert_eq!(rows[0][1], ("name".to_string(), Value::String("ada".into())));
		assert!(session.open("missing").is_err());
		session.close().unwrap();
		assert!(session.open("people").is_err());
	}
}
