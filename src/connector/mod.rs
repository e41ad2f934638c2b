//! The `connection` prototype: a namespace scope holding connection settings
//! plus `connect`, `disconnect` and `open` methods. Actual databases plug in
//! through the [`Driver`] trait, selected by the numeric `provider` id the
//! script assigns (`_MYSQL`, `_MSSQL`, ...).

mod cursor;
mod memory;

use std::{
	cell::RefCell,
	collections::HashMap,
	fmt::Debug,
	rc::{Rc, Weak},
};

pub use cursor::Cursor;
use log::debug;
pub use memory::MemoryDriver;

use crate::{
	environment::{Environment, Scope},
	error::interpreter::{RuntimeError, RuntimeErrorType},
	interpreter::{
		Interpreter,
		callable::{ArgValue, CallSite, Callable},
		value::Value,
	},
};

/// One result row as `(column, value)` pairs in column order.
pub type Row = Vec<(String, Value)>;

/// Connection properties read from the `connection` scope at connect time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionSettings {
	pub provider: Value,
	pub server:   String,
	pub database: String,
	pub user:     String,
	pub password: String,
	pub port:     String,
}

/// A database backend.
pub trait Driver: Debug {
	fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn Session>, String>;
}

/// A live connection.
pub trait Session: Debug {
	/// All rows of `table`, read forward only by the cursor.
	fn open(&mut self, table: &str) -> Result<Vec<Row>, String>;

	fn close(&mut self) -> Result<(), String>;
}

/// Drivers keyed by provider id.
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
	drivers: HashMap<i64, Rc<dyn Driver>>,
}

impl DriverRegistry {
	pub fn register(&mut self, provider: i64, driver: Rc<dyn Driver>) { self.drivers.insert(provider, driver); }

	fn lookup(&self, provider: &Value) -> Result<Rc<dyn Driver>, String> {
		let id = match provider {
			Value::Number(n) if n.fract() == 0.0 => *n as i64,
			Value::String(s) => s.trim().parse::<i64>().map_err(|_| format!("Unknown provider `{s}`."))?,
			other => return Err(format!("Unknown provider `{other}`.")),
		};
		self.drivers.get(&id).cloned().ok_or_else(|| format!("No driver registered for provider {id}."))
	}
}

const PROPERTIES: &[&str] = &["provider", "server", "database", "user", "password", "port"];

const NOT_CONNECTED: &str = "The connection object is not connected.";

/// Build the `connection` prototype and bind it as a global constant.
pub fn install(globals: &Scope, registry: DriverRegistry) {
	let connection = Scope::new(Environment::default());
	{
		let mut scope = connection.borrow_mut();
		for property in PROPERTIES {
			scope.define_native_variable(property, Value::String(String::new()));
		}
		let handle: Rc<dyn Callable> = Rc::new(ConnectionHandle {
			settings: connection.downgrade(),
			registry,
			session: RefCell::new(None),
		});
		for method in ["connect", "disconnect", "open"] {
			scope.define_native(method, Value::Native(handle.clone()));
		}
	}
	globals.borrow_mut().define_native("connection", Value::Scope(connection));
}

/// The methods of the connection prototype. It refers back to its scope
/// weakly since the scope owns it.
#[derive(Debug)]
struct ConnectionHandle {
	settings: Weak<RefCell<Environment>>,
	registry: DriverRegistry,
	session:  RefCell<Option<Box<dyn Session>>>,
}

impl ConnectionHandle {
	fn settings(&self) -> Result<ConnectionSettings, String> {
		let scope = self.settings.upgrade().ok_or_else(|| "The connection object was released.".to_string())?;
		let scope = scope.borrow();
		let text = |name: &str| scope.lookup(name).map(|v| v.to_string()).unwrap_or_default();
		Ok(ConnectionSettings {
			provider: scope.lookup("provider").unwrap_or_default(),
			server:   text("server"),
			database: text("database"),
			user:     text("user"),
			password: text("password"),
			port:     text("port"),
		})
	}

	fn connect(&self) -> Result<Value, String> {
		if self.session.borrow().is_some() {
			return Ok(Value::Boolean(true));
		}
		let settings = self.settings()?;
		let driver = self.registry.lookup(&settings.provider)?;
		debug!("connecting to `{}` on `{}:{}`", settings.database, settings.server, settings.port);
		*self.session.borrow_mut() = Some(driver.connect(&settings)?);
		Ok(Value::Boolean(true))
	}

	fn open(&self, table: &Value) -> Result<Value, String> {
		let mut session = self.session.borrow_mut();
		let session = session.as_mut().ok_or_else(|| NOT_CONNECTED.to_string())?;
		debug!("opening table `{table}`");
		let rows = session.open(&table.to_string())?;
		Ok(Value::Object(Rc::new(Cursor::new(rows))))
	}

	fn disconnect(&self) -> Result<Value, String> {
		let mut session = self.session.borrow_mut().take().ok_or_else(|| NOT_CONNECTED.to_string())?;
		debug!("closing connection");
		session.close()?;
		Ok(Value::Boolean(true))
	}
}

impl Callable for ConnectionHandle {
	fn name(&self) -> &str { "connection" }

	fn arity(&self) -> usize { 0 }

	fn validates_arguments(&self) -> bool { false }

	fn call(&self, _: &mut Interpreter, site: &CallSite, arguments: Vec<ArgValue>) -> Result<Value, RuntimeError> {
		let result = match site.method().as_str() {
			"connect" => self.connect(),
			"disconnect" => self.disconnect(),
			"open" => {
				if arguments.len() != 1 {
					return Err(site.error(RuntimeErrorType::ArityMismatch { expected: 1, got: arguments.len() }));
				}
				self.open(&arguments[0].value)
			}
			_ => return Err(site.error(RuntimeErrorType::UnknownMethod)),
		};
		result.map_err(|message| site.error(RuntimeErrorType::Host(message)))
	}
}
