//! Chained, mutable name tables implementing lexical scoping.
//!
//! A scope is shared through [`Scope`] (an `Rc<RefCell<Environment>>`): the
//! child holds its parent, closures hold their defining scope, and a scope
//! lives for as long as anything refers to it. Names are compared case
//! insensitively by normalizing them to lowercase before hashing.

use std::{collections::HashMap, fmt::Display};

use crate::{interpreter::value::Value, utils::RcCell};

/// Clone the Scope, it's shallow copy
pub type Scope = RcCell<Environment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
	Variable,
	Constant,
}

#[derive(Debug, Clone)]
struct Binding {
	kind:  BindingKind,
	value: Value,
}

/// Failures of scope operations, positioned later by the interpreter.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
	#[error("Undefined variable `{0}`.")]
	Undefined(String),
	#[error("Constants cannot be redefined `{0}`")]
	ConstantRedefinition(String),
	#[error("Invalid constant assignment `{0}`")]
	ConstantAssignment(String),
}

#[derive(Default)]
pub struct Environment {
	bindings: HashMap<String, Binding>,
	parent:   Option<Scope>,
}

fn normalize(name: &str) -> String { name.to_lowercase() }

impl Environment {
	pub fn new(parent: Option<Scope>) -> Self { Self { bindings: HashMap::new(), parent } }

	/// A fresh shared scope whose parent is `parent`.
	pub fn child(parent: &Scope) -> Scope { RcCell::new(Self::new(Some(parent.clone()))) }

	/// Bind `name` in this scope. Only a constant already bound here blocks it.
	pub fn define(&mut self, name: &str, value: Value, kind: BindingKind) -> Result<(), ScopeError> {
		let key = normalize(name);
		if self.bindings.get(&key).is_some_and(|b| b.kind == BindingKind::Constant) {
			return Err(ScopeError::ConstantRedefinition(name.to_string()));
		}
		self.bindings.insert(key, Binding { kind, value });
		Ok(())
	}

	/// Host registration of a constant, e.g. builtins. Overwrites silently.
	pub fn define_native(&mut self, name: &str, value: Value) { self.seed(name, value, BindingKind::Constant) }

	/// Host registration of a binding scripts may reassign.
	pub fn define_native_variable(&mut self, name: &str, value: Value) { self.seed(name, value, BindingKind::Variable) }

	fn seed(&mut self, name: &str, value: Value, kind: BindingKind) {
		self.bindings.insert(normalize(name), Binding { kind, value });
	}

	pub fn lookup(&self, name: &str) -> Result<Value, ScopeError> {
		self.get(&normalize(name)).ok_or_else(|| ScopeError::Undefined(name.to_string()))
	}

	fn get(&self, key: &str) -> Option<Value> {
		match self.bindings.get(key) {
			Some(binding) => Some(binding.value.clone()),
			None => self.parent.as_ref().and_then(|parent| parent.borrow().get(key)),
		}
	}

	/// Kind of the nearest binding for `name` along the chain.
	pub fn kind_of(&self, name: &str) -> Option<BindingKind> {
		let key = normalize(name);
		match self.bindings.get(&key) {
			Some(binding) => Some(binding.kind),
			None => self.parent.as_ref().and_then(|parent| parent.borrow().kind_of(&key)),
		}
	}

	/// Assign through the chain; a name bound nowhere becomes a new variable
	/// in this scope.
	pub fn assign(&mut self, name: &str, value: Value) -> Result<(), ScopeError> {
		let key = normalize(name);
		if let Some(value) = self.assign_existing(&key, name, value)? {
			self.bindings.insert(key, Binding { kind: BindingKind::Variable, value });
		}
		Ok(())
	}

	/// Returns the value back when no scope in the chain owns `key`.
	fn assign_existing(&mut self, key: &str, name: &str, value: Value) -> Result<Option<Value>, ScopeError> {
		if let Some(binding) = self.bindings.get_mut(key) {
			if binding.kind == BindingKind::Constant {
				return Err(ScopeError::ConstantAssignment(name.to_string()));
			}
			binding.value = value;
			return Ok(None);
		}
		match &self.parent {
			Some(parent) => parent.borrow_mut().assign_existing(key, name, value),
			None => Ok(Some(value)),
		}
	}

	/// Assign in this scope only, without walking the chain. Used for member
	/// targets such as `module.name = value`.
	pub fn assign_own(&mut self, name: &str, value: Value) -> Result<(), ScopeError> {
		let key = normalize(name);
		match self.bindings.get_mut(&key) {
			Some(binding) if binding.kind == BindingKind::Constant => Err(ScopeError::ConstantAssignment(name.to_string())),
			Some(binding) => {
				binding.value = value;
				Ok(())
			}
			None => {
				self.bindings.insert(key, Binding { kind: BindingKind::Variable, value });
				Ok(())
			}
		}
	}

	/// Remove `name` from whichever scope owns it. No-op when unbound.
	pub fn release(&mut self, name: &str) {
		let key = normalize(name);
		if self.bindings.remove(&key).is_none()
			&& let Some(parent) = &self.parent
		{
			parent.borrow_mut().release(&key);
		}
	}

	/// Binding names of this scope only, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.bindings.keys().cloned().collect();
		names.sort();
		names
	}
}

// Scopes and the closures stored in them can reference each other, so the
// debug form lists names only.
impl std::fmt::Debug for Environment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Environment").field("names", &self.names()).field("has_parent", &self.parent.is_some()).finish()
	}
}

impl Environment {
	/// Writes `{k:v, ...}` with sorted keys, passing `seen` down to nested values.
	pub(crate) fn render(&self, f: &mut std::fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> std::fmt::Result {
		let mut entries = self.bindings.iter().collect::<Vec<_>>();
		entries.sort_by(|(l, _), (r, _)| l.cmp(r));
		write!(f, "{{")?;
		for (i, (name, binding)) in entries.into_iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{name}:")?;
			binding.value.render(f, seen)?;
		}
		write!(f, "}}")
	}
}

impl Display for Environment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.render(f, &mut Vec::new()) }
}
