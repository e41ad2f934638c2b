use std::{
	cell::{Ref, RefCell, RefMut},
	rc::{Rc, Weak},
};

/// Shared, interiorly mutable handle. Clones share the same cell.
#[derive(Debug, Default)]
pub struct RcCell<T> {
	inner: Rc<RefCell<T>>,
}

impl<T> Clone for RcCell<T> {
	fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T> RcCell<T> {
	pub fn new(value: T) -> Self { Self { inner: Rc::new(RefCell::new(value)) } }

	pub fn borrow(&self) -> Ref<'_, T> { self.inner.borrow() }

	pub fn borrow_mut(&self) -> RefMut<'_, T> { self.inner.borrow_mut() }

	/// Identity comparison: both handles point at the same cell.
	pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }

	/// Address of the shared cell, stable for as long as any handle lives.
	pub fn as_ptr(&self) -> *const () { Rc::as_ptr(&self.inner).cast() }

	/// Non-owning handle, for back references that must not keep the cell alive.
	pub fn downgrade(&self) -> Weak<RefCell<T>> { Rc::downgrade(&self.inner) }
}
