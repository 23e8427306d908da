//! Binding store: the namespace of named bindings.
//!
//! Names are stored flat: `Admin` and `Admin::Users` are independent
//! bindings, and unbinding one leaves the other in place.

use constload_names::QualifiedName;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::value::Value;

/// Maps qualified names to bound values.
#[derive(Default)]
pub struct BindingStore {
	bindings: RwLock<FxHashMap<QualifiedName, Value>>,
}

impl BindingStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `name` to `value`, returning the previously bound value.
	///
	/// An anonymous value takes `name` as its permanent name.
	pub fn bind(&self, name: QualifiedName, value: Value) -> Option<Value> {
		value.assign_name(&name);
		self.bindings.write().insert(name, value)
	}

	/// Removes `name`, returning the value that was bound there.
	///
	/// Unbinding an absent name is a no-op.
	pub fn unbind(&self, name: &QualifiedName) -> Option<Value> {
		self.bindings.write().remove(name)
	}

	/// Returns true if `name` is bound.
	pub fn is_bound(&self, name: &QualifiedName) -> bool {
		self.bindings.read().contains_key(name)
	}

	/// Returns the value bound at `name`.
	pub fn lookup(&self, name: &QualifiedName) -> Option<Value> {
		self.bindings.read().get(name).cloned()
	}

	/// Returns all bound names, sorted.
	pub fn names(&self) -> Vec<QualifiedName> {
		let mut names: Vec<_> = self.bindings.read().keys().cloned().collect();
		names.sort();
		names
	}

	pub(crate) fn name_set(&self) -> FxHashSet<QualifiedName> {
		self.bindings.read().keys().cloned().collect()
	}

	/// Number of bindings.
	pub fn len(&self) -> usize {
		self.bindings.read().len()
	}

	/// Returns true if nothing is bound.
	pub fn is_empty(&self) -> bool {
		self.bindings.read().is_empty()
	}
}

impl std::fmt::Debug for BindingStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BindingStore").field("names", &self.names()).finish()
	}
}
