//! Set of constants marked for removal on the next clear.

use constload_names::QualifiedName;
use indexmap::IndexSet;
use parking_lot::Mutex;

/// Names explicitly marked unloadable, in marking order.
#[derive(Debug, Default)]
pub struct UnloadableRegistry {
	names: Mutex<IndexSet<QualifiedName>>,
}

impl UnloadableRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `name`. Returns false if it was already marked.
	pub fn mark(&self, name: QualifiedName) -> bool {
		let added = self.names.lock().insert(name.clone());
		if added {
			tracing::debug!(%name, "marked unloadable");
		}
		added
	}

	/// Returns true if `name` is marked.
	pub fn is_marked(&self, name: &QualifiedName) -> bool {
		self.names.lock().contains(name)
	}

	/// Removes one name, returning whether it was marked.
	pub fn unmark(&self, name: &QualifiedName) -> bool {
		self.names.lock().shift_remove(name)
	}

	/// Marked names in marking order.
	pub fn snapshot(&self) -> Vec<QualifiedName> {
		self.names.lock().iter().cloned().collect()
	}

	/// Forgets every marked name.
	pub fn clear(&self) {
		self.names.lock().clear();
	}

	/// Number of marked names.
	pub fn len(&self) -> usize {
		self.names.lock().len()
	}

	/// Returns true if nothing is marked.
	pub fn is_empty(&self) -> bool {
		self.names.lock().is_empty()
	}
}
