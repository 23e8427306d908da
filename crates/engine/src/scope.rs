//! Reference scopes and their missing-reference counters.

use std::sync::atomic::{AtomicU64, Ordering};

use constload_names::{QualifiedName, qualify};

/// Namespace a reference is made from.
///
/// A scope that intercepts misses counts each one; see
/// [`crate::Dependencies::reference`].
#[derive(Debug, Default)]
pub struct Scope {
	path: Option<QualifiedName>,
	intercepts: bool,
	missing: AtomicU64,
}

impl Scope {
	/// The top-level scope.
	pub fn root() -> Self {
		Self::default()
	}

	/// A scope nested at `path`.
	pub fn new(path: QualifiedName) -> Self {
		Self {
			path: Some(path),
			..Self::default()
		}
	}

	/// Opts this scope into intercepting misses even when no hook is installed.
	pub fn intercepting(mut self) -> Self {
		self.intercepts = true;
		self
	}

	/// Namespace path, `None` at the root.
	pub fn path(&self) -> Option<&QualifiedName> {
		self.path.as_ref()
	}

	/// Returns true if this scope opted into intercepting misses.
	pub fn intercepts(&self) -> bool {
		self.intercepts
	}

	/// Number of misses intercepted in this scope.
	pub fn missing_count(&self) -> u64 {
		self.missing.load(Ordering::Acquire)
	}

	pub(crate) fn record_miss(&self) -> u64 {
		self.missing.fetch_add(1, Ordering::AcqRel) + 1
	}

	pub(crate) fn qualify(&self, name: &str) -> constload_names::Result<QualifiedName> {
		qualify(self.path(), name)
	}
}
