//! Missing-reference handler chain.
//!
//! When a direct lookup misses, [`crate::Dependencies::reference`] consults
//! the installed handlers in installation order. The first handler that
//! answers [`Resolution::Resolved`] wins.

use std::fmt;
use std::sync::Arc;

use constload_names::QualifiedName;
use parking_lot::RwLock;

use crate::Dependencies;
use crate::error::Result;
use crate::value::Value;

/// Stable identity of a handler; installing the same id twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(&'static str);

impl HandlerId {
	/// Creates a handler id.
	pub const fn new(id: &'static str) -> Self {
		Self(id)
	}

	/// Returns the id string.
	pub const fn as_str(self) -> &'static str {
		self.0
	}
}

impl fmt::Display for HandlerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Outcome of one handler.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// The handler produced a value for the name.
	Resolved(Value),
	/// The handler could not resolve the name; try the next one.
	Unresolved,
}

/// Handles references to unbound names.
pub trait MissingHandler: Send + Sync {
	/// Identity used for idempotent installation.
	fn id(&self) -> HandlerId;

	/// Attempts to resolve `name` referenced from `scope` (`None` at the root).
	fn resolve(&self, deps: &Dependencies, scope: Option<&QualifiedName>, name: &str) -> Result<Resolution>;
}

/// Ordered, de-duplicated list of installed handlers.
#[derive(Default)]
pub struct HookChain {
	handlers: RwLock<Vec<Arc<dyn MissingHandler>>>,
}

impl HookChain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `handler` unless a handler with the same id is installed.
	///
	/// Returns whether the chain changed.
	pub fn install(&self, handler: Arc<dyn MissingHandler>) -> bool {
		let mut handlers = self.handlers.write();
		let id = handler.id();
		if handlers.iter().any(|h| h.id() == id) {
			tracing::debug!(%id, "missing-reference handler already installed");
			return false;
		}
		tracing::debug!(%id, "installed missing-reference handler");
		handlers.push(handler);
		true
	}

	/// Removes the handler with `id`, returning whether one was installed.
	pub fn uninstall(&self, id: HandlerId) -> bool {
		let mut handlers = self.handlers.write();
		let before = handlers.len();
		handlers.retain(|h| h.id() != id);
		handlers.len() != before
	}

	/// Returns true if a handler with `id` is installed.
	pub fn is_installed(&self, id: HandlerId) -> bool {
		self.handlers.read().iter().any(|h| h.id() == id)
	}

	/// Installed handlers, in order. The chain lock is not held by the result.
	pub fn handlers(&self) -> Vec<Arc<dyn MissingHandler>> {
		self.handlers.read().clone()
	}

	/// Number of installed handlers.
	pub fn len(&self) -> usize {
		self.handlers.read().len()
	}

	/// Returns true if no handler is installed.
	pub fn is_empty(&self) -> bool {
		self.handlers.read().is_empty()
	}
}

impl fmt::Debug for HookChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let ids: Vec<_> = self.handlers.read().iter().map(|h| h.id()).collect();
		f.debug_struct("HookChain").field("handlers", &ids).finish()
	}
}
