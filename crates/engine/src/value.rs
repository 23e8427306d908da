//! Bound values and the pre-removal capability.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use constload_names::QualifiedName;

use crate::error::{InvalidTarget, Result};
use crate::store::BindingStore;
use crate::Dependencies;

/// Error returned by a [`BeforeRemove`] callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
	message: String,
}

impl CallbackError {
	/// Creates a callback error with a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}

	/// Returns the message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Optional capability of a bound value: a callback run immediately before its
/// binding is removed.
///
/// The binding is still present in `store` while the callback runs.
pub trait BeforeRemove: Send + Sync {
	/// Runs before `value` is unbound.
	fn before_remove(&self, value: &Value, store: &BindingStore) -> std::result::Result<(), CallbackError>;
}

impl<F> BeforeRemove for F
where
	F: Fn(&Value, &BindingStore) -> std::result::Result<(), CallbackError> + Send + Sync,
{
	fn before_remove(&self, value: &Value, store: &BindingStore) -> std::result::Result<(), CallbackError> {
		self(value, store)
	}
}

/// Pins a closure to the [`BeforeRemove`] signature so its argument and
/// return types are inferred.
pub fn before_remove_fn<F>(f: F) -> F
where
	F: Fn(&Value, &BindingStore) -> std::result::Result<(), CallbackError> + Send + Sync,
{
	f
}

/// Payload of values created for autoloaded namespace directories.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Namespace;

struct ValueInner {
	payload: Box<dyn Any + Send + Sync>,
	name: OnceLock<QualifiedName>,
	before_remove: Option<Box<dyn BeforeRemove>>,
}

/// Handle to a value that can be bound to a constant name.
///
/// Cloning is cheap and preserves identity; see [`Value::ptr_eq`]. A value
/// takes the name it is first bound under and keeps it for life, even if it is
/// later unbound or bound elsewhere.
#[derive(Clone)]
pub struct Value {
	inner: Arc<ValueInner>,
}

impl Value {
	/// Creates an anonymous value wrapping `payload`.
	pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
		Self::build(Box::new(payload), None)
	}

	/// Creates an anonymous value that exposes a pre-removal callback.
	pub fn with_before_remove<T, B>(payload: T, callback: B) -> Self
	where
		T: Any + Send + Sync,
		B: BeforeRemove + 'static,
	{
		Self::build(Box::new(payload), Some(Box::new(callback)))
	}

	/// Creates an empty namespace value.
	pub fn namespace() -> Self {
		Self::new(Namespace)
	}

	fn build(payload: Box<dyn Any + Send + Sync>, before_remove: Option<Box<dyn BeforeRemove>>) -> Self {
		Self {
			inner: Arc::new(ValueInner {
				payload,
				name: OnceLock::new(),
				before_remove,
			}),
		}
	}

	/// Name this value was first bound under, `None` while anonymous.
	pub fn name(&self) -> Option<&QualifiedName> {
		self.inner.name.get()
	}

	/// Returns true if the value has never been bound.
	pub fn is_anonymous(&self) -> bool {
		self.name().is_none()
	}

	/// Returns true if this is an autoloaded namespace value.
	pub fn is_namespace(&self) -> bool {
		self.downcast_ref::<Namespace>().is_some()
	}

	/// Borrows the payload as `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.payload.downcast_ref()
	}

	/// Pre-removal callback, if the value exposes one.
	pub fn before_remove_hook(&self) -> Option<&dyn BeforeRemove> {
		self.inner.before_remove.as_deref()
	}

	/// Returns true if both handles refer to the same value.
	pub fn ptr_eq(&self, other: &Value) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Marks this value's constant unloadable in `deps`.
	///
	/// Returns whether the unloadable set changed. Fails with
	/// [`InvalidTarget`] when the value is anonymous or its name no longer
	/// resolves to this value.
	pub fn unloadable(&self, deps: &Dependencies) -> Result<bool> {
		let name = self.name().ok_or(InvalidTarget::Anonymous)?;
		match deps.store().lookup(name) {
			Some(bound) if bound.ptr_eq(self) => Ok(deps.unloadable().mark(name.clone())),
			_ => Err(InvalidTarget::Unreachable(name.clone()).into()),
		}
	}

	pub(crate) fn assign_name(&self, name: &QualifiedName) {
		let _ = self.inner.name.set(name.clone());
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Value")
			.field("name", &self.name())
			.field("namespace", &self.is_namespace())
			.field("before_remove", &self.inner.before_remove.is_some())
			.finish()
	}
}
