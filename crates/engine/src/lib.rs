//! Constant autoloading and unloading.
//!
//! A [`Dependencies`] instance owns everything needed to lazily resolve
//! constants from source files and to remove them again for reloading.
//!
//! # Mental Model
//!
//! 1. **Reference:** [`Dependencies::reference`] looks a name up in the
//!    [`BindingStore`]. On a miss in an intercepting [`Scope`], the scope's
//!    counter is bumped and the [`HookChain`] is consulted.
//! 2. **Autoload:** [`AutoloadHandler`] maps the qualified name to a path
//!    suffix, evaluates the matching source file (or binds a namespace for a
//!    matching directory), and records every constant the file defined.
//! 3. **Mark:** Evaluated code, or the host, marks constants unloadable with
//!    [`Dependencies::mark_unloadable`] or [`Value::unloadable`].
//! 4. **Clear:** [`Dependencies::clear`] runs each value's [`BeforeRemove`]
//!    callback with its binding still present, unbinds it, and resets the
//!    unloadable registry, the autoloaded set and the loaded-file ledger.
//!
//! # Lifecycle of a binding
//!
//! `UNBOUND -> BOUND -> MARKED -> UNBOUND`. A marked binding may also be
//! removed out-of-band before the clear; clearing it is then a no-op.
//!
//! # Invariants
//!
//! - Marking requires a bound name; marking twice changes nothing the second
//!   time.
//! - A pre-removal callback runs at most once per clear, before its binding
//!   is removed.
//! - After a clear that completes, the unloadable registry is empty.
//! - Installing a handler id twice is a no-op.
//!
//! # Concurrency
//!
//! Reload cycles are expected on one logical thread. Internal locks are never
//! held across callbacks or evaluation, so both may re-enter the instance.

mod autoload;
pub mod config;
pub mod error;
pub mod eval;
pub mod hook;
pub mod loader;
pub mod registry;
pub mod scope;
pub mod store;
mod unload;
pub mod value;

use std::path::PathBuf;
use std::sync::Arc;

pub use autoload::AutoloadHandler;
pub use config::{AutoloadConfig, ClearPolicy, ConfigError};
pub use constload_names::{NameError, QualifiedName};
pub use error::{AutoloadError, InvalidTarget, Result};
pub use eval::{EvalContext, SourceEvaluator, TomlEvaluator};
pub use hook::{HandlerId, HookChain, MissingHandler, Resolution};
use indexmap::{IndexMap, IndexSet};
pub use loader::{Loader, SourceUnit};
use parking_lot::Mutex;
pub use registry::UnloadableRegistry;
pub use scope::Scope;
pub use store::BindingStore;
pub use unload::ClearReport;
pub use value::{BeforeRemove, CallbackError, Namespace, Value, before_remove_fn};

/// Outcome of [`Dependencies::reference`].
#[derive(Debug, Clone)]
pub enum Reference {
	/// The name is bound, directly or after resolution.
	Bound(Value),
	/// Every handler declined; carries the simple name that was referenced.
	Missing(String),
}

impl Reference {
	/// Returns the bound value, if any.
	pub fn value(&self) -> Option<&Value> {
		match self {
			Self::Bound(value) => Some(value),
			Self::Missing(_) => None,
		}
	}
}

#[derive(Debug, Default)]
struct LoadState {
	/// Ledger key -> constants newly defined while that file evaluated.
	loaded: IndexMap<PathBuf, Vec<QualifiedName>>,
	/// Constants defined by autoloading outside autoload-once paths.
	autoloaded: IndexSet<QualifiedName>,
}

/// Autoload and unload engine.
pub struct Dependencies {
	store: Arc<BindingStore>,
	unloadable: UnloadableRegistry,
	hooks: HookChain,
	loader: Loader,
	evaluator: Arc<dyn SourceEvaluator>,
	policy: ClearPolicy,
	state: Mutex<LoadState>,
}

impl Dependencies {
	/// Creates an instance with a fresh binding store and the TOML evaluator.
	pub fn new(config: AutoloadConfig) -> Self {
		Self {
			store: Arc::new(BindingStore::new()),
			unloadable: UnloadableRegistry::new(),
			hooks: HookChain::new(),
			loader: Loader::new(&config),
			evaluator: Arc::new(TomlEvaluator),
			policy: config.clear_policy,
			state: Mutex::new(LoadState::default()),
		}
	}

	/// Uses `store` instead of a private binding store.
	pub fn with_store(mut self, store: Arc<BindingStore>) -> Self {
		self.store = store;
		self
	}

	/// Uses `evaluator` to evaluate source units.
	pub fn with_evaluator(mut self, evaluator: impl SourceEvaluator + 'static) -> Self {
		self.evaluator = Arc::new(evaluator);
		self
	}

	/// The binding store.
	pub fn store(&self) -> &BindingStore {
		&self.store
	}

	/// Shared handle to the binding store.
	pub fn store_handle(&self) -> Arc<BindingStore> {
		self.store.clone()
	}

	/// The unloadable registry.
	pub fn unloadable(&self) -> &UnloadableRegistry {
		&self.unloadable
	}

	/// The missing-reference handler chain.
	pub fn hooks(&self) -> &HookChain {
		&self.hooks
	}

	/// The source loader.
	pub fn loader(&self) -> &Loader {
		&self.loader
	}

	/// The clear policy in effect.
	pub fn policy(&self) -> ClearPolicy {
		self.policy
	}

	/// Installs [`AutoloadHandler`]. Returns false if it was already installed.
	pub fn hook(&self) -> bool {
		self.hooks.install(Arc::new(AutoloadHandler))
	}

	/// Removes [`AutoloadHandler`]. Returns false if it was not installed.
	pub fn unhook(&self) -> bool {
		self.hooks.uninstall(AutoloadHandler::ID)
	}

	/// Returns true if [`AutoloadHandler`] is installed.
	pub fn is_hooked(&self) -> bool {
		self.hooks.is_installed(AutoloadHandler::ID)
	}

	/// Marks the constant bound at `name` unloadable.
	///
	/// Returns whether the registry changed. Fails with
	/// [`InvalidTarget::Unbound`] if nothing is bound at `name`.
	pub fn mark_unloadable(&self, name: &str) -> Result<bool> {
		let name = QualifiedName::parse(name)?;
		if !self.store.is_bound(&name) {
			return Err(InvalidTarget::Unbound(name).into());
		}
		Ok(self.unloadable.mark(name))
	}

	/// Returns true if `name` is marked unloadable.
	pub fn is_marked(&self, name: &str) -> bool {
		QualifiedName::parse(name).is_ok_and(|name| self.unloadable.is_marked(&name))
	}

	/// Returns true if `name` was defined by autoloading.
	pub fn is_autoloaded(&self, name: &str) -> bool {
		QualifiedName::parse(name).is_ok_and(|name| self.state.lock().autoloaded.contains(&name))
	}

	/// Returns true if the next clear will remove `name`.
	pub fn will_unload(&self, name: &str) -> bool {
		self.is_marked(name) || self.is_autoloaded(name)
	}

	/// Loaded files, by path without extension, in load order.
	pub fn loaded_files(&self) -> Vec<PathBuf> {
		self.state.lock().loaded.keys().cloned().collect()
	}

	/// Constants newly defined while the file at `path` evaluated.
	pub fn constants_from(&self, path: &std::path::Path) -> Vec<QualifiedName> {
		let key = self.loader.ledger_key(path);
		self.state.lock().loaded.get(&key).cloned().unwrap_or_default()
	}

	/// Resolves `name` referenced from `scope`.
	///
	/// A direct hit returns [`Reference::Bound`] without touching the scope.
	/// A miss in a scope that intercepts (it opted in, or a handler is
	/// installed) increments the scope's counter once and consults the handler
	/// chain; if no handler resolves the name, the simple name comes back as
	/// [`Reference::Missing`]. A miss in any other scope is
	/// [`AutoloadError::Uninitialized`].
	pub fn reference(&self, scope: &Scope, name: &str) -> Result<Reference> {
		let qualified = scope.qualify(name)?;
		if let Some(value) = self.store.lookup(&qualified) {
			return Ok(Reference::Bound(value));
		}

		if !scope.intercepts() && self.hooks.is_empty() {
			return Err(AutoloadError::Uninitialized(qualified));
		}

		let count = scope.record_miss();
		tracing::trace!(name = %qualified, count, "intercepted missing reference");

		for handler in self.hooks.handlers() {
			if let Resolution::Resolved(value) = handler.resolve(self, scope.path(), name)? {
				return Ok(Reference::Bound(value));
			}
		}
		Ok(Reference::Missing(name.to_owned()))
	}
}

impl std::fmt::Debug for Dependencies {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dependencies")
			.field("store", &self.store)
			.field("unloadable", &self.unloadable)
			.field("hooks", &self.hooks)
			.field("loader", &self.loader)
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}
