//! Unload engine.

use constload_names::QualifiedName;
use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::config::ClearPolicy;
use crate::error::{AutoloadError, Result};
use crate::value::CallbackError;
use crate::Dependencies;

/// What a [`Dependencies::clear`] did.
#[derive(Debug, Default)]
pub struct ClearReport {
	/// Constants that were bound and have been removed.
	pub removed: Vec<QualifiedName>,
	/// Constants that were already gone.
	pub skipped: Vec<QualifiedName>,
	/// Callback failures kept under [`ClearPolicy::BestEffort`]. The
	/// corresponding bindings were left in place.
	pub failures: Vec<(QualifiedName, CallbackError)>,
}

impl Dependencies {
	/// Removes every autoloaded and unloadable constant.
	///
	/// Autoloaded constants go first, then marked ones, each in the order it
	/// was recorded; a constant in both sets is processed once. Each value's
	/// pre-removal callback runs with its binding still present.
	///
	/// On success the unloadable registry, the autoloaded set and the
	/// loaded-file ledger are empty. Under [`ClearPolicy::FailFast`] a
	/// callback failure stops the clear: constants processed so far stay
	/// removed, the failing one and the rest stay bound and recorded.
	pub fn clear(&self) -> Result<ClearReport> {
		let pending: IndexSet<QualifiedName> = {
			let state = self.state.lock();
			state.autoloaded.iter().cloned().chain(self.unloadable.snapshot()).collect()
		};
		info!(count = pending.len(), policy = ?self.policy, "clearing unloadable constants");

		let mut report = ClearReport::default();
		for name in pending {
			match self.unload(&name) {
				Ok(true) => report.removed.push(name.clone()),
				Ok(false) => report.skipped.push(name.clone()),
				Err(source) => match self.policy {
					ClearPolicy::FailFast => {
						warn!(%name, error = %source, "before_remove callback failed; aborting clear");
						return Err(AutoloadError::Callback { name, source });
					}
					ClearPolicy::BestEffort => {
						warn!(%name, error = %source, "before_remove callback failed; continuing");
						report.failures.push((name.clone(), source));
					}
				},
			}
			self.forget(&name);
		}

		self.unloadable.clear();
		let mut state = self.state.lock();
		state.autoloaded.clear();
		state.loaded.clear();
		drop(state);

		info!(
			removed = report.removed.len(),
			skipped = report.skipped.len(),
			failed = report.failures.len(),
			"cleared constants"
		);
		Ok(report)
	}

	/// Removes one constant, running its pre-removal callback first.
	///
	/// Returns false if `name` was not bound. The constant's source file is
	/// dropped from the loaded-file ledger so it evaluates again on next use.
	pub fn remove_constant(&self, name: &QualifiedName) -> Result<bool> {
		let removed = self.unload(name).map_err(|source| AutoloadError::Callback {
			name: name.clone(),
			source,
		})?;
		self.forget(name);
		Ok(removed)
	}

	fn unload(&self, name: &QualifiedName) -> std::result::Result<bool, CallbackError> {
		let Some(value) = self.store.lookup(name) else {
			debug!(%name, "constant already removed");
			return Ok(false);
		};

		if let Some(callback) = value.before_remove_hook() {
			debug!(%name, "running before_remove callback");
			callback.before_remove(&value, &self.store)?;
		}

		self.store.unbind(name);
		debug!(%name, "removed constant");
		Ok(true)
	}

	fn forget(&self, name: &QualifiedName) {
		self.unloadable.unmark(name);
		let file = self.loader.search_for_file(&name.underscore());
		let mut state = self.state.lock();
		state.autoloaded.shift_remove(name);
		if let Some(path) = file {
			state.loaded.shift_remove(&self.loader.ledger_key(&path));
		}
	}
}
