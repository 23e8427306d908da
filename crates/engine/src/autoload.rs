//! Autoloading: resolving missing constants from the autoload paths.

use std::path::Path;

use constload_names::{QualifiedName, qualify};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{AutoloadError, Result};
use crate::eval::EvalContext;
use crate::hook::{HandlerId, MissingHandler, Resolution};
use crate::value::Value;
use crate::Dependencies;

/// Handler that loads missing constants from source files.
///
/// Installed by [`Dependencies::hook`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoloadHandler;

impl AutoloadHandler {
	/// Id under which the handler is installed.
	pub const ID: HandlerId = HandlerId::new("autoload");
}

impl MissingHandler for AutoloadHandler {
	fn id(&self) -> HandlerId {
		Self::ID
	}

	fn resolve(&self, deps: &Dependencies, scope: Option<&QualifiedName>, name: &str) -> Result<Resolution> {
		deps.load_missing_constant(scope, name)
	}
}

impl Dependencies {
	/// Loads the source file for `logical_name` unless it is already loaded.
	///
	/// Fails with [`AutoloadError::SourceNotFound`] when no file matches; the
	/// binding store is left untouched in that case.
	pub fn require_dependency(&self, logical_name: &str) -> Result<()> {
		let Some(path) = self.loader.search_for_file(logical_name) else {
			return Err(AutoloadError::SourceNotFound {
				name: logical_name.to_owned(),
				searched: self.loader.search_paths().to_vec(),
			});
		};
		self.require_or_load(&path)
	}

	/// Resolves `name` missing from `scope` by autoloading.
	///
	/// Tries, in order: a source file named after the qualified constant, a
	/// directory standing for a namespace, then the enclosing scope, unless
	/// some enclosing scope already binds `name`.
	pub fn load_missing_constant(&self, scope: Option<&QualifiedName>, name: &str) -> Result<Resolution> {
		let qualified = qualify(scope, name)?;
		let suffix = qualified.underscore();

		if let Some(path) = self.loader.search_for_file(&suffix) {
			self.require_or_load(&path)?;
			return match self.store.lookup(&qualified) {
				Some(value) => Ok(Resolution::Resolved(value)),
				None => Err(AutoloadError::NotDefined { name: qualified, path }),
			};
		}

		if let Some(dir) = self.loader.autoloadable_module(&suffix) {
			let module = Value::namespace();
			self.store.bind(qualified.clone(), module.clone());
			if !self.loader.is_load_once(&dir) {
				self.state.lock().autoloaded.insert(qualified.clone());
			}
			debug!(name = %qualified, dir = %dir.display(), "autoloaded namespace");
			return Ok(Resolution::Resolved(module));
		}

		if let Some(scope) = scope
			&& !self.bound_in_enclosing(scope, name)
		{
			let parent = scope.parent();
			debug!(name, from = %scope, "retrying missing constant in enclosing scope");
			return self.load_missing_constant(parent.as_ref(), name);
		}

		Ok(Resolution::Unresolved)
	}

	fn bound_in_enclosing(&self, scope: &QualifiedName, name: &str) -> bool {
		let mut enclosing = scope.parent();
		loop {
			if qualify(enclosing.as_ref(), name).is_ok_and(|q| self.store.is_bound(&q)) {
				return true;
			}
			match enclosing {
				Some(current) => enclosing = current.parent(),
				None => return false,
			}
		}
	}

	fn require_or_load(&self, path: &Path) -> Result<()> {
		let key = self.loader.ledger_key(path);
		{
			let mut state = self.state.lock();
			if state.loaded.contains_key(&key) {
				return Ok(());
			}
			// Recorded before evaluation so a unit requiring itself is a no-op.
			state.loaded.insert(key.clone(), Vec::new());
		}

		let before = self.store.name_set();
		if let Err(error) = self.evaluate(path) {
			self.state.lock().loaded.shift_remove(&key);
			return Err(error);
		}

		let mut defined: Vec<QualifiedName> = self.store.names().into_iter().filter(|n| !before.contains(n)).collect();
		let once = self.loader.is_load_once(path);

		let mut state = self.state.lock();
		// Constants from units required while this one evaluated belong to them.
		let claimed: FxHashSet<&QualifiedName> = state.loaded.values().flatten().collect();
		defined.retain(|n| !claimed.contains(n));
		drop(claimed);

		debug!(path = %path.display(), defined = defined.len(), once, "loaded source");
		if !once {
			state.autoloaded.extend(defined.iter().cloned());
		}
		state.loaded.insert(key, defined);
		Ok(())
	}

	fn evaluate(&self, path: &Path) -> Result<()> {
		let unit = self.loader.read(path).map_err(|error| AutoloadError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let mut cx = EvalContext::new(self);
		self.evaluator.evaluate(&unit, &mut cx)
	}
}
