//! Error types for autoloading and unloading.

use std::path::PathBuf;

use constload_names::{NameError, QualifiedName};
use thiserror::Error;

use crate::value::CallbackError;

/// Why a value cannot be marked unloadable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTarget {
	/// The value was never bound, so it has no symbolic path.
	#[error("anonymous values have no name to be referenced by")]
	Anonymous,
	/// The name does not resolve to any binding.
	#[error("{0} is not bound")]
	Unbound(QualifiedName),
	/// The value's name now resolves to a different value, or to nothing.
	#[error("{0} no longer resolves to this value")]
	Unreachable(QualifiedName),
}

/// Errors surfaced by [`crate::Dependencies`].
#[derive(Debug, Error)]
pub enum AutoloadError {
	/// No source unit matching the logical name exists on the autoload paths.
	#[error("no such file to load -- {name} (searched {searched:?})")]
	SourceNotFound {
		/// Logical name passed by the caller.
		name: String,
		/// Autoload paths that were searched.
		searched: Vec<PathBuf>,
	},

	/// Precondition violation when marking a value unloadable.
	#[error("cannot mark unloadable: {0}")]
	InvalidTarget(#[from] InvalidTarget),

	/// A reference missed in a scope that does not intercept misses.
	#[error("uninitialized constant {0}")]
	Uninitialized(QualifiedName),

	/// An autoloaded source file did not define the constant it was expected to.
	#[error("unable to autoload constant {name}, expected {path} to define it")]
	NotDefined {
		/// Constant that was expected.
		name: QualifiedName,
		/// File that was evaluated.
		path: PathBuf,
	},

	/// A pre-removal callback failed during unloading.
	#[error("before_remove callback for {name} failed: {source}")]
	Callback {
		/// Constant whose callback failed.
		name: QualifiedName,
		/// The callback's error.
		#[source]
		source: CallbackError,
	},

	/// A source unit could not be evaluated.
	#[error("failed to evaluate {path}: {message}")]
	Evaluate {
		/// Source file path.
		path: PathBuf,
		/// Evaluator diagnostic.
		message: String,
	},

	/// Error reading a source file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A constant name failed to parse.
	#[error(transparent)]
	Name(#[from] NameError),
}

/// Result type for autoload operations.
pub type Result<T> = std::result::Result<T, AutoloadError>;
