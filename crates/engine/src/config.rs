//! Autoload configuration.
//!
//! Configuration is written in TOML:
//!
//! ```toml
//! autoload-paths = ["app/models", "app/services"]
//! autoload-once-paths = ["lib"]
//! extension = "toml"
//! clear-policy = "best-effort"
//! ```
//!
//! Every key is optional. Relative paths in a file loaded with
//! [`AutoloadConfig::load`] are resolved against the file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or schema.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The source file extension is empty.
	#[error("source extension must not be empty")]
	EmptyExtension,
}

/// What `clear` does when a pre-removal callback fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClearPolicy {
	/// Stop at the first failure and return it. Entries already removed stay
	/// removed; the failing entry and the rest stay marked and bound.
	#[default]
	FailFast,
	/// Keep the failing binding, record the failure, and continue. The
	/// registry always ends empty.
	BestEffort,
}

/// Settings for a [`crate::Dependencies`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct AutoloadConfig {
	/// Directories searched for source units, in order.
	pub autoload_paths: Vec<PathBuf>,
	/// Directories whose constants are loaded once and never unloaded.
	pub autoload_once_paths: Vec<PathBuf>,
	/// Source file extension, without the dot.
	pub extension: String,
	/// Callback failure policy for `clear`.
	pub clear_policy: ClearPolicy,
}

impl Default for AutoloadConfig {
	fn default() -> Self {
		Self {
			autoload_paths: Vec::new(),
			autoload_once_paths: Vec::new(),
			extension: "toml".to_owned(),
			clear_policy: ClearPolicy::default(),
		}
	}
}

impl AutoloadConfig {
	/// Parses configuration from a TOML string.
	pub fn parse(input: &str) -> Result<Self, ConfigError> {
		let mut config: Self = toml::from_str(input)?;
		config.normalize()?;
		Ok(config)
	}

	/// Reads configuration from `path`, resolving relative paths against its
	/// parent directory.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let mut config = Self::parse(&content)?;
		if let Some(base) = path.parent() {
			config.resolve_relative(base);
		}
		Ok(config)
	}

	/// Appends an autoload path.
	pub fn with_autoload_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.autoload_paths.push(path.into());
		self
	}

	/// Appends an autoload-once path. Once paths are also searched.
	pub fn with_autoload_once_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.autoload_once_paths.push(path.into());
		self
	}

	/// Sets the clear policy.
	pub fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
		self.clear_policy = policy;
		self
	}

	fn normalize(&mut self) -> Result<(), ConfigError> {
		let ext = self.extension.trim_start_matches('.');
		if ext.is_empty() {
			return Err(ConfigError::EmptyExtension);
		}
		self.extension = ext.to_owned();
		Ok(())
	}

	fn resolve_relative(&mut self, base: &Path) {
		for path in self.autoload_paths.iter_mut().chain(self.autoload_once_paths.iter_mut()) {
			if path.is_relative() {
				*path = base.join(&*path);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn defaults() {
		let config = AutoloadConfig::parse("").unwrap();
		assert_eq!(config, AutoloadConfig::default());
		assert_eq!(config.extension, "toml");
		assert_eq!(config.clear_policy, ClearPolicy::FailFast);
	}

	#[test]
	fn parse_all_keys() {
		let config = AutoloadConfig::parse(
			r#"
			autoload-paths = ["app/models"]
			autoload-once-paths = ["lib"]
			extension = ".def"
			clear-policy = "best-effort"
			"#,
		)
		.unwrap();

		assert_eq!(config.autoload_paths, vec![PathBuf::from("app/models")]);
		assert_eq!(config.autoload_once_paths, vec![PathBuf::from("lib")]);
		assert_eq!(config.extension, "def");
		assert_eq!(config.clear_policy, ClearPolicy::BestEffort);
	}

	#[test]
	fn rejects_unknown_keys_and_empty_extension() {
		assert!(matches!(AutoloadConfig::parse("search = []"), Err(ConfigError::Toml(_))));
		assert!(matches!(AutoloadConfig::parse("extension = '.'"), Err(ConfigError::EmptyExtension)));
	}

	#[test]
	fn load_resolves_relative_paths() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("autoload.toml");
		std::fs::write(&file, "autoload-paths = [\"models\", \"/abs\"]").unwrap();

		let config = AutoloadConfig::load(&file).unwrap();
		assert_eq!(config.autoload_paths, vec![dir.path().join("models"), PathBuf::from("/abs")]);
	}

	#[test]
	fn load_reports_missing_file() {
		let err = AutoloadConfig::load(Path::new("/nonexistent/autoload.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}
