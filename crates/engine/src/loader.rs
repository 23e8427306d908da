//! Source lookup on the autoload paths.

use std::path::{Path, PathBuf};

use crate::config::AutoloadConfig;

/// A located source file and its content.
#[derive(Debug, Clone)]
pub struct SourceUnit {
	/// Path of the file on disk.
	pub path: PathBuf,
	/// File content.
	pub source: String,
}

/// Maps path suffixes to files and directories on the autoload paths.
#[derive(Debug, Clone)]
pub struct Loader {
	search_paths: Vec<PathBuf>,
	once_paths: Vec<PathBuf>,
	extension: String,
}

impl Loader {
	/// Creates a loader from configuration.
	///
	/// Autoload paths are searched first, then autoload-once paths.
	pub fn new(config: &AutoloadConfig) -> Self {
		let mut search_paths = config.autoload_paths.clone();
		for once in &config.autoload_once_paths {
			if !search_paths.contains(once) {
				search_paths.push(once.clone());
			}
		}
		Self {
			search_paths,
			once_paths: config.autoload_once_paths.clone(),
			extension: config.extension.clone(),
		}
	}

	/// Directories searched, in order.
	pub fn search_paths(&self) -> &[PathBuf] {
		&self.search_paths
	}

	/// Source file extension, without the dot.
	pub fn extension(&self) -> &str {
		&self.extension
	}

	/// Finds the source file for `path_suffix` (`admin/user_service`).
	///
	/// The suffix may already carry the extension. An absolute path is
	/// returned as-is when it names an existing file.
	pub fn search_for_file(&self, path_suffix: &str) -> Option<PathBuf> {
		let with_ext = self.with_extension(path_suffix);
		let candidate = Path::new(&with_ext);
		if candidate.is_absolute() {
			return candidate.is_file().then(|| candidate.to_path_buf());
		}
		self.search_paths
			.iter()
			.map(|root| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Finds a directory for `path_suffix` that stands for a namespace.
	pub fn autoloadable_module(&self, path_suffix: &str) -> Option<PathBuf> {
		self.search_paths
			.iter()
			.map(|root| root.join(path_suffix))
			.find(|path| path.is_dir())
	}

	/// Returns true if `path` lives under an autoload-once path.
	pub fn is_load_once(&self, path: &Path) -> bool {
		self.once_paths.iter().any(|once| path.starts_with(once))
	}

	/// Reads a located file.
	pub fn read(&self, path: &Path) -> std::io::Result<SourceUnit> {
		Ok(SourceUnit {
			path: path.to_path_buf(),
			source: std::fs::read_to_string(path)?,
		})
	}

	/// Key a file is tracked under in the loaded-file ledger.
	pub(crate) fn ledger_key(&self, path: &Path) -> PathBuf {
		match path.extension() {
			Some(ext) if ext == self.extension.as_str() => path.with_extension(""),
			_ => path.to_path_buf(),
		}
	}

	fn with_extension(&self, path_suffix: &str) -> String {
		let dotted = format!(".{}", self.extension);
		if path_suffix.ends_with(&dotted) {
			path_suffix.to_owned()
		} else {
			format!("{path_suffix}{dotted}")
		}
	}
}
