//! Common utilities for engine integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use constload_engine::{AutoloadConfig, Dependencies, QualifiedName};
use thiserror as _;

/// Autoload directory tree plus a `Dependencies` searching it.
pub struct Fixture {
	pub dir: tempfile::TempDir,
	pub deps: Dependencies,
}

impl Fixture {
	/// Path of the `app` autoload directory.
	pub fn app(&self) -> PathBuf {
		self.dir.path().join("app")
	}

	/// Path of the `lib` autoload-once directory.
	pub fn lib(&self) -> PathBuf {
		self.dir.path().join("lib")
	}

	/// Writes (or overwrites) a file relative to the fixture root.
	pub fn write(&self, relative: &str, content: &str) {
		write_file(&self.dir.path().join(relative), content);
	}

	pub fn is_bound(&self, name: &str) -> bool {
		self.deps.store().is_bound(&qualified(name))
	}
}

/// Installs a test subscriber once per process.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Builds a fixture with `app/` as autoload path and `lib/` as autoload-once
/// path, pre-populated with `files` (paths relative to the fixture root).
pub fn fixture(files: &[(&str, &str)]) -> Fixture {
	fixture_with(files, |config| config)
}

/// Like [`fixture`], with a hook to adjust the configuration.
pub fn fixture_with(files: &[(&str, &str)], configure: impl FnOnce(AutoloadConfig) -> AutoloadConfig) -> Fixture {
	init_tracing();
	let dir = tempfile::tempdir().expect("failed to create temp dir");
	std::fs::create_dir_all(dir.path().join("app")).expect("app dir should be creatable");
	std::fs::create_dir_all(dir.path().join("lib")).expect("lib dir should be creatable");
	for (relative, content) in files {
		write_file(&dir.path().join(relative), content);
	}

	let config = AutoloadConfig::default()
		.with_autoload_path(dir.path().join("app"))
		.with_autoload_once_path(dir.path().join("lib"));
	let deps = Dependencies::new(configure(config));
	Fixture { dir, deps }
}

pub fn qualified(name: &str) -> QualifiedName {
	QualifiedName::parse(name).expect("test names should parse")
}

fn write_file(path: &Path, content: &str) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).expect("parent dir should be creatable");
	}
	std::fs::write(path, content).expect("file should be writable");
}
