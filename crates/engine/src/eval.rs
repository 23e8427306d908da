//! Source evaluation.
//!
//! An evaluator turns a [`SourceUnit`] into bindings through an
//! [`EvalContext`]. [`TomlEvaluator`] is the default and reads definition
//! files of the form:
//!
//! ```toml
//! require = ["shared/base"]
//!
//! [[define]]
//! name = "Admin::UserService"
//! value = { port = 80 }
//! unloadable = true
//! ```
//!
//! A definition without `value` binds an empty namespace. Payloads are stored
//! as [`toml::Value`].

use constload_names::QualifiedName;
use serde::Deserialize;

use crate::Dependencies;
use crate::error::{AutoloadError, Result};
use crate::loader::SourceUnit;
use crate::value::Value;

/// Evaluates source units into bindings.
pub trait SourceEvaluator: Send + Sync {
	/// Evaluates `unit`, defining constants through `cx`.
	fn evaluate(&self, unit: &SourceUnit, cx: &mut EvalContext<'_>) -> Result<()>;
}

/// Handle given to evaluators while a unit is being evaluated.
pub struct EvalContext<'a> {
	deps: &'a Dependencies,
}

impl<'a> EvalContext<'a> {
	pub(crate) fn new(deps: &'a Dependencies) -> Self {
		Self { deps }
	}

	/// Binds `name` to `value`, returning the bound handle.
	pub fn define(&mut self, name: &str, value: Value) -> Result<Value> {
		let name = QualifiedName::parse(name)?;
		self.deps.store().bind(name, value.clone());
		Ok(value)
	}

	/// Marks a defined constant unloadable.
	pub fn mark_unloadable(&mut self, name: &str) -> Result<bool> {
		self.deps.mark_unloadable(name)
	}

	/// Loads another source unit first.
	pub fn require_dependency(&mut self, logical_name: &str) -> Result<()> {
		self.deps.require_dependency(logical_name)
	}

	/// The owning dependencies instance.
	pub fn dependencies(&self) -> &Dependencies {
		self.deps
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
	#[serde(default)]
	require: Vec<String>,
	#[serde(default)]
	define: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Definition {
	name: String,
	#[serde(default)]
	value: Option<toml::Value>,
	#[serde(default)]
	unloadable: bool,
}

/// Evaluator for TOML definition files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlEvaluator;

impl SourceEvaluator for TomlEvaluator {
	fn evaluate(&self, unit: &SourceUnit, cx: &mut EvalContext<'_>) -> Result<()> {
		let file: DefinitionFile = toml::from_str(&unit.source).map_err(|e| AutoloadError::Evaluate {
			path: unit.path.clone(),
			message: e.to_string(),
		})?;

		for dep in &file.require {
			cx.require_dependency(dep)?;
		}

		for def in file.define {
			let value = match def.value {
				Some(payload) => Value::new(payload),
				None => Value::namespace(),
			};
			cx.define(&def.name, value)?;
			if def.unloadable {
				cx.mark_unloadable(&def.name)?;
			}
		}
		Ok(())
	}
}
