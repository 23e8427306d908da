//! Qualified constant names.
//!
//! A [`QualifiedName`] is a `::`-separated path of constant segments such as
//! `Admin::UserService`. Names are normalized on parse: a leading `::` and any
//! number of leading `Object::` segments are dropped, so `::Object::Admin` and
//! `Admin` name the same binding.
//!
//! # Inflection
//!
//! Autoloading maps names to path suffixes:
//!
//! | Name | Path suffix |
//! |------|-------------|
//! | `UserService` | `user_service` |
//! | `Admin::UserService` | `admin/user_service` |
//! | `HTMLParser` | `html_parser` |

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use heck::ToSnakeCase;

/// Separator between name segments.
pub const SEPARATOR: &str = "::";

/// Errors produced while parsing a qualified name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
	/// The input had no segments after normalization.
	#[error("empty constant name")]
	Empty,
	/// A segment is not a valid constant identifier.
	#[error("{segment:?} is not a valid constant name segment in {input:?}")]
	InvalidSegment {
		/// Full input being parsed.
		input: String,
		/// Offending segment.
		segment: String,
	},
}

/// Result type for name operations.
pub type Result<T> = std::result::Result<T, NameError>;

/// A fully-qualified constant name.
///
/// Hashes and compares like the underlying `str`, so maps keyed by
/// `QualifiedName` can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

impl QualifiedName {
	/// Parses and normalizes a qualified name.
	pub fn parse(input: &str) -> Result<Self> {
		let trimmed = input.strip_prefix(SEPARATOR).unwrap_or(input);
		if trimmed.is_empty() {
			return Err(NameError::Empty);
		}

		let mut segments: Vec<&str> = trimmed.split(SEPARATOR).collect();
		let leading_object = segments.iter().take_while(|s| **s == "Object").count();
		// `Object` alone is a valid name; only strip it as a prefix.
		segments.drain(..leading_object.min(segments.len() - 1));

		for segment in &segments {
			if !is_constant_segment(segment) {
				return Err(NameError::InvalidSegment {
					input: input.to_owned(),
					segment: (*segment).to_owned(),
				});
			}
		}

		Ok(Self(segments.join(SEPARATOR)))
	}

	/// Returns the name as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Iterates over the segments from outermost to innermost.
	pub fn segments(&self) -> impl Iterator<Item = &str> {
		self.0.split(SEPARATOR)
	}

	/// Number of segments.
	pub fn depth(&self) -> usize {
		self.segments().count()
	}

	/// Innermost segment (`UserService` for `Admin::UserService`).
	pub fn last(&self) -> &str {
		self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
	}

	/// Enclosing namespace, or `None` for a top-level name.
	pub fn parent(&self) -> Option<QualifiedName> {
		self.0.rsplit_once(SEPARATOR).map(|(parent, _)| Self(parent.to_owned()))
	}

	/// Appends one segment, validating it.
	pub fn join(&self, segment: &str) -> Result<QualifiedName> {
		if !is_constant_segment(segment) {
			return Err(NameError::InvalidSegment {
				input: format!("{}{SEPARATOR}{segment}", self.0),
				segment: segment.to_owned(),
			});
		}
		Ok(Self(format!("{}{SEPARATOR}{segment}", self.0)))
	}

	/// Path suffix used to search for the defining source file.
	pub fn underscore(&self) -> String {
		self.segments().map(|s| s.to_snake_case()).collect::<Vec<_>>().join("/")
	}
}

/// Qualifies `name` under an optional enclosing namespace.
pub fn qualify(scope: Option<&QualifiedName>, name: &str) -> Result<QualifiedName> {
	match scope {
		Some(scope) => scope.join(name),
		None => QualifiedName::parse(name).and_then(|q| {
			if q.depth() == 1 {
				Ok(q)
			} else {
				Err(NameError::InvalidSegment {
					input: name.to_owned(),
					segment: name.to_owned(),
				})
			}
		}),
	}
}

/// Returns true if `segment` is a single valid constant identifier.
pub fn is_constant_segment(segment: &str) -> bool {
	let mut chars = segment.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for QualifiedName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for QualifiedName {
	type Err = NameError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl AsRef<str> for QualifiedName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for QualifiedName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests;
