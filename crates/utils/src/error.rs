use std::{fmt, path::Path};

use thiserror::Error;

/// I/O error enriched with the path that caused it and an optional note
/// about the operation that was underway.
#[derive(Error, Debug)]
pub struct IoContextError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	pub note: Option<&'static str>,
}

impl fmt::Display for IoContextError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.note {
			Some(note) => write!(
				f,
				"I/O error while {note}: {} <path='{}'>",
				self.source,
				self.path.display()
			),
			None => write!(
				f,
				"I/O error: {} <path='{}'>",
				self.source,
				self.path.display()
			),
		}
	}
}

impl IoContextError {
	pub fn new(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			note: None,
		}
	}

	pub fn with_note(path: impl AsRef<Path>, source: std::io::Error, note: &'static str) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			note: Some(note),
		}
	}
}
