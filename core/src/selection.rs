use serde::{Deserialize, Serialize};

/// Frozen snapshot of the user's sync choices.
///
/// The engine consumes it by value: edits the user makes while a pass is in
/// flight only affect the next pass, never the running one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
	/// Album titles to sync, in the order the user picked them. Duplicates
	/// are processed once.
	pub albums: Vec<String>,
	/// Explicit window start (epoch millis) used when `use_watermark` is
	/// off; `None` puts the full album history in the window.
	pub reference_timestamp: Option<i64>,
	/// When set, the window starts at the persisted watermark instead of
	/// `reference_timestamp`, and a clean pass advances that watermark.
	pub use_watermark: bool,
}

impl SelectionState {
	/// Selection for the usual incremental flow: sync everything newer than
	/// the persisted watermark.
	#[must_use]
	pub fn watermarked(albums: Vec<String>) -> Self {
		Self {
			albums,
			reference_timestamp: None,
			use_watermark: true,
		}
	}

	/// Selection with an explicit window start picked by the user; the
	/// watermark is neither read nor written.
	#[must_use]
	pub fn since(albums: Vec<String>, reference_timestamp: i64) -> Self {
		Self {
			albums,
			reference_timestamp: Some(reference_timestamp),
			use_watermark: false,
		}
	}
}
