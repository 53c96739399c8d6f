use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named grouping of media items on the device's media library.
///
/// Snapshot data: valid for the UI session that listed it, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
	/// Unique display name; also the key the selection and the wire protocol
	/// use to refer to the album.
	pub title: String,
	pub cover_uri: String,
}

/// A single photo or video as reported by the device media library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
	pub album_title: String,
	/// Device-local locator. Not a stable identifier: it does not survive an
	/// app reinstall and means nothing to other devices.
	pub uri: String,
	/// Capture instant in epoch milliseconds.
	pub captured_at_millis: i64,
	/// Declared content type, passed through to the transport unvalidated.
	pub mime_kind: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaSourceError {
	#[error("access to the device media library was denied")]
	AccessDenied,
	#[error("failed to enumerate albums: {0}")]
	AlbumList(String),
	#[error("failed to read items from album <title='{album}'>: {reason}")]
	AlbumRead { album: String, reason: String },
}

/// Seam to the platform media library (camera roll, photo picker, ...).
#[async_trait]
pub trait MediaSource: Send + Sync {
	/// Capability check; the engine calls this before touching anything else
	/// and aborts the pass on refusal.
	async fn ensure_access(&self) -> Result<(), MediaSourceError>;

	async fn list_albums(&self) -> Result<Vec<Album>, MediaSourceError>;

	/// One page of items from `album_title` captured at or after
	/// `lower_bound_millis`, capped at `limit`. `None` applies no lower
	/// bound. An album that no longer exists yields an empty page, not an
	/// error.
	///
	/// There is no continuation token: one page per album per pass.
	async fn items_newer_than(
		&self,
		album_title: &str,
		lower_bound_millis: Option<i64>,
		limit: usize,
	) -> Result<Vec<MediaItem>, MediaSourceError>;
}
