use serde::{Deserialize, Serialize};

use crate::media::MediaItem;

/// Form field the ingestion endpoint expects the payload under.
pub const UPLOAD_FIELD_NAME: &str = "files";

/// Per-item structure handed to the upload transport. Ephemeral: built right
/// before the upload, dropped right after.
///
/// `name` is the wire-level identifier the endpoint parses back into album,
/// capture time and filename: `{album}&&{captured_at_millis * 1000}&&{basename}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEnvelope {
	pub name: String,
	pub mime_kind: String,
	pub uri: String,
}

impl UploadEnvelope {
	#[must_use]
	pub fn for_item(item: &MediaItem) -> Self {
		Self {
			// The endpoint parses the capture time scaled by 1000; changing
			// the scale would orphan everything uploaded so far.
			name: format!(
				"{}&&{}&&{}",
				item.album_title,
				item.captured_at_millis * 1000,
				basename(&item.uri)
			),
			mime_kind: item.mime_kind.clone(),
			uri: item.uri.clone(),
		}
	}
}

/// Last path segment of a device-local locator.
#[must_use]
pub fn basename(uri: &str) -> &str {
	uri.rsplit('/').next().unwrap_or(uri)
}
