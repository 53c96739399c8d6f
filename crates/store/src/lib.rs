//! File-backed watermark persistence: one small JSON document holding the
//! last fully synced instant.

use std::{io, path::PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use rollsync_core::{WatermarkError, WatermarkStore};
use rollsync_utils::error::IoContextError;

/// On-disk layout; a single key, mirroring the key-value entry the original
/// client kept.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedWatermark {
	timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct FsWatermarkStore {
	path: PathBuf,
}

impl FsWatermarkStore {
	#[must_use]
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

#[async_trait]
impl WatermarkStore for FsWatermarkStore {
	async fn get(&self) -> Result<Option<i64>, WatermarkError> {
		let raw = match fs::read_to_string(&self.path).await {
			Ok(raw) => raw,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(IoContextError::new(&self.path, e).into()),
		};

		let document: PersistedWatermark = serde_json::from_str(&raw)?;

		Ok(Some(document.timestamp))
	}

	async fn set(&self, millis: i64) -> Result<(), WatermarkError> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).await.map_err(|e| {
					IoContextError::with_note(parent, e, "creating watermark directory")
				})?;
			}
		}

		let json = serde_json::to_string(&PersistedWatermark { timestamp: millis })?;
		fs::write(&self.path, json)
			.await
			.map_err(|e| IoContextError::new(&self.path, e))?;

		debug!(millis, path = %self.path.display(), "Persisted watermark;");

		Ok(())
	}
}
