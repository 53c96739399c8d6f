use async_trait::async_trait;
use thiserror::Error;

use rollsync_utils::error::IoContextError;

#[derive(Error, Debug)]
pub enum WatermarkError {
	#[error(transparent)]
	Io(#[from] IoContextError),
	#[error("malformed watermark document: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// Durable single-value store for the last fully synced instant.
///
/// The engine reads it at most once at pass start and writes it at most once
/// at pass end; the value only ever moves forward.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
	/// `None` when no watermark has ever been persisted.
	async fn get(&self) -> Result<Option<i64>, WatermarkError>;

	async fn set(&self, millis: i64) -> Result<(), WatermarkError>;
}
