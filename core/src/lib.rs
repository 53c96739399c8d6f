//!
//! # Rollsync Core
//!
//! The sync engine behind rollsync's incremental camera-roll backup: album
//! selection, a time-windowed sweep over the device media library, sequential
//! uploads through a pluggable transport, and a persisted watermark that only
//! moves forward after a fully clean pass.
//!
//! The embedding app supplies the platform pieces behind three seams:
//! [`MediaSource`], [`WatermarkStore`] and [`UploadTransport`]. One pass is a
//! single call to [`SyncEngine::run`] with a frozen [`SelectionState`]
//! snapshot; the engine never reads live UI state.

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod engine;
pub mod envelope;
pub mod media;
pub mod selection;
pub mod store;
pub mod transport;

pub use config::{ClientConfig, ConfigError, DEFAULT_PAGE_SIZE};
pub use engine::{CancelToken, SyncEngine, SyncResult, SyncStatus, FALLBACK_LOWER_BOUND};
pub use envelope::{UploadEnvelope, UPLOAD_FIELD_NAME};
pub use media::{Album, MediaItem, MediaSource, MediaSourceError};
pub use selection::SelectionState;
pub use store::{WatermarkError, WatermarkStore};
pub use transport::{TransportError, UploadAck, UploadTransport};

/// Failures that abort a pass before any item is uploaded.
#[derive(Error, Debug)]
pub enum Error {
	#[error("access to the device media library was denied")]
	PermissionDenied,
	#[error("selection references unknown album <title='{0}'>")]
	UnknownAlbum(String),
	#[error("a sync pass is already running")]
	AlreadyRunning,
	#[error("failed to enumerate device albums: {0}")]
	MediaSource(MediaSourceError),
}

impl From<MediaSourceError> for Error {
	fn from(e: MediaSourceError) -> Self {
		match e {
			MediaSourceError::AccessDenied => Self::PermissionDenied,
			other => Self::MediaSource(other),
		}
	}
}

/// Failures that are recorded and carried in the pass summary instead of
/// aborting it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonCriticalError {
	#[error("upload failed <name='{name}'>: {reason}")]
	Upload { name: String, reason: String },
	#[error("failed to read album <title='{album}'>: {reason}")]
	AlbumRead { album: String, reason: String },
	#[error("watermark not persisted: {0}")]
	Watermark(String),
}

#[derive(Debug, Clone)]
pub enum ProgressUpdate {
	PassStarted { albums: usize },
	AlbumStarted(String),
	/// Basename of the item currently in flight, for the UI's busy line.
	CurrentItem(String),
	ItemsAttempted(u64),
}

/// Sink for live pass progress. Reporting is fire-and-forget; a reporter must
/// never block or fail the pass.
pub trait ProgressReporter: Send + Sync + fmt::Debug + 'static {
	fn progress(&self, update: ProgressUpdate);

	fn current_item(&self, name: impl Into<String>)
	where
		Self: Sized,
	{
		self.progress(ProgressUpdate::CurrentItem(name.into()));
	}
}
