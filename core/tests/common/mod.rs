//! Stub collaborators for exercising the sync engine without a device or a
//! network.

use std::{
	collections::{HashMap, HashSet},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex,
	},
};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use rollsync_core::{
	Album, CancelToken, MediaItem, MediaSource, MediaSourceError, ProgressReporter,
	ProgressUpdate, TransportError, UploadAck, UploadEnvelope, UploadTransport, WatermarkError,
	WatermarkStore,
};

pub fn album(title: &str) -> Album {
	Album {
		title: title.to_string(),
		cover_uri: format!("file:///covers/{title}.jpg"),
	}
}

pub fn item(album: &str, uri: &str, captured_at_millis: i64) -> MediaItem {
	MediaItem {
		album_title: album.to_string(),
		uri: uri.to_string(),
		captured_at_millis,
		mime_kind: "image/jpeg".to_string(),
	}
}

pub fn titles(list: &[&str]) -> Vec<String> {
	list.iter().map(ToString::to_string).collect()
}

/// Media library stub: fixed albums, in-memory items, call counters. The
/// window filter mimics the platform query: `captured_at_millis >= bound`,
/// capped at `limit`.
#[derive(Debug, Default)]
pub struct StubMediaSource {
	albums: Vec<Album>,
	items: HashMap<String, Vec<MediaItem>>,
	deny_access: bool,
	failing_albums: HashSet<String>,
	pub list_calls: AtomicUsize,
	pub fetch_calls: AtomicUsize,
}

impl StubMediaSource {
	pub fn new(album_titles: &[&str]) -> Self {
		Self {
			albums: album_titles.iter().map(|title| album(title)).collect(),
			..Default::default()
		}
	}

	pub fn denying_access(album_titles: &[&str]) -> Self {
		Self {
			deny_access: true,
			..Self::new(album_titles)
		}
	}

	pub fn with_item(mut self, item: MediaItem) -> Self {
		self.items
			.entry(item.album_title.clone())
			.or_default()
			.push(item);
		self
	}

	pub fn failing_album(mut self, title: &str) -> Self {
		self.failing_albums.insert(title.to_string());
		self
	}
}

#[async_trait]
impl MediaSource for StubMediaSource {
	async fn ensure_access(&self) -> Result<(), MediaSourceError> {
		if self.deny_access {
			return Err(MediaSourceError::AccessDenied);
		}

		Ok(())
	}

	async fn list_albums(&self) -> Result<Vec<Album>, MediaSourceError> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);

		Ok(self.albums.clone())
	}

	async fn items_newer_than(
		&self,
		album_title: &str,
		lower_bound_millis: Option<i64>,
		limit: usize,
	) -> Result<Vec<MediaItem>, MediaSourceError> {
		self.fetch_calls.fetch_add(1, Ordering::SeqCst);

		if self.failing_albums.contains(album_title) {
			return Err(MediaSourceError::AlbumRead {
				album: album_title.to_string(),
				reason: "backing store offline".to_string(),
			});
		}

		Ok(self
			.items
			.get(album_title)
			.map(|items| {
				items
					.iter()
					.filter(|item| {
						lower_bound_millis
							.map_or(true, |bound| item.captured_at_millis >= bound)
					})
					.take(limit)
					.cloned()
					.collect()
			})
			.unwrap_or_default())
	}
}

/// Transport stub recording every envelope it sees, failing the configured
/// uris.
#[derive(Debug, Default)]
pub struct RecordingTransport {
	failing_uris: HashSet<String>,
	pub seen: Mutex<Vec<UploadEnvelope>>,
}

impl RecordingTransport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn failing_on(uris: &[&str]) -> Self {
		Self {
			failing_uris: uris.iter().map(ToString::to_string).collect(),
			..Self::default()
		}
	}

	pub fn seen_uris(&self) -> Vec<String> {
		self.seen
			.lock()
			.unwrap()
			.iter()
			.map(|envelope| envelope.uri.clone())
			.collect()
	}

	pub fn seen_names(&self) -> Vec<String> {
		self.seen
			.lock()
			.unwrap()
			.iter()
			.map(|envelope| envelope.name.clone())
			.collect()
	}
}

#[async_trait]
impl UploadTransport for RecordingTransport {
	async fn upload(&self, envelope: &UploadEnvelope) -> Result<UploadAck, TransportError> {
		self.seen.lock().unwrap().push(envelope.clone());

		if self.failing_uris.contains(&envelope.uri) {
			return Err(TransportError("connection reset by peer".to_string()));
		}

		Ok(UploadAck::default())
	}
}

/// Transport that fires the pass's cancellation token during the first
/// upload, so the engine's next between-items check trips.
#[derive(Debug)]
pub struct CancelAfterFirstTransport {
	token: CancelToken,
}

impl CancelAfterFirstTransport {
	pub fn new(token: CancelToken) -> Self {
		Self { token }
	}
}

#[async_trait]
impl UploadTransport for CancelAfterFirstTransport {
	async fn upload(&self, _envelope: &UploadEnvelope) -> Result<UploadAck, TransportError> {
		self.token.cancel();

		Ok(UploadAck::default())
	}
}

/// Transport that blocks every upload until the test opens the gate, keeping
/// a pass in flight for as long as the test needs.
#[derive(Debug)]
pub struct GatedTransport {
	pub gate: Semaphore,
}

impl GatedTransport {
	pub fn closed() -> Self {
		Self {
			gate: Semaphore::new(0),
		}
	}
}

#[async_trait]
impl UploadTransport for GatedTransport {
	async fn upload(&self, _envelope: &UploadEnvelope) -> Result<UploadAck, TransportError> {
		let _permit = self
			.gate
			.acquire()
			.await
			.map_err(|e| TransportError(e.to_string()))?;

		Ok(UploadAck::default())
	}
}

/// In-memory watermark store with failure injection and call counters.
#[derive(Debug, Default)]
pub struct MemoryWatermarkStore {
	value: Mutex<Option<i64>>,
	fail_reads: bool,
	fail_writes: bool,
	pub reads: AtomicUsize,
	pub writes: AtomicUsize,
}

impl MemoryWatermarkStore {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn at(millis: i64) -> Self {
		Self {
			value: Mutex::new(Some(millis)),
			..Self::default()
		}
	}

	pub fn failing_reads() -> Self {
		Self {
			fail_reads: true,
			..Self::default()
		}
	}

	pub fn failing_writes() -> Self {
		Self {
			fail_writes: true,
			..Self::default()
		}
	}

	pub fn value(&self) -> Option<i64> {
		*self.value.lock().unwrap()
	}
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
	async fn get(&self) -> Result<Option<i64>, WatermarkError> {
		self.reads.fetch_add(1, Ordering::SeqCst);

		if self.fail_reads {
			return Err(broken_document());
		}

		Ok(self.value())
	}

	async fn set(&self, millis: i64) -> Result<(), WatermarkError> {
		self.writes.fetch_add(1, Ordering::SeqCst);

		if self.fail_writes {
			return Err(broken_document());
		}

		*self.value.lock().unwrap() = Some(millis);

		Ok(())
	}
}

fn broken_document() -> WatermarkError {
	WatermarkError::Malformed(serde_json::from_str::<i64>("oops").unwrap_err())
}

/// Reporter stub collecting every update for later inspection.
#[derive(Debug, Default)]
pub struct RecordingReporter(pub Mutex<Vec<ProgressUpdate>>);

impl ProgressReporter for RecordingReporter {
	fn progress(&self, update: ProgressUpdate) {
		self.0.lock().unwrap().push(update);
	}
}
