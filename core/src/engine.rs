use std::{
	collections::HashSet,
	fmt,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use rollsync_utils::unix_millis_now;

use crate::{
	config::DEFAULT_PAGE_SIZE,
	envelope::{self, UploadEnvelope},
	media::MediaSource,
	selection::SelectionState,
	store::WatermarkStore,
	transport::UploadTransport,
	Error, NonCriticalError, ProgressReporter, ProgressUpdate,
};

/// Window start used when the watermark was requested but none has ever been
/// persisted: 2023-12-22T00:00:00+02:00, the deployment's first sync day.
pub const FALLBACK_LOWER_BOUND: i64 = 1_703_196_000_000;

/// Outcome summary of one sync pass, for the UI to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
	pub items_attempted: u64,
	pub items_failed: u64,
	/// Most recent non-critical failure observed during the pass, if any.
	/// Not a full log: later failures overwrite earlier ones.
	pub last_error: Option<NonCriticalError>,
}

/// How a pass ended: ran to completion, or stopped at a cancellation point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
	Completed(SyncResult),
	/// Counts cover the portion processed before the token fired. A canceled
	/// pass never advances the watermark.
	Canceled(SyncResult),
}

/// Cooperative cancellation flag. The engine polls it between items only, so
/// an in-flight upload is never torn down halfway.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	#[must_use]
	pub fn is_canceled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

/// Orchestrates one incremental sync pass at a time over the collaborator
/// seams: windowed fetch per selected album, sequential per-item upload,
/// last-error tracking, conditional watermark advance.
pub struct SyncEngine {
	media: Arc<dyn MediaSource>,
	store: Arc<dyn WatermarkStore>,
	transport: Arc<dyn UploadTransport>,
	reporter: Option<Arc<dyn ProgressReporter>>,
	page_size: usize,
	busy: AtomicBool,
}

impl fmt::Debug for SyncEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SyncEngine")
			.field("page_size", &self.page_size)
			.field("busy", &self.is_busy())
			.finish_non_exhaustive()
	}
}

impl SyncEngine {
	#[must_use]
	pub fn new(
		media: Arc<dyn MediaSource>,
		store: Arc<dyn WatermarkStore>,
		transport: Arc<dyn UploadTransport>,
	) -> Self {
		Self {
			media,
			store,
			transport,
			reporter: None,
			page_size: DEFAULT_PAGE_SIZE,
			busy: AtomicBool::new(false),
		}
	}

	#[must_use]
	pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
		self.reporter = Some(reporter);
		self
	}

	#[must_use]
	pub fn with_page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size;
		self
	}

	/// Whether a pass is currently in flight. The UI uses this to disable
	/// its sync trigger; a second [`run`](Self::run) while busy fails fast
	/// anyway.
	#[must_use]
	pub fn is_busy(&self) -> bool {
		self.busy.load(Ordering::Acquire)
	}

	/// Run one sync pass over the given selection snapshot.
	///
	/// Individual item failures never surface as `Err`: they are counted and
	/// summarized in the returned [`SyncResult`]. Only permission refusal, a
	/// selection referencing an unknown album, a failed album listing or a
	/// re-entrant trigger abort the pass.
	pub async fn run(
		&self,
		selection: SelectionState,
		cancel: CancelToken,
	) -> Result<SyncStatus, Error> {
		let Some(_busy) = BusyGuard::acquire(&self.busy) else {
			return Err(Error::AlreadyRunning);
		};

		let pass_id = Uuid::new_v4();
		info!(
			%pass_id,
			albums = selection.albums.len(),
			use_watermark = selection.use_watermark,
			"Starting sync pass;"
		);

		self.media.ensure_access().await?;

		let mut result = SyncResult::default();
		// Albums whose page could not be read: the window was not fully
		// covered, so the watermark must not move past it.
		let mut window_gaps = 0u64;

		if selection.albums.is_empty() {
			debug!(%pass_id, "Empty selection, nothing to enumerate;");
		} else {
			let lower_bound = self.resolve_lower_bound(&selection).await;

			// Precondition: the selection may only reference albums the
			// device has right now. Checked against one listing snapshot; an
			// album disappearing later in the pass just yields an empty page.
			let known = self
				.media
				.list_albums()
				.await?
				.into_iter()
				.map(|album| album.title)
				.collect::<HashSet<_>>();
			if let Some(unknown) = selection
				.albums
				.iter()
				.find(|title| !known.contains(*title))
			{
				return Err(Error::UnknownAlbum(unknown.clone()));
			}

			self.report(ProgressUpdate::PassStarted {
				albums: selection.albums.len(),
			});

			let mut seen_titles = HashSet::new();
			for title in &selection.albums {
				if !seen_titles.insert(title.as_str()) {
					continue;
				}

				self.report(ProgressUpdate::AlbumStarted(title.clone()));

				let items = match self
					.media
					.items_newer_than(title, lower_bound, self.page_size)
					.await
				{
					Ok(items) => items,
					Err(e) => {
						warn!(%pass_id, album = %title, %e, "Album page fetch failed, skipping album;");
						window_gaps += 1;
						result.last_error = Some(NonCriticalError::AlbumRead {
							album: title.clone(),
							reason: e.to_string(),
						});
						continue;
					}
				};

				trace!(%pass_id, album = %title, items = items.len(), "Fetched album page;");

				for item in items {
					if cancel.is_canceled() {
						info!(
							%pass_id,
							attempted = result.items_attempted,
							"Sync pass canceled;"
						);
						return Ok(SyncStatus::Canceled(result));
					}

					self.report(ProgressUpdate::CurrentItem(
						envelope::basename(&item.uri).to_string(),
					));

					let envelope = UploadEnvelope::for_item(&item);
					result.items_attempted += 1;

					match self.transport.upload(&envelope).await {
						Ok(_ack) => trace!(%pass_id, name = %envelope.name, "Uploaded item;"),
						Err(e) => {
							warn!(%pass_id, name = %envelope.name, %e, "Upload failed, continuing;");
							result.items_failed += 1;
							// Last failure wins; the UI shows one summary error.
							result.last_error = Some(NonCriticalError::Upload {
								name: envelope.name.clone(),
								reason: e.to_string(),
							});
						}
					}

					self.report(ProgressUpdate::ItemsAttempted(result.items_attempted));
				}
			}
		}

		if result.items_failed == 0 && window_gaps == 0 {
			self.maybe_advance_watermark(&selection, &mut result).await;
		}

		info!(
			%pass_id,
			attempted = result.items_attempted,
			failed = result.items_failed,
			"Sync pass finished;"
		);

		Ok(SyncStatus::Completed(result))
	}

	async fn resolve_lower_bound(&self, selection: &SelectionState) -> Option<i64> {
		if selection.use_watermark {
			match self.store.get().await {
				Ok(Some(millis)) => Some(millis),
				Ok(None) => Some(FALLBACK_LOWER_BOUND),
				Err(e) => {
					warn!(%e, "Watermark read failed, falling back to the project epoch;");
					Some(FALLBACK_LOWER_BOUND)
				}
			}
		} else {
			selection.reference_timestamp
		}
	}

	/// Advance the watermark to wall-clock now, when the pass both used the
	/// watermark and covered its whole window cleanly. A write failure is a
	/// warning, not a failed pass: the next pass just re-scans this window.
	async fn maybe_advance_watermark(&self, selection: &SelectionState, result: &mut SyncResult) {
		if !selection.use_watermark {
			return;
		}

		let now = unix_millis_now();
		match self.store.set(now).await {
			Ok(()) => debug!(millis = now, "Watermark advanced;"),
			Err(e) => {
				warn!(%e, "Watermark write failed, next pass will re-scan this window;");
				result.last_error = Some(NonCriticalError::Watermark(e.to_string()));
			}
		}
	}

	fn report(&self, update: ProgressUpdate) {
		if let Some(reporter) = &self.reporter {
			reporter.progress(update);
		}
	}
}

/// Clears the busy flag on every exit path of a pass.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
	fn acquire(flag: &'a AtomicBool) -> Option<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
			// Lazily: constructing a guard on the failed path would clear the
			// flag the running pass still holds when it drops.
			.then(|| Self(flag))
	}
}

impl Drop for BusyGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}
