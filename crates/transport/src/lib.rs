//! HTTP upload transport speaking the ingestion endpoint's multipart
//! contract: `POST {base}/upload`, one form part under the `files` field per
//! item, file name carrying the composite wire identifier.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, trace};

use rollsync_core::{
	TransportError, UploadAck, UploadEnvelope, UploadTransport, UPLOAD_FIELD_NAME,
};

/// Best-effort uploader: one multipart POST per item. Timeouts, proxies and
/// TLS are whatever the supplied [`reqwest::Client`] was configured with.
#[derive(Debug, Clone)]
pub struct HttpUploader {
	client: reqwest::Client,
	base_url: String,
}

impl HttpUploader {
	#[must_use]
	pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
		let mut base_url = base_url.into();
		while base_url.ends_with('/') {
			base_url.pop();
		}

		Self { client, base_url }
	}

	fn upload_url(&self) -> String {
		format!("{}/upload", self.base_url)
	}
}

#[async_trait]
impl UploadTransport for HttpUploader {
	async fn upload(&self, envelope: &UploadEnvelope) -> Result<UploadAck, TransportError> {
		let path = local_path(&envelope.uri);
		let bytes = tokio::fs::read(&path)
			.await
			.map_err(|e| TransportError(format!("reading {}: {e}", path.display())))?;

		trace!(name = %envelope.name, len = bytes.len(), "Uploading item;");

		let part = Part::bytes(bytes)
			.file_name(envelope.name.clone())
			.mime_str(&envelope.mime_kind)
			.map_err(|e| TransportError(e.to_string()))?;
		let form = Form::new().part(UPLOAD_FIELD_NAME, part);

		let response = self
			.client
			.post(self.upload_url())
			.header(reqwest::header::ACCEPT, "application/json")
			.multipart(form)
			.send()
			.await
			.and_then(reqwest::Response::error_for_status)
			.map_err(|e| TransportError(e.to_string()))?;

		// The ack is opaque; a 2xx with a non-JSON body is still a success.
		let body = response
			.json::<serde_json::Value>()
			.await
			.unwrap_or(serde_json::Value::Null);

		debug!(name = %envelope.name, "Upload acknowledged;");

		Ok(UploadAck(body))
	}
}

/// Resolves the device-local locator to a filesystem path. Only the `file`
/// scheme and plain paths are handled here; platform-virtual uris
/// (`content://`, `ph://`) must be materialized by the media source first.
fn local_path(uri: &str) -> PathBuf {
	Path::new(uri.strip_prefix("file://").unwrap_or(uri)).to_path_buf()
}
