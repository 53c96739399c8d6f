use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::envelope::UploadEnvelope;

/// Response body returned by the endpoint on success; rollsync treats it as
/// opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadAck(pub serde_json::Value);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{0}")]
pub struct TransportError(pub String);

/// One best-effort upload of one media item. No retry, no resume; the caller
/// decides what a failure means for the pass.
#[async_trait]
pub trait UploadTransport: Send + Sync {
	async fn upload(&self, envelope: &UploadEnvelope) -> Result<UploadAck, TransportError>;
}
