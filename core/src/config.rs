//! Client configuration document.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use rollsync_utils::error::IoContextError;

/// Largest page requested from the media source per album and pass.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Overrides the persisted endpoint when set, so test builds can point at a
/// staging ingester without touching the device config.
pub const ENDPOINT_ENV_VAR: &str = "ROLLSYNC_ENDPOINT";

const CONFIG_FILE_NAME: &str = "rollsync.json";

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error(transparent)]
	Io(#[from] IoContextError),
	#[error("malformed config document: {0}")]
	Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Config schema version.
	pub version: u32,
	/// Base URL of the ingestion endpoint; the transport appends `/upload`.
	pub endpoint: String,
	pub page_size: usize,
}

impl ClientConfig {
	const fn target_version() -> u32 {
		1
	}

	/// Load the config from `data_dir`, creating a default document when
	/// none exists yet.
	pub fn load_from(data_dir: &Path) -> Result<Self, ConfigError> {
		let path = data_dir.join(CONFIG_FILE_NAME);

		let mut config = if path.exists() {
			let raw =
				fs::read_to_string(&path).map_err(|e| IoContextError::new(&path, e))?;
			let mut config: Self = serde_json::from_str(&raw)?;

			if config.version < Self::target_version() {
				info!(
					from = config.version,
					to = Self::target_version(),
					"Migrating client config;"
				);
				config.version = Self::target_version();
				config.save(data_dir)?;
			}

			config
		} else {
			warn!(path = %path.display(), "No client config found, creating default;");
			let config = Self::default();
			config.save(data_dir)?;
			config
		};

		if let Ok(endpoint) = env::var(ENDPOINT_ENV_VAR) {
			info!("Endpoint overridden from environment;");
			config.endpoint = endpoint;
		}

		Ok(config)
	}

	pub fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
		fs::create_dir_all(data_dir)
			.map_err(|e| IoContextError::with_note(data_dir, e, "creating config directory"))?;

		let path = data_dir.join(CONFIG_FILE_NAME);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&path, json).map_err(|e| IoContextError::new(&path, e))?;

		Ok(())
	}
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			version: Self::target_version(),
			endpoint: String::new(),
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}
