use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
	time::Duration,
};

use anyhow::{Context, Result};
use beacon_axis_poller::provider::{BoxedProvider, SnapshotFileProvider};
use beacon_backend_service::config::BackendConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AxisConfig {
	/// Seconds between two poll cycles.
	#[serde(default = "default_poll_interval")]
	pub poll_interval_secs: u64,
	#[serde(default)]
	pub provider: Vec<ProviderConfig>,
	#[serde(flatten)]
	pub backend: BackendConfig,
}

fn default_poll_interval() -> u64 {
	60
}

impl AxisConfig {
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read {}", path.display()))?;
		toml::from_str(&content)
			.with_context(|| format!("failed to parse {}", path.display()))
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs.max(1))
	}

	pub fn providers(&self) -> Vec<BoxedProvider> {
		self.provider.iter().map(ProviderConfig::open).collect()
	}
}

impl TryFrom<AxisConfig> for BackendConfig {
	type Error = anyhow::Error;

	fn try_from(config: AxisConfig) -> Result<Self, Self::Error> {
		config.backend.validate()?;
		Ok(config.backend)
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, Deserialize, Serialize)]
pub struct ProviderConfig {
	pub name: String,
	#[serde(flatten)]
	pub source: ProviderSource,
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProviderSource {
	/// A JSON snapshot on disk, re-read every cycle.
	SnapshotFile { path: PathBuf },
}

impl ProviderConfig {
	fn open(&self) -> BoxedProvider {
		match &self.source {
			ProviderSource::SnapshotFile { path } => {
				Arc::new(SnapshotFileProvider::new(&self.name, path))
			}
		}
	}
}
