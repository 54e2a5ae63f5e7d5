//! Sources of build snapshots.

use std::{fmt::Debug, path::PathBuf, sync::Arc};

use beacon_common_model::Snapshot;
use futures::{FutureExt, future::BoxFuture};
use tracing::debug;

use crate::Result;

/// A source of build data.
///
/// A fetch either yields a complete snapshot or fails as a whole.
pub trait BuildProvider: Send + Sync + Debug {
	fn name(&self) -> &str;

	fn fetch(&self) -> BoxFuture<'_, Result<Snapshot>>;
}

pub type BoxedProvider = Arc<dyn BuildProvider>;

/// Reads a JSON-encoded [Snapshot] from a file on every fetch.
#[derive(Debug, Clone)]
pub struct SnapshotFileProvider {
	name: String,
	path: PathBuf,
}

impl SnapshotFileProvider {
	pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
		}
	}
}

impl BuildProvider for SnapshotFileProvider {
	fn name(&self) -> &str {
		&self.name
	}

	fn fetch(&self) -> BoxFuture<'_, Result<Snapshot>> {
		async move {
			let content = tokio::fs::read(&self.path).await?;
			let snapshot: Snapshot = serde_json::from_slice(&content)?;
			debug!(
				provider = self.name,
				builds = snapshot.builds.len(),
				"snapshot loaded"
			);
			Ok(snapshot)
		}
		.boxed()
	}
}
