//! Periodic polling of build providers.

use std::{sync::Arc, time::Duration};

use beacon_backend_service::{
	BackendError,
	config::BackendConfig,
	pipeline::{Pipeline, PipelineUpdate},
};
use beacon_common_model::Snapshot;
use futures::future::join_all;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

pub mod provider;
pub mod sink;

use provider::BoxedProvider;
use sink::BoxedSink;

#[derive(Debug, Error)]
pub enum PollerError {
	#[error("I/O error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("malformed snapshot: {0}")]
	JsonError(#[from] serde_json::Error),
	#[error("backend error: {0}")]
	BackendError(#[from] BackendError),
}

pub type Result<T, E = PollerError> = std::result::Result<T, E>;

#[derive(Debug)]
pub struct Poller {
	/// Notifier to start the next cycle immediately.
	notifier: Notify,
	interval: Duration,
	providers: Vec<BoxedProvider>,
	sink: BoxedSink,
	pipeline: Mutex<Pipeline>,
}

impl Poller {
	pub fn new(
		pipeline: Pipeline,
		providers: Vec<BoxedProvider>,
		sink: BoxedSink,
		interval: Duration,
	) -> Self {
		Self {
			notifier: Notify::const_new(),
			interval,
			providers,
			sink,
			pipeline: Mutex::new(pipeline),
		}
	}

	#[tracing::instrument(level = "info", name = "poller", skip(self))]
	pub async fn run(self: Arc<Self>) {
		info!(providers = self.providers.len(), "poller started");
		loop {
			if let Err(error) = self.poll_once().await {
				error!(%error, "poll cycle failed")
			}
			self.wait().await;
		}
	}

	/// Runs a single cycle.
	///
	/// Returns `None` if any provider failed; the tree is left untouched
	/// in that case.
	pub async fn poll_once(&self) -> Result<Option<PipelineUpdate>> {
		let results =
			join_all(self.providers.iter().map(|provider| provider.fetch())).await;

		let mut snapshot = Snapshot::default();
		for (provider, result) in self.providers.iter().zip(results) {
			match result {
				Ok(part) => snapshot.extend(part),
				Err(error) => {
					warn!(provider = provider.name(), %error, "fetch failed, skipping cycle");
					return Ok(None);
				}
			}
		}

		let update = self.pipeline.lock().await.update(&snapshot)?;
		if !update.notifications.is_empty() {
			self.sink.deliver(update.notifications.clone()).await?;
		}
		Ok(Some(update))
	}

	/// Requests a cycle without waiting for the interval.
	///
	/// Requests made while a cycle is running collapse into one.
	pub fn refresh_now(&self) {
		self.notifier.notify_one();
	}

	/// Swaps the backend configuration and refreshes.
	pub async fn reconfigure(&self, config: BackendConfig) -> Result<()> {
		self.pipeline.lock().await.reconfigure(config)?;
		self.refresh_now();
		Ok(())
	}

	async fn wait(&self) {
		tokio::select! {
			_ = tokio::time::sleep(self.interval) => {}
			_ = self.notifier.notified() => debug!("notified to refresh"),
		}
	}
}
