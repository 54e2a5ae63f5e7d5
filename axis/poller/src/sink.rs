//! Delivery of notifications.

use std::{fmt::Debug, sync::Arc};

use beacon_backend_model::notification::Notification;
use futures::{
	FutureExt,
	future::{BoxFuture, ready},
};
use tracing::info;

use crate::Result;

pub trait NotificationSink: Send + Sync + Debug {
	fn deliver(&self, notifications: Vec<Notification>) -> BoxFuture<'_, Result<()>>;
}

pub type BoxedSink = Arc<dyn NotificationSink>;

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
	fn deliver(&self, notifications: Vec<Notification>) -> BoxFuture<'_, Result<()>> {
		for notification in &notifications {
			info!(
				status = ?notification.status,
				builds = notification.builds.len(),
				details = %notification.message(),
				"{notification}"
			);
		}
		ready(Ok(())).boxed()
	}
}
