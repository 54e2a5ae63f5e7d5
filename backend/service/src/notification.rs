//! Notification derivation.

use beacon_backend_model::{
	delta::{BuildTreeDelta, DeltaCategory},
	notification::{Notification, NotificationKind},
	tree::BuildNode,
};
use beacon_common_model::{
	build::{BuildStatus, User},
	notify::{BuildNotificationMode, NotificationModes},
};
use kstring::KString;
use tracing::debug;

use crate::config::BackendConfig;

/// Groups larger than this are reported without aggregation wording.
const MAX_GROUPING_KEYS: usize = 3;

/// Produces notifications from a [BuildTreeDelta].
#[derive(Debug, Clone)]
pub struct NotificationFactory {
	modes: NotificationModes,
	identities: Vec<KString>,
}

impl NotificationFactory {
	pub fn new(config: &BackendConfig) -> Self {
		Self {
			modes: config.notifications,
			identities: config.identities.clone(),
		}
	}

	/// Derives the notifications for one delta.
	///
	/// Returns nothing when the delta is empty. Otherwise yields at most one
	/// notification per status group, in the order succeeded, failed,
	/// cancelled.
	pub fn produce_notifications(&self, delta: &BuildTreeDelta) -> Vec<Notification> {
		if delta.is_empty() {
			return Vec::new();
		}

		let succeeded = self.eligible(delta, DeltaCategory::Succeeded);
		let mut failed = self.eligible(delta, DeltaCategory::Failed);
		let mut cancelled = self.eligible(delta, DeltaCategory::Cancelled);

		// failures without any success read as "everything failed"
		if !failed.is_empty() && succeeded.is_empty() {
			failed.append(&mut cancelled);
		}

		let total = succeeded.len() + failed.len() + cancelled.len();
		let notifications: Vec<_> = [succeeded, failed, cancelled]
			.into_iter()
			.filter(|group| !group.is_empty())
			.map(|group| Self::aggregate(group, total))
			.collect();
		debug!(
			transitions = delta.len(),
			eligible = total,
			notifications = notifications.len(),
			"produced notifications"
		);
		notifications
	}

	fn eligible(&self, delta: &BuildTreeDelta, category: DeltaCategory) -> Vec<BuildNode> {
		let mode = match category {
			DeltaCategory::Succeeded => self.modes.succeeded,
			DeltaCategory::Failed => self.modes.failed,
			DeltaCategory::Cancelled => self.modes.cancelled,
		};
		delta
			.get(category)
			.iter()
			.filter(|node| self.should_notify(mode, node))
			.cloned()
			.collect()
	}

	fn should_notify(&self, mode: BuildNotificationMode, node: &BuildNode) -> bool {
		let is_me = |user: &Option<User>| {
			user.as_ref()
				.is_some_and(|user| user.is_any_of(&self.identities))
		};
		match mode {
			BuildNotificationMode::None => false,
			BuildNotificationMode::RequestedByMe => is_me(&node.build.requested_by),
			BuildNotificationMode::RequestedForMe => is_me(&node.build.requested_for),
			BuildNotificationMode::RequestedByOrForMe => {
				is_me(&node.build.requested_by) || is_me(&node.build.requested_for)
			}
			BuildNotificationMode::Always => true,
		}
	}

	/// Picks the most specific aggregation for one status group.
	fn aggregate(builds: Vec<BuildNode>, total: usize) -> Notification {
		let status = builds
			.iter()
			.map(BuildNode::status)
			.max()
			.unwrap_or(BuildStatus::None);

		let pairs = distinct(
			builds
				.iter()
				.map(|b| (b.definition_name().cloned(), b.branch.clone())),
		);
		let definitions = distinct(builds.iter().map(|b| b.definition_name().cloned()));
		let branches = distinct(builds.iter().map(|b| b.branch.clone()));
		let smallest = pairs.len().min(definitions.len()).min(branches.len());

		if smallest > MAX_GROUPING_KEYS || total == 1 {
			return Notification::new(NotificationKind::Build, status, builds);
		}

		if let [(Some(definition), Some(branch))] = pairs.as_slice() {
			let kind = NotificationKind::DefinitionAndBranch {
				definition: definition.clone(),
				branch: branch.clone(),
			};
			return Notification::new(kind, status, builds);
		}

		if definitions.len() == smallest {
			let kind = NotificationKind::Definition {
				definitions: definitions.into_iter().flatten().collect(),
			};
			return Notification::new(kind, status, builds);
		}

		let kind = NotificationKind::Branch {
			branches: branches.into_iter().flatten().collect(),
		};
		Notification::new(kind, status, builds)
	}
}

/// Distinct values in first-seen order.
fn distinct<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
	let mut result = Vec::new();
	for value in values {
		if !result.contains(&value) {
			result.push(value);
		}
	}
	result
}
