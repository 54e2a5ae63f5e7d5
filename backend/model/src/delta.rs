//! Status transitions observed between two tree states.

use std::collections::HashSet;

use beacon_common_model::{
	build::{BuildId, BuildStatus},
	notify::PartialSucceededTreatmentMode,
};

use crate::tree::BuildNode;

/// Delta set a finished build is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaCategory {
	Succeeded,
	Failed,
	Cancelled,
}

impl DeltaCategory {
	/// Category of a build status, if it is reported at all.
	///
	/// In-progress statuses have no category.
	pub fn of(
		status: BuildStatus,
		partial: PartialSucceededTreatmentMode,
	) -> Option<Self> {
		match status {
			BuildStatus::Succeeded => Some(Self::Succeeded),
			BuildStatus::Failed => Some(Self::Failed),
			BuildStatus::Cancelled => Some(Self::Cancelled),
			BuildStatus::PartiallySucceeded => match partial {
				PartialSucceededTreatmentMode::Ignore => None,
				PartialSucceededTreatmentMode::TreatAsSucceeded => {
					Some(Self::Succeeded)
				}
				PartialSucceededTreatmentMode::TreatAsFailed => Some(Self::Failed),
			},
			BuildStatus::None | BuildStatus::Pending | BuildStatus::Running => {
				None
			}
		}
	}
}

/// Builds that arrived at a final status during one merge.
///
/// The three sets are disjoint: a build is recorded at most once.
#[derive(Debug, Clone, Default)]
pub struct BuildTreeDelta {
	succeeded: Vec<BuildNode>,
	failed: Vec<BuildNode>,
	cancelled: Vec<BuildNode>,
	recorded: HashSet<BuildId>,
}

impl BuildTreeDelta {
	/// Records a build transition.
	///
	/// Returns `false` if the build was already recorded in this delta.
	pub fn record(&mut self, category: DeltaCategory, node: BuildNode) -> bool {
		if !self.recorded.insert(node.build.id.clone()) {
			return false;
		}
		match category {
			DeltaCategory::Succeeded => self.succeeded.push(node),
			DeltaCategory::Failed => self.failed.push(node),
			DeltaCategory::Cancelled => self.cancelled.push(node),
		}
		true
	}

	pub fn get(&self, category: DeltaCategory) -> &[BuildNode] {
		match category {
			DeltaCategory::Succeeded => &self.succeeded,
			DeltaCategory::Failed => &self.failed,
			DeltaCategory::Cancelled => &self.cancelled,
		}
	}

	pub fn succeeded(&self) -> &[BuildNode] {
		&self.succeeded
	}

	pub fn failed(&self) -> &[BuildNode] {
		&self.failed
	}

	pub fn cancelled(&self) -> &[BuildNode] {
		&self.cancelled
	}

	pub fn len(&self) -> usize {
		self.recorded.len()
	}

	pub fn is_empty(&self) -> bool {
		self.recorded.is_empty()
	}
}
