use serde::{Deserialize, Serialize};

/// One dimension used to bucket builds in the tree.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum GroupCriterion {
	Source,
	BuildDefinition,
	Branch,
	Status,
	/// Absent level. Unknown criteria read from configuration end up here.
	#[serde(other)]
	None,
}

/// Ordered grouping criteria chosen by the user, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupDefinition(Vec<GroupCriterion>);

impl GroupDefinition {
	pub fn new(criteria: impl IntoIterator<Item = GroupCriterion>) -> Self {
		Self(criteria.into_iter().collect())
	}

	/// Criteria as configured, including absent levels.
	pub fn criteria(&self) -> &[GroupCriterion] {
		&self.0
	}

	/// Levels that actually produce group nodes.
	pub fn levels(&self) -> impl DoubleEndedIterator<Item = GroupCriterion> {
		self.0
			.iter()
			.copied()
			.filter(|c| *c != GroupCriterion::None)
	}

	/// Depth of build nodes in a tree shaped by this definition.
	pub fn depth(&self) -> usize {
		self.levels().count() + 1
	}
}

impl FromIterator<GroupCriterion> for GroupDefinition {
	fn from_iter<T: IntoIterator<Item = GroupCriterion>>(iter: T) -> Self {
		Self::new(iter)
	}
}
