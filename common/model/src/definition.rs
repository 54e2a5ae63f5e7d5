use std::hash::{Hash, Hasher};

use kstring::KString;
use serde::{Deserialize, Serialize};

pub type DefinitionId = KString;

/// A build definition (pipeline) owned by a source project.
///
/// Equality is by id only, so a renamed definition is still the same one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildDefinition {
	pub id: DefinitionId,
	pub name: KString,
	/// Owning source or project.
	#[serde(default)]
	pub project: Option<KString>,
}

impl PartialEq for BuildDefinition {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for BuildDefinition {}

impl Hash for BuildDefinition {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}
