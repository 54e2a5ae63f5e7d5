use std::hash::{Hash, Hasher};

use kstring::KString;
use serde::{Deserialize, Serialize};

pub type BranchId = KString;

/// A source control branch known to a provider.
///
/// Two branches are equal when their ids are equal. Renaming a branch
/// keeps its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Branch {
	pub id: BranchId,
	/// Raw provider name, e.g. `refs/heads/main`.
	pub name: KString,
	/// Name shown to users, e.g. `main`.
	///
	/// Providers that leave this empty get a display name derived from
	/// [Branch::name] by the branch name extractor.
	#[serde(default)]
	pub display_name: KString,
}

impl PartialEq for Branch {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for Branch {}

impl Hash for Branch {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}
