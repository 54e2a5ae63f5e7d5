use kstring::KString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::definition::BuildDefinition;

/// Provider-scoped build identifier.
pub type BuildId = KString;

/// Status of a build.
///
/// Variants are declared in ascending significance. The derived ordering
/// is what "maximum status" of a group of builds refers to: finished
/// states outrank in-progress ones, and failures outrank everything.
#[derive(
	Debug,
	Clone,
	Copy,
	Default,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Serialize,
	Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStatus {
	#[default]
	None,
	Pending,
	Running,
	Cancelled,
	Succeeded,
	PartiallySucceeded,
	Failed,
}

impl BuildStatus {
	/// Past-tense wording used in notification texts.
	pub fn describe(&self) -> &'static str {
		match self {
			Self::None => "changed",
			Self::Pending => "pending",
			Self::Running => "running",
			Self::Cancelled => "cancelled",
			Self::Succeeded => "succeeded",
			Self::PartiallySucceeded => "partially succeeded",
			Self::Failed => "failed",
		}
	}
}

/// A user as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct User {
	/// Canonical identifier compared against the current user's identities.
	pub unique_name: KString,
	#[serde(default)]
	pub display_name: KString,
}

impl User {
	/// Whether this user is one of the given identities.
	pub fn is_any_of(&self, identities: &[KString]) -> bool {
		identities.iter().any(|id| *id == self.unique_name)
	}
}

/// A single build as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Build {
	pub id: BuildId,
	pub status: BuildStatus,
	#[serde(default)]
	pub definition: Option<BuildDefinition>,
	/// Raw branch name, e.g. `refs/heads/main`.
	#[serde(default)]
	pub branch_name: Option<KString>,
	/// Project (source) the build belongs to.
	#[serde(default)]
	pub project: Option<KString>,
	#[serde(default)]
	pub requested_by: Option<User>,
	#[serde(default)]
	pub requested_for: Option<User>,
	#[serde(with = "time::serde::rfc3339")]
	pub queued_at: OffsetDateTime,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub finished_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339")]
	pub last_changed_at: OffsetDateTime,
}

impl Build {
	/// Name of the build's definition, if it has one.
	pub fn definition_name(&self) -> Option<&KString> {
		self.definition.as_ref().map(|d| &d.name)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_status_order() {
		assert!(BuildStatus::Failed > BuildStatus::PartiallySucceeded);
		assert!(BuildStatus::PartiallySucceeded > BuildStatus::Succeeded);
		assert!(BuildStatus::Succeeded > BuildStatus::Cancelled);
		assert!(BuildStatus::Cancelled > BuildStatus::Running);
		assert!(BuildStatus::Running > BuildStatus::Pending);
		assert!(BuildStatus::Pending > BuildStatus::None);
	}

	#[test]
	fn test_deserialize_build() {
		let build: Build = serde_json::from_str(
			r#"{
				"id": "1017",
				"status": "partially-succeeded",
				"definition": { "id": "7", "name": "Nightly" },
				"branch-name": "refs/heads/main",
				"requested-by": { "unique-name": "alice" },
				"queued-at": "2024-05-01T10:00:00Z",
				"last-changed-at": "2024-05-01T10:20:00Z"
			}"#,
		)
		.unwrap();
		assert_eq!(build.status, BuildStatus::PartiallySucceeded);
		assert_eq!(build.definition_name().unwrap(), "Nightly");
		assert_eq!(build.requested_by.unwrap().unique_name, "alice");
		assert!(build.requested_for.is_none());
		assert!(build.finished_at.is_none());
		assert!(build.project.is_none());
	}

	#[test]
	fn test_user_identities() {
		let user = User {
			unique_name: "alice".into(),
			display_name: "Alice".into(),
		};
		assert!(user.is_any_of(&["bob".into(), "alice".into()]));
		assert!(!user.is_any_of(&["Alice".into()]));
		assert!(!user.is_any_of(&[]));
	}
}
