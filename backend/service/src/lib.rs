//! Beacon backend services.
//!
//! Turns provider snapshots into a build tree, and tree deltas into
//! notifications.

use beacon_backend_model::tree::TreeError;
use thiserror::Error;

pub mod branch;
pub mod config;
pub mod notification;
pub mod pipeline;
pub mod tree;

/// Backend errors.
///
/// Irregular provider data never ends up here; it is skipped instead.
#[derive(Debug, Error)]
pub enum BackendError {
	#[error("build tree invariant violated: {0}")]
	TreeError(#[from] TreeError),
	#[error("invalid configuration: {0}")]
	ConfigError(String),
}

/// A specialized [`Result`] for backend errors.
pub type Result<T, E = BackendError> = std::result::Result<T, E>;

#[cfg(test)]
pub(crate) mod test {
	use beacon_common_model::{
		build::{Build, BuildStatus, User},
		definition::BuildDefinition,
	};
	use kstring::KString;
	use time::macros::datetime;

	pub fn definition(id: &str, name: &str) -> BuildDefinition {
		BuildDefinition {
			id: KString::from_ref(id),
			name: KString::from_ref(name),
			project: Some("Beacon".into()),
		}
	}

	pub fn user(name: &str) -> User {
		User {
			unique_name: KString::from_ref(name),
			display_name: KString::from_ref(name),
		}
	}

	pub fn build(
		id: &str,
		status: BuildStatus,
		definition: &BuildDefinition,
		branch: &str,
	) -> Build {
		Build {
			id: KString::from_ref(id),
			status,
			definition: Some(definition.clone()),
			branch_name: Some(KString::from_ref(branch)),
			project: definition.project.clone(),
			requested_by: Some(user("alice")),
			requested_for: None,
			queued_at: datetime!(2024-05-01 10:00 UTC),
			finished_at: None,
			last_changed_at: datetime!(2024-05-01 10:05 UTC),
		}
	}
}
