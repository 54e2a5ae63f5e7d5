use beacon_common_model::{
	group::{GroupCriterion, GroupDefinition},
	notify::{NotificationModes, PartialSucceededTreatmentMode},
};
use kstring::KString;
use serde::{Deserialize, Serialize};

use crate::{BackendError, Result};

/// Configuration read by the tree builder and notification factory.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackendConfig {
	/// Tree shape, outermost level first.
	#[serde(default = "default_group_definition")]
	pub group_definition: GroupDefinition,
	#[serde(default)]
	pub notifications: NotificationModes,
	/// Unique names the current user is known by across providers.
	#[serde(default)]
	pub identities: Vec<KString>,
	#[serde(default)]
	pub partial_succeeded_treatment: PartialSucceededTreatmentMode,
}

fn default_group_definition() -> GroupDefinition {
	GroupDefinition::new([
		GroupCriterion::Source,
		GroupCriterion::BuildDefinition,
		GroupCriterion::Branch,
	])
}

impl Default for BackendConfig {
	fn default() -> Self {
		Self {
			group_definition: default_group_definition(),
			notifications: NotificationModes::default(),
			identities: Vec::new(),
			partial_succeeded_treatment: PartialSucceededTreatmentMode::default(),
		}
	}
}

impl BackendConfig {
	/// Rejects configurations the tree cannot represent.
	///
	/// A criterion used on two levels would nest every group in a copy
	/// of itself.
	pub fn validate(&self) -> Result<()> {
		let mut seen = Vec::new();
		for criterion in self.group_definition.levels() {
			if seen.contains(&criterion) {
				return Err(BackendError::ConfigError(format!(
					"group criterion {criterion:?} is used more than once"
				)));
			}
			seen.push(criterion);
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use beacon_common_model::notify::BuildNotificationMode;

	use super::*;

	#[test]
	fn test_defaults() {
		let config: BackendConfig = toml::from_str("").unwrap();
		assert_eq!(config, BackendConfig::default());
		assert_eq!(config.group_definition.depth(), 4);
		assert_eq!(config.notifications.failed, BuildNotificationMode::Always);
		config.validate().unwrap();
	}

	#[test]
	fn test_parse() {
		let config: BackendConfig = toml::from_str(
			r#"
			group-definition = ["branch", "status"]
			identities = ["alice", "alice@example.com"]
			partial-succeeded-treatment = "treat-as-failed"

			[notifications]
			failed = "requested-by-or-for-me"
			succeeded = "none"
			"#,
		)
		.unwrap();
		assert_eq!(
			config.group_definition.criteria(),
			&[GroupCriterion::Branch, GroupCriterion::Status]
		);
		assert_eq!(config.identities.len(), 2);
		assert_eq!(
			config.partial_succeeded_treatment,
			PartialSucceededTreatmentMode::TreatAsFailed
		);
		assert_eq!(
			config.notifications.failed,
			BuildNotificationMode::RequestedByOrForMe
		);
		assert_eq!(config.notifications.succeeded, BuildNotificationMode::None);
		assert_eq!(
			config.notifications.cancelled,
			BuildNotificationMode::Always
		);
	}

	#[test]
	fn test_duplicate_criterion() {
		let config = BackendConfig {
			group_definition: GroupDefinition::new([
				GroupCriterion::Branch,
				GroupCriterion::None,
				GroupCriterion::None,
				GroupCriterion::Branch,
			]),
			..Default::default()
		};
		assert!(matches!(
			config.validate(),
			Err(BackendError::ConfigError(_))
		));
	}
}
