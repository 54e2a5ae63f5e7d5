use serde::{Deserialize, Serialize};

/// When to notify about builds of one status category.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BuildNotificationMode {
	None,
	RequestedByMe,
	RequestedForMe,
	RequestedByOrForMe,
	/// Also used for unrecognized values, since staying silent is the
	/// worse failure for a notifier.
	#[default]
	#[serde(other)]
	Always,
}

/// How partially succeeded builds are counted when computing a delta.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PartialSucceededTreatmentMode {
	/// Not reported at all.
	Ignore,
	#[default]
	TreatAsSucceeded,
	TreatAsFailed,
}

/// Per-category notification modes.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationModes {
	#[serde(default)]
	pub failed: BuildNotificationMode,
	#[serde(default)]
	pub succeeded: BuildNotificationMode,
	#[serde(default)]
	pub cancelled: BuildNotificationMode,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_unknown_mode_fails_open() {
		let modes: NotificationModes = toml::from_str(
			r#"
			failed = "requested-by-me"
			succeeded = "whenever-i-feel-like-it"
			"#,
		)
		.unwrap();
		assert_eq!(modes.failed, BuildNotificationMode::RequestedByMe);
		assert_eq!(modes.succeeded, BuildNotificationMode::Always);
		assert_eq!(modes.cancelled, BuildNotificationMode::Always);
	}
}
