//! User-facing notifications derived from a delta.

use std::fmt;

use beacon_common_model::build::BuildStatus;
use kstring::KString;

use crate::tree::BuildNode;

/// Aggregation chosen for a notification, with the keys that justify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
	/// The builds share no grouping worth mentioning.
	Build,
	/// The builds belong to a few definitions.
	Definition { definitions: Vec<KString> },
	/// The builds ran on a few branches.
	Branch { branches: Vec<KString> },
	/// All builds share one definition and one branch.
	DefinitionAndBranch { definition: KString, branch: KString },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	pub kind: NotificationKind,
	/// Most significant status among [Notification::builds].
	pub status: BuildStatus,
	pub builds: Vec<BuildNode>,
}

impl Notification {
	pub fn new(
		kind: NotificationKind,
		status: BuildStatus,
		builds: Vec<BuildNode>,
	) -> Self {
		Self {
			kind,
			status,
			builds,
		}
	}

	/// One-line summary.
	pub fn title(&self) -> String {
		let status = self.status.describe();
		let count = self.builds.len();
		match &self.kind {
			NotificationKind::Build => match self.builds.as_slice() {
				[single] => format!("{} {status}", label(single)),
				_ => format!("{count} builds {status}"),
			},
			NotificationKind::Definition { definitions } => {
				format!("{count} builds of {} {status}", join(definitions))
			}
			NotificationKind::Branch { branches } => {
				format!("{count} builds on {} {status}", join(branches))
			}
			NotificationKind::DefinitionAndBranch { definition, branch } => {
				if count == 1 {
					format!("{definition} {status} on {branch}")
				} else {
					format!("{count} builds of {definition} {status} on {branch}")
				}
			}
		}
	}

	/// One line per build.
	pub fn message(&self) -> String {
		self.builds
			.iter()
			.map(|node| {
				let mut line = label(node);
				if let Some(branch) = &node.branch {
					line.push_str(" on ");
					line.push_str(branch);
				}
				if let Some(user) = &node.build.requested_by {
					let name = if user.display_name.is_empty() {
						&user.unique_name
					} else {
						&user.display_name
					};
					line.push_str(" requested by ");
					line.push_str(name);
				}
				line
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

impl fmt::Display for Notification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.title())
	}
}

fn label(node: &BuildNode) -> String {
	match node.definition_name() {
		Some(name) => format!("{name} #{}", node.build.id),
		None => format!("Build #{}", node.build.id),
	}
}

fn join(names: &[KString]) -> String {
	names
		.iter()
		.map(KString::as_str)
		.collect::<Vec<_>>()
		.join(", ")
}
