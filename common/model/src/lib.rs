//! Value types shared by every Beacon crate.
//!
//! Providers hand these over as already-normalized data; the core never
//! mutates them.

pub mod branch;
pub mod build;
pub mod definition;
pub mod group;
pub mod notify;

use serde::{Deserialize, Serialize};

use crate::{branch::Branch, build::Build, definition::BuildDefinition};

/// A fully materialized provider result.
///
/// The core only ever runs on complete snapshots. Results from several
/// providers are combined with [`Snapshot::extend`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Snapshot {
	#[serde(default)]
	pub builds: Vec<Build>,
	#[serde(default)]
	pub branches: Vec<Branch>,
	#[serde(default)]
	pub definitions: Vec<BuildDefinition>,
}

impl Snapshot {
	pub fn extend(&mut self, other: Snapshot) {
		self.builds.extend(other.builds);
		self.branches.extend(other.branches);
		self.definitions.extend(other.definitions);
	}
}
