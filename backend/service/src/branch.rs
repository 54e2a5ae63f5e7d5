//! Branch display names.

use std::fmt::Debug;

use beacon_common_model::branch::Branch;
use kstring::KString;

/// Derives the name shown for a raw branch name.
///
/// Display rules differ by provider, so the tree builder takes this as a
/// collaborator.
pub trait BranchNameExtractor
where
	Self: Send + Sync + Debug,
{
	fn extract_display_name(&self, name: &str, known: &[Branch]) -> KString;
}

const HEADS_PREFIX: &str = "refs/heads/";
const PULL_PREFIX: &str = "refs/pull/";
const PULL_SUFFIX: &str = "/merge";

/// Extractor for git ref names.
///
/// A display name supplied by the provider for a known branch wins.
/// Otherwise `refs/heads/<name>` becomes `<name>` and
/// `refs/pull/<n>/merge` becomes `PR <n>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefsBranchNameExtractor;

impl BranchNameExtractor for RefsBranchNameExtractor {
	fn extract_display_name(&self, name: &str, known: &[Branch]) -> KString {
		if let Some(branch) = known
			.iter()
			.find(|b| b.name == name && !b.display_name.is_empty())
		{
			return branch.display_name.clone();
		}

		if let Some(short) = name.strip_prefix(HEADS_PREFIX) {
			return KString::from_ref(short);
		}
		if let Some(number) = name
			.strip_prefix(PULL_PREFIX)
			.and_then(|rest| rest.strip_suffix(PULL_SUFFIX))
		{
			return KString::from_string(format!("PR {number}"));
		}
		KString::from_ref(name)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_refs() {
		let extractor = RefsBranchNameExtractor;
		assert_eq!(extractor.extract_display_name("refs/heads/main", &[]), "main");
		assert_eq!(
			extractor.extract_display_name("refs/heads/feature/tree", &[]),
			"feature/tree"
		);
		assert_eq!(
			extractor.extract_display_name("refs/pull/42/merge", &[]),
			"PR 42"
		);
		assert_eq!(extractor.extract_display_name("trunk", &[]), "trunk");
	}

	#[test]
	fn test_known_branch_wins() {
		let known = [
			Branch {
				id: "1".into(),
				name: "refs/heads/main".into(),
				display_name: "Main line".into(),
			},
			Branch {
				id: "2".into(),
				name: "refs/heads/dev".into(),
				display_name: "".into(),
			},
		];
		let extractor = RefsBranchNameExtractor;
		assert_eq!(
			extractor.extract_display_name("refs/heads/main", &known),
			"Main line"
		);
		assert_eq!(
			extractor.extract_display_name("refs/heads/dev", &known),
			"dev"
		);
	}
}
