//! Tree building and incremental merging.

use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};

use beacon_backend_model::{
	delta::{BuildTreeDelta, DeltaCategory},
	tree::{BuildNode, BuildTree, GroupKey, NodeId, NodeKind, TreeNode},
};
use beacon_common_model::{
	branch::Branch,
	build::{Build, BuildId, BuildStatus},
	definition::{BuildDefinition, DefinitionId},
	group::{GroupCriterion, GroupDefinition},
	notify::PartialSucceededTreatmentMode,
};
use kstring::KString;
use tracing::{debug, info};

use crate::{Result, branch::BranchNameExtractor, config::BackendConfig};

/// Builds trees from flat build lists and merges them into existing trees.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
	group_definition: GroupDefinition,
	partial: PartialSucceededTreatmentMode,
	extractor: Arc<dyn BranchNameExtractor>,
}

/// Per-merge lookup data shared by every path.
struct PathContext<'a> {
	branches: &'a [Branch],
	definitions: HashMap<&'a DefinitionId, &'a BuildDefinition>,
}

impl TreeBuilder {
	pub fn new(
		config: &BackendConfig,
		extractor: Arc<dyn BranchNameExtractor>,
	) -> Self {
		Self {
			group_definition: config.group_definition.clone(),
			partial: config.partial_succeeded_treatment,
			extractor,
		}
	}

	pub fn group_definition(&self) -> &GroupDefinition {
		&self.group_definition
	}

	/// Builds a new tree from scratch.
	///
	/// Every build in the result is first-seen, so every finished build
	/// ends up in the returned delta.
	pub fn build(
		&self,
		builds: &[Build],
		branches: &[Branch],
		definitions: &[BuildDefinition],
	) -> Result<(BuildTree, BuildTreeDelta)> {
		let mut tree = BuildTree::new(self.group_definition.clone());
		let delta = self.merge(&mut tree, builds, branches, definitions)?;
		Ok((tree, delta))
	}

	/// Merges the current builds into an existing tree, in place.
	///
	/// Nodes whose key still exists keep their identity, new nodes are
	/// inserted, and nodes no build maps to anymore are removed. Returns
	/// the builds that arrived at a final status during this merge.
	#[tracing::instrument(skip_all, fields(builds = builds.len()))]
	pub fn merge(
		&self,
		tree: &mut BuildTree,
		builds: &[Build],
		branches: &[Branch],
		definitions: &[BuildDefinition],
	) -> Result<BuildTreeDelta> {
		if *tree.group_definition() != self.group_definition {
			info!(
				from = ?tree.group_definition().criteria(),
				to = ?self.group_definition.criteria(),
				"group definition changed, re-tagging tree"
			);
			tree.set_group_definition(self.group_definition.clone());
		}

		let previous = Self::tag_all_nodes(tree);

		let context = PathContext {
			branches,
			definitions: definitions.iter().map(|d| (&d.id, d)).collect(),
		};
		let mut delta = BuildTreeDelta::default();
		let mut merged = HashSet::new();
		let mut skipped = 0usize;

		for build in builds {
			if merged.contains(&build.id) {
				debug!(build = %build.id, "skipping duplicate build");
				skipped += 1;
				continue;
			}
			let Some(path) = self.build_path(build, &context) else {
				debug!(build = %build.id, "skipping malformed build");
				skipped += 1;
				continue;
			};
			merged.insert(&build.id);
			let leaf = path.last().and_then(TreeNode::as_build).cloned();

			let root = tree.root();
			Self::merge_path(tree, root, path.into_iter())?;

			if let Some(leaf) = leaf {
				self.record_transition(&mut delta, &previous, leaf);
			}
		}

		let root = tree.root();
		let removed = Self::remove_tagged_nodes(tree, root)?;

		debug!(
			nodes = tree.len(),
			removed,
			skipped,
			transitions = delta.len(),
			"merged builds into tree"
		);
		Ok(delta)
	}

	/// Builds the strict chain of nodes from a top-level group down to the
	/// build's leaf.
	///
	/// Returns `None` when the build lacks data one of the levels needs.
	fn build_path(
		&self,
		build: &Build,
		context: &PathContext<'_>,
	) -> Option<Vec<TreeNode>> {
		if build.id.is_empty() {
			return None;
		}

		let mut build = build.clone();
		if let Some(definition) = &build.definition
			&& let Some(latest) = context.definitions.get(&definition.id)
		{
			build.definition = Some((*latest).clone());
		}
		let branch = build
			.branch_name
			.as_deref()
			.filter(|name| !name.is_empty())
			.map(|name| self.extractor.extract_display_name(name, context.branches));

		let depth = self.group_definition.depth();
		let mut path = Vec::with_capacity(depth);
		let mut current = depth;
		for criterion in self.group_definition.levels().rev() {
			current -= 1;
			let key = Self::group_key(criterion, &build, branch.as_ref())?;
			path.push(TreeNode::new(NodeKind::Group(key), current));
		}
		path.reverse();
		path.push(TreeNode::new(
			NodeKind::Build(BuildNode { build, branch }),
			depth,
		));
		Some(path)
	}

	fn group_key(
		criterion: GroupCriterion,
		build: &Build,
		branch: Option<&KString>,
	) -> Option<GroupKey> {
		match criterion {
			GroupCriterion::Branch => branch.cloned().map(GroupKey::Branch),
			GroupCriterion::BuildDefinition => {
				build.definition.clone().map(GroupKey::Definition)
			}
			GroupCriterion::Source => build
				.project
				.as_ref()
				.or_else(|| build.definition.as_ref()?.project.as_ref())
				.filter(|project| !project.is_empty())
				.cloned()
				.map(GroupKey::Source),
			GroupCriterion::Status => Some(GroupKey::Status(build.status)),
			GroupCriterion::None => None,
		}
	}

	/// Tags every node for deletion and remembers each build's status.
	fn tag_all_nodes(tree: &mut BuildTree) -> HashMap<BuildId, BuildStatus> {
		tree.tag_all();
		tree.builds()
			.map(|(_, node)| (node.build.id.clone(), node.status()))
			.collect()
	}

	/// Merges one freshly built chain below `parent`.
	///
	/// The chain has exactly one node per level, so recursion depth is
	/// bounded by the tree depth.
	fn merge_path(
		tree: &mut BuildTree,
		parent: NodeId,
		mut path: impl Iterator<Item = TreeNode>,
	) -> Result<()> {
		let Some(node) = path.next() else {
			return Ok(());
		};

		match tree.find_child(parent, &node.kind) {
			Some(existing) => {
				tree.update(existing, node)?;
				tree.untag(existing)?;
				Self::merge_path(tree, existing, path)
			}
			None => {
				let mut attach_to = tree.attach(parent, node)?;
				for node in path {
					attach_to = tree.attach(attach_to, node)?;
				}
				tree.untag(parent)?;
				Ok(())
			}
		}
	}

	/// Removes every node still tagged, together with its subtree.
	fn remove_tagged_nodes(tree: &mut BuildTree, parent: NodeId) -> Result<usize> {
		let mut removed = 0;
		for child in tree.children(parent) {
			if tree.is_tagged(child) {
				removed += tree.remove_subtree(child)?;
			} else {
				removed += Self::remove_tagged_nodes(tree, child)?;
			}
		}
		Ok(removed)
	}

	fn record_transition(
		&self,
		delta: &mut BuildTreeDelta,
		previous: &HashMap<BuildId, BuildStatus>,
		leaf: BuildNode,
	) {
		let status = leaf.status();
		let Some(category) = DeltaCategory::of(status, self.partial) else {
			return;
		};
		if previous.get(&leaf.build.id) == Some(&status) {
			return;
		}
		delta.record(category, leaf);
	}
}
