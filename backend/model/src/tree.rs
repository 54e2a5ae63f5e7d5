//! The build tree.
//!
//! A tree is a root, one level of group nodes per grouping criterion, and
//! build nodes as leaves. Nodes are stored in a [StableDiGraph], whose
//! indices stay valid when other nodes are removed. A node removed by a
//! sweep frees its index for reuse, but only nodes created in a later merge
//! can take it, so ids compared between two consecutive tree states never
//! alias.

use beacon_common_model::{
	build::{Build, BuildStatus},
	definition::BuildDefinition,
	group::GroupDefinition,
};
use kstring::KString;
use petgraph::{
	Direction,
	stable_graph::{NodeIndex, StableDiGraph},
	visit::Dfs,
};
use thiserror::Error;

/// Identity of a node within its tree.
pub type NodeId = NodeIndex;

/// Tree structure errors.
///
/// These signal broken invariants, never bad provider data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
	#[error("node {0:?} is not part of the tree")]
	NodeMissing(NodeId),
	#[error("node {0:?} is a build node and cannot have children")]
	LeafParent(NodeId),
	#[error("the root node cannot be replaced or removed")]
	RootImmutable,
}

/// A specialized [`Result`] for tree errors.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Key of a group node.
///
/// Two group nodes are the same node iff their keys are equal.
/// Definitions compare by id, so a renamed definition keeps its node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
	/// Branch display name.
	Branch(KString),
	Definition(BuildDefinition),
	/// Source (project) name.
	Source(KString),
	Status(BuildStatus),
}

impl GroupKey {
	/// Text shown for this group.
	pub fn display_name(&self) -> &str {
		match self {
			GroupKey::Branch(name) | GroupKey::Source(name) => name,
			GroupKey::Definition(definition) => &definition.name,
			GroupKey::Status(status) => match status {
				BuildStatus::None => "None",
				BuildStatus::Pending => "Pending",
				BuildStatus::Running => "Running",
				BuildStatus::Cancelled => "Cancelled",
				BuildStatus::Succeeded => "Succeeded",
				BuildStatus::PartiallySucceeded => "Partially succeeded",
				BuildStatus::Failed => "Failed",
			},
		}
	}
}

/// A leaf wrapping exactly one build.
///
/// Equality is by build id.
#[derive(Debug, Clone, Eq)]
pub struct BuildNode {
	pub build: Build,
	/// Display name of the build's branch, if it has one.
	pub branch: Option<KString>,
}

impl BuildNode {
	pub fn status(&self) -> BuildStatus {
		self.build.status
	}

	pub fn definition_name(&self) -> Option<&KString> {
		self.build.definition_name()
	}
}

impl PartialEq for BuildNode {
	fn eq(&self, other: &Self) -> bool {
		self.build.id == other.build.id
	}
}

/// What a node represents.
///
/// Equality is node equality: same variant and same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Root,
	Group(GroupKey),
	Build(BuildNode),
}

#[derive(Debug, Clone)]
pub struct TreeNode {
	pub kind: NodeKind,
	/// Levels below the root; the root's children have depth 1.
	pub depth: usize,
	/// Merge generation in which the node was last confirmed.
	seen: u64,
}

impl TreeNode {
	pub fn new(kind: NodeKind, depth: usize) -> Self {
		Self {
			kind,
			depth,
			seen: 0,
		}
	}

	pub fn as_build(&self) -> Option<&BuildNode> {
		match &self.kind {
			NodeKind::Build(build) => Some(build),
			_ => None,
		}
	}

	pub fn as_group(&self) -> Option<&GroupKey> {
		match &self.kind {
			NodeKind::Group(key) => Some(key),
			_ => None,
		}
	}
}

/// A tree of builds, grouped by a [GroupDefinition].
#[derive(Debug, Clone)]
pub struct BuildTree {
	graph: StableDiGraph<TreeNode, ()>,
	root: NodeId,
	group_definition: GroupDefinition,
	generation: u64,
}

impl BuildTree {
	pub fn new(group_definition: GroupDefinition) -> Self {
		let mut graph = StableDiGraph::new();
		let root = graph.add_node(TreeNode::new(NodeKind::Root, 0));
		Self {
			graph,
			root,
			group_definition,
			generation: 0,
		}
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn group_definition(&self) -> &GroupDefinition {
		&self.group_definition
	}

	/// Re-tags the tree with a new shape.
	///
	/// Existing nodes stay in place; the next merge moves builds into the
	/// new shape and sweeps whatever no longer fits.
	pub fn set_group_definition(&mut self, group_definition: GroupDefinition) {
		self.group_definition = group_definition;
	}

	/// Number of nodes, excluding the root.
	pub fn len(&self) -> usize {
		self.graph.node_count() - 1
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.graph.contains_node(id)
	}

	pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
		self.graph.node_weight(id)
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.graph
			.neighbors_directed(id, Direction::Incoming)
			.next()
	}

	/// Children of a node, in insertion order.
	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		let mut children: Vec<_> = self
			.graph
			.neighbors_directed(id, Direction::Outgoing)
			.collect();
		// edges are iterated newest first
		children.reverse();
		children
	}

	/// Finds the child of `parent` that is the same node as `kind`.
	pub fn find_child(&self, parent: NodeId, kind: &NodeKind) -> Option<NodeId> {
		self.children(parent)
			.into_iter()
			.find(|child| self.graph[*child].kind == *kind)
	}

	/// All build nodes, in no particular order.
	pub fn builds(&self) -> impl Iterator<Item = (NodeId, &BuildNode)> {
		self.graph
			.node_indices()
			.filter_map(move |id| {
				self.graph[id].as_build().map(|build| (id, build))
			})
	}

	/// Finds the leaf holding the build with the given id.
	pub fn find_build(&self, build_id: &str) -> Option<NodeId> {
		self.builds()
			.find(|(_, node)| node.build.id == build_id)
			.map(|(id, _)| id)
	}

	/// The most significant status among the builds below a node.
	///
	/// A build node's status is its own. A node without builds below it
	/// reports [BuildStatus::None].
	pub fn status(&self, id: NodeId) -> BuildStatus {
		let mut status = BuildStatus::None;
		if !self.graph.contains_node(id) {
			return status;
		}
		let mut dfs = Dfs::new(&self.graph, id);
		while let Some(node) = dfs.next(&self.graph) {
			if let Some(build) = self.graph[node].as_build() {
				status = status.max(build.status());
			}
		}
		status
	}

	/// Depth of the deepest node.
	pub fn max_depth(&self) -> usize {
		self.graph
			.node_indices()
			.map(|id| self.graph[id].depth)
			.max()
			.unwrap_or(0)
	}

	// merge primitives

	/// Marks every node as a deletion candidate.
	///
	/// Bumps the merge generation; every node last seen in an older
	/// generation counts as tagged until [BuildTree::untag] confirms it.
	pub fn tag_all(&mut self) {
		self.generation += 1;
		let generation = self.generation;
		self.graph[self.root].seen = generation;
	}

	pub fn is_tagged(&self, id: NodeId) -> bool {
		self.graph
			.node_weight(id)
			.is_some_and(|node| node.seen != self.generation)
	}

	pub fn untag(&mut self, id: NodeId) -> Result<()> {
		let generation = self.generation;
		let node = self
			.graph
			.node_weight_mut(id)
			.ok_or(TreeError::NodeMissing(id))?;
		node.seen = generation;
		Ok(())
	}

	/// Inserts `node` as a new, untagged child of `parent`.
	pub fn attach(&mut self, parent: NodeId, mut node: TreeNode) -> Result<NodeId> {
		match self.graph.node_weight(parent) {
			None => return Err(TreeError::NodeMissing(parent)),
			Some(TreeNode {
				kind: NodeKind::Build(_),
				..
			}) => return Err(TreeError::LeafParent(parent)),
			Some(_) => {}
		}
		node.seen = self.generation;
		let id = self.graph.add_node(node);
		self.graph.add_edge(parent, id, ());
		Ok(id)
	}

	/// Replaces the data of an existing node, keeping its identity.
	///
	/// Returns the previous data.
	pub fn update(&mut self, id: NodeId, node: TreeNode) -> Result<TreeNode> {
		if id == self.root {
			return Err(TreeError::RootImmutable);
		}
		let existing = self
			.graph
			.node_weight_mut(id)
			.ok_or(TreeError::NodeMissing(id))?;
		let seen = existing.seen;
		let previous = std::mem::replace(existing, node);
		existing.seen = seen;
		Ok(previous)
	}

	/// Removes a node together with everything below it.
	///
	/// Returns the number of nodes removed.
	pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize> {
		if id == self.root {
			return Err(TreeError::RootImmutable);
		}
		if !self.graph.contains_node(id) {
			return Err(TreeError::NodeMissing(id));
		}
		let mut doomed = Vec::new();
		let mut dfs = Dfs::new(&self.graph, id);
		while let Some(node) = dfs.next(&self.graph) {
			doomed.push(node);
		}
		for node in &doomed {
			self.graph.remove_node(*node);
		}
		Ok(doomed.len())
	}
}

#[cfg(test)]
mod test {
	use beacon_common_model::group::GroupCriterion;

	use super::*;
	use crate::test::{build, definition};

	fn build_node(id: &str, status: BuildStatus) -> TreeNode {
		let nightly = definition("1", "Nightly");
		TreeNode::new(
			NodeKind::Build(BuildNode {
				build: build(id, status, &nightly, "main"),
				branch: Some("main".into()),
			}),
			2,
		)
	}

	fn branch_node(name: &str) -> TreeNode {
		TreeNode::new(NodeKind::Group(GroupKey::Branch(KString::from_ref(name))), 1)
	}

	fn sample_tree() -> (BuildTree, NodeId) {
		let mut tree = BuildTree::new(GroupDefinition::new([GroupCriterion::Branch]));
		let main = tree.attach(tree.root(), branch_node("main")).unwrap();
		tree.attach(main, build_node("1", BuildStatus::Succeeded))
			.unwrap();
		tree.attach(main, build_node("2", BuildStatus::Failed))
			.unwrap();
		(tree, main)
	}

	#[test]
	fn test_definition_key_equality_by_id() {
		let before = GroupKey::Definition(definition("7", "Nightly"));
		let renamed = GroupKey::Definition(definition("7", "Nightly (old)"));
		let other = GroupKey::Definition(definition("8", "Nightly"));
		assert_eq!(before, renamed);
		assert_ne!(before, other);
		assert_ne!(
			GroupKey::Branch("main".into()),
			GroupKey::Source("main".into())
		);
	}

	#[test]
	fn test_children_in_insertion_order() {
		let (tree, main) = sample_tree();
		let ids: Vec<_> = tree
			.children(main)
			.into_iter()
			.map(|id| tree.node(id).unwrap().as_build().unwrap().build.id.clone())
			.collect();
		assert_eq!(ids, vec!["1", "2"]);
		assert_eq!(tree.parent(main), Some(tree.root()));
		assert_eq!(tree.len(), 3);
	}

	#[test]
	fn test_status_is_max_of_descendants() {
		let (mut tree, main) = sample_tree();
		assert_eq!(tree.status(main), BuildStatus::Failed);
		assert_eq!(tree.status(tree.root()), BuildStatus::Failed);

		let dev = tree.attach(tree.root(), branch_node("dev")).unwrap();
		assert_eq!(tree.status(dev), BuildStatus::None);
		tree.attach(dev, build_node("3", BuildStatus::Running))
			.unwrap();
		assert_eq!(tree.status(dev), BuildStatus::Running);
	}

	#[test]
	fn test_find_child_and_build() {
		let (tree, main) = sample_tree();
		let kind = NodeKind::Group(GroupKey::Branch("main".into()));
		assert_eq!(tree.find_child(tree.root(), &kind), Some(main));
		let missing = NodeKind::Group(GroupKey::Branch("dev".into()));
		assert_eq!(tree.find_child(tree.root(), &missing), None);

		let leaf = tree.find_build("2").unwrap();
		assert_eq!(tree.parent(leaf), Some(main));
		assert!(tree.find_build("404").is_none());
	}

	#[test]
	fn test_tag_untag() {
		let (mut tree, main) = sample_tree();
		assert!(!tree.is_tagged(main));
		tree.tag_all();
		assert!(tree.is_tagged(main));
		assert!(!tree.is_tagged(tree.root()));
		tree.untag(main).unwrap();
		assert!(!tree.is_tagged(main));

		let dev = tree.attach(tree.root(), branch_node("dev")).unwrap();
		assert!(!tree.is_tagged(dev));
	}

	#[test]
	fn test_update_keeps_identity() {
		let (mut tree, _) = sample_tree();
		let leaf = tree.find_build("1").unwrap();
		tree.tag_all();
		let previous = tree
			.update(leaf, build_node("1", BuildStatus::Failed))
			.unwrap();
		assert_eq!(previous.as_build().unwrap().status(), BuildStatus::Succeeded);
		assert_eq!(tree.find_build("1"), Some(leaf));
		assert_eq!(
			tree.node(leaf).unwrap().as_build().unwrap().status(),
			BuildStatus::Failed
		);
		// updating data does not confirm the node
		assert!(tree.is_tagged(leaf));
	}

	#[test]
	fn test_remove_subtree() {
		let (mut tree, main) = sample_tree();
		assert_eq!(tree.remove_subtree(main), Ok(3));
		assert!(tree.is_empty());
		assert!(!tree.contains(main));
		assert_eq!(tree.remove_subtree(main), Err(TreeError::NodeMissing(main)));
		assert_eq!(
			tree.remove_subtree(tree.root()),
			Err(TreeError::RootImmutable)
		);
	}

	#[test]
	fn test_attach_below_leaf() {
		let (mut tree, _) = sample_tree();
		let leaf = tree.find_build("1").unwrap();
		assert_eq!(
			tree.attach(leaf, branch_node("dev")),
			Err(TreeError::LeafParent(leaf))
		);
	}

	#[test]
	fn test_max_depth() {
		let (mut tree, _) = sample_tree();
		assert_eq!(tree.max_depth(), 2);
		// a shallower sibling added last must not lower the maximum
		tree.attach(tree.root(), branch_node("dev")).unwrap();
		assert_eq!(tree.max_depth(), 2);
		assert_eq!(BuildTree::new(GroupDefinition::default()).max_depth(), 0);
	}
}
