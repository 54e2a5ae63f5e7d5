//! One poll cycle: merge a snapshot into the tree, then notify.

use std::sync::Arc;

use beacon_backend_model::{
	delta::BuildTreeDelta, notification::Notification, tree::BuildTree,
};
use beacon_common_model::Snapshot;
use tracing::info;

use crate::{
	Result,
	branch::{BranchNameExtractor, RefsBranchNameExtractor},
	config::BackendConfig,
	notification::NotificationFactory,
	tree::TreeBuilder,
};

/// Result of one [Pipeline::update].
#[derive(Debug, Clone)]
pub struct PipelineUpdate {
	/// Sequence number of the cycle, starting at 1.
	pub cycle: u64,
	pub delta: BuildTreeDelta,
	pub notifications: Vec<Notification>,
}

/// Owns the build tree and runs poll cycles against it.
///
/// Updates take `&mut self`, so a cycle can never start while another
/// one is merging into the same tree.
#[derive(Debug)]
pub struct Pipeline {
	config: Arc<BackendConfig>,
	extractor: Arc<dyn BranchNameExtractor>,
	builder: TreeBuilder,
	factory: NotificationFactory,
	tree: Option<BuildTree>,
	cycle: u64,
}

impl Pipeline {
	pub fn new(config: BackendConfig) -> Result<Self> {
		Self::with_extractor(config, Arc::new(RefsBranchNameExtractor))
	}

	pub fn with_extractor(
		config: BackendConfig,
		extractor: Arc<dyn BranchNameExtractor>,
	) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			builder: TreeBuilder::new(&config, extractor.clone()),
			factory: NotificationFactory::new(&config),
			config: Arc::new(config),
			extractor,
			tree: None,
			cycle: 0,
		})
	}

	pub fn config(&self) -> &BackendConfig {
		&self.config
	}

	/// The tree as of the last completed cycle.
	pub fn tree(&self) -> Option<&BuildTree> {
		self.tree.as_ref()
	}

	/// Replaces the configuration.
	///
	/// The tree is kept; the next update re-shapes it if the group
	/// definition changed.
	pub fn reconfigure(&mut self, config: BackendConfig) -> Result<()> {
		config.validate()?;
		self.builder = TreeBuilder::new(&config, self.extractor.clone());
		self.factory = NotificationFactory::new(&config);
		self.config = Arc::new(config);
		info!("pipeline reconfigured");
		Ok(())
	}

	/// Runs one cycle over a complete snapshot.
	#[tracing::instrument(skip_all, fields(cycle = self.cycle + 1))]
	pub fn update(&mut self, snapshot: &Snapshot) -> Result<PipelineUpdate> {
		let delta = match &mut self.tree {
			Some(tree) => self.builder.merge(
				tree,
				&snapshot.builds,
				&snapshot.branches,
				&snapshot.definitions,
			)?,
			None => {
				let (tree, delta) = self.builder.build(
					&snapshot.builds,
					&snapshot.branches,
					&snapshot.definitions,
				)?;
				self.tree = Some(tree);
				delta
			}
		};
		let notifications = self.factory.produce_notifications(&delta);

		self.cycle += 1;
		info!(
			builds = snapshot.builds.len(),
			transitions = delta.len(),
			notifications = notifications.len(),
			"pipeline updated"
		);
		Ok(PipelineUpdate {
			cycle: self.cycle,
			delta,
			notifications,
		})
	}
}
