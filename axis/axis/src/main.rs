use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use anyhow::{Result, bail};
use beacon_axis_poller::{Poller, sink::LogSink};
use beacon_backend_service::{config::BackendConfig, pipeline::Pipeline};
use clap::Parser;
use config::AxisConfig;
use tracing::{error, info};

mod config;

#[derive(clap::Parser)]
struct Args {
	#[arg(short, long, default_value = "beacon.toml")]
	config: PathBuf,
	/// Run a single poll cycle and exit.
	#[arg(long)]
	once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	tracing::subscriber::set_global_default(
		tracing_subscriber::FmtSubscriber::builder()
			.with_max_level(tracing::Level::INFO)
			.finish(),
	)?;

	let config_path = &args.config;
	let config = AxisConfig::load(config_path)?;
	info!("loaded configuration from file: {:?}", config_path);

	let providers = config.providers();
	if providers.is_empty() {
		bail!("no build providers configured")
	}
	let interval = config.poll_interval();

	info!("initializing pipeline ...");
	let pipeline = Pipeline::new(config.try_into()?)?;
	let poller = Arc::new(Poller::new(
		pipeline,
		providers,
		Arc::new(LogSink),
		interval,
	));

	if args.once {
		match poller.poll_once().await? {
			Some(update) => info!(
				notifications = update.notifications.len(),
				"poll cycle finished"
			),
			None => bail!("poll cycle skipped, a provider failed"),
		}
		return Ok(());
	}

	tokio::spawn(poller.clone().run());
	wait_for_signals(&poller, config_path).await
}

#[cfg(unix)]
async fn wait_for_signals(poller: &Poller, config_path: &Path) -> Result<()> {
	use tokio::signal::unix::{SignalKind, signal};

	let mut hangup = signal(SignalKind::hangup())?;
	loop {
		tokio::select! {
			result = tokio::signal::ctrl_c() => {
				result?;
				info!("interrupted, exiting");
				return Ok(());
			}
			_ = hangup.recv() => reload(poller, config_path).await,
		}
	}
}

#[cfg(not(unix))]
async fn wait_for_signals(_poller: &Poller, _config_path: &Path) -> Result<()> {
	tokio::signal::ctrl_c().await?;
	info!("interrupted, exiting");
	Ok(())
}

/// Re-reads the backend part of the configuration.
///
/// Providers and the poll interval are fixed for the process lifetime.
#[cfg_attr(not(unix), allow(dead_code))]
async fn reload(poller: &Poller, config_path: &Path) {
	let result = async {
		let config = BackendConfig::try_from(AxisConfig::load(config_path)?)?;
		poller.reconfigure(config).await?;
		Ok::<_, anyhow::Error>(())
	}
	.await;
	match result {
		Ok(()) => info!("reloaded configuration from file: {:?}", config_path),
		Err(error) => {
			error!(?error, "failed to reload configuration, keeping the previous one")
		}
	}
}
