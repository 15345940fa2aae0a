pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(version, about, rename_all = "kebab")]
pub struct Args {
	/// TOML config file. Without it the config is read from the environment.
	#[arg(long, short = 'c', value_name = "FILE", env = "AUGUR_CONFIG")]
	pub config: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = match args.config.as_deref() {
		Some(path) => augur_config::load(path)?,
		None => augur_config::from_env()?,
	};
	init_tracing(&config);
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	tracing::info!(
		search = %config.search.endpoint,
		provider = %config.providers.llm.api_type,
		llm = %config.providers.llm.model,
		embedding = %config.providers.embedding.model,
		"Configuration loaded."
	);
	let state = AppState::new(config)?;
	let app = routes::router(state);

	let listener = TcpListener::bind(http_addr).await?;
	tracing::info!(%http_addr, "HTTP server listening.");
	axum::serve(listener, app).await?;
	Ok(())
}

fn init_tracing(config: &augur_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}
