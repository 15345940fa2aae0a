use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = augur_api::Args::parse();
	augur_api::run(args).await
}
