use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = msf_api::Args::parse();

	msf_api::run(args).await
}
