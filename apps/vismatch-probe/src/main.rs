use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = vismatch_probe::Args::parse();
	vismatch_probe::run(args).await
}
