pub mod report;

use std::{fs, path::PathBuf};

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use vismatch_domain::DetectedAttributes;
use vismatch_service::{
	CancellationToken, ImageInput, MatchEngine, RecognitionSession, SessionState,
};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Detected attributes as JSON. Skips the vision model.
	#[arg(long, value_name = "FILE", conflicts_with = "image", required_unless_present = "image")]
	pub attributes: Option<PathBuf>,
	/// Product photo sent to the vision model.
	#[arg(long, value_name = "FILE")]
	pub image: Option<PathBuf>,
	/// "Find more" rounds to run after the initial pass.
	#[arg(long, default_value_t = 1)]
	pub rounds: u32,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = vismatch_config::load(&args.config)?;
	init_tracing(&config);

	let engine = MatchEngine::new(&config);
	let mut session = RecognitionSession::new();
	let cancel = CancellationToken::new();
	let on_interrupt = cancel.clone();

	tracing::info!(session_id = %session.id(), rounds = args.rounds, "Recognition started.");

	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::warn!("Interrupted. Cancelling the running pass.");
			on_interrupt.cancel();
		}
	});

	let outcome = match (&args.attributes, &args.image) {
		(Some(path), _) => {
			let attrs: DetectedAttributes = serde_json::from_str(&fs::read_to_string(path)?)?;

			engine.start(&mut session, attrs, &cancel).await?
		},
		(None, Some(path)) => {
			let image = ImageInput::new(mime_type(path)?, fs::read(path)?);

			engine.recognize(&mut session, &image, &cancel).await?
		},
		(None, None) => return Err(eyre::eyre!("Either --attributes or --image is required.")),
	};

	report::print_match(&session, &outcome)?;

	for round in 1..=args.rounds {
		if session.state() != SessionState::AwaitingSelection {
			tracing::info!(state = ?session.state(), "No further rounds possible.");

			break;
		}

		let outcome = engine.search_more(&mut session, &cancel).await?;

		report::print_refine(&session, round, &outcome)?;
	}

	Ok(())
}

fn mime_type(path: &std::path::Path) -> color_eyre::Result<&'static str> {
	let extension = path
		.extension()
		.and_then(|ext| ext.to_str())
		.map(str::to_ascii_lowercase)
		.unwrap_or_default();

	match extension.as_str() {
		"jpg" | "jpeg" => Ok("image/jpeg"),
		"png" => Ok("image/png"),
		"webp" => Ok("image/webp"),
		_ => Err(eyre::eyre!("Unsupported image type: {}.", path.display())),
	}
}

fn init_tracing(config: &vismatch_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Green.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}
