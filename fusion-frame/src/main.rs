use clap::Parser;
use fusion_frame::{
    config,
    pipeline::{FusionBrain, Format},
    server,
};
use log::info;
use simplelog::{LevelFilter, SimpleLogger};
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Opt {
    /// Optional TOML file with prompts and rendering settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Body served by /image. Overrides the configuration file.
    #[arg(long, value_enum)]
    format: Option<Format>,
    /// Invert the bits of the raw frame buffer.
    #[arg(long)]
    invert: bool,
    /// Port to listen on. Overrides $PORT.
    #[arg(long)]
    port: Option<u16>,
    /// Log polling progress and frame buffer details.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    let level = if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::init(level, Default::default())?;

    // Refuse to start without credentials.
    let env = config::Env::from_env()?;
    let mut settings = match &opt.config {
        Some(path) => config::load(path)?,
        None => config::Settings::default(),
    };
    if let Some(format) = opt.format {
        settings.format = format;
    }
    settings.invert |= opt.invert;

    let mut client = fusion_brain::Client::new(env.credentials).with_polling(settings.polling());
    if let Some(url) = env.api_url {
        client = client.with_base_url(url);
    }
    let generator = FusionBrain::new(client, &settings);
    let app = server::router(server::AppState::new(generator, settings));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", opt.port.unwrap_or(env.port))).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
