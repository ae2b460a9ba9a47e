use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod admin;
mod aggregate;
mod charts;
mod config;
mod error;
mod export;
mod generator;
mod models;
mod page;
mod render;
mod server;

use crate::admin::{AdminPanel, HeaderImageStore};
use crate::config::{ChallengeView, DashboardConfig, HeaderMode};
use crate::page::DashboardData;
use crate::render::{FormInput, HtmlRenderer};

#[derive(Parser)]
#[command(name = "challenge-dashboard")]
#[command(about = "Synthetic sign-up and challenge completion dashboard", long_about = None)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[arg(long, global = true)]
    users: Option<usize>,
    #[arg(long, global = true)]
    days: Option<usize>,
    /// Which challenge charts to show
    #[arg(long, global = true, value_enum)]
    view: Option<ChallengeView>,
    #[arg(long, global = true, value_enum)]
    header_mode: Option<HeaderMode>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
    /// Render the dashboard to a static HTML file
    Render {
        #[arg(long, default_value = "dashboard.html")]
        out: PathBuf,
    },
    /// Export every generated table as CSV
    Export {
        #[arg(long, default_value = "exports")]
        dir: PathBuf,
    },
    /// Print the chart specs as JSON
    Charts {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the header image
    SetHeader {
        #[arg(long)]
        password: String,
        #[arg(long)]
        image: PathBuf,
    },
}

impl Cli {
    fn dashboard_config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = DashboardConfig::load(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(users) = self.users {
            config.users = users;
        }
        if let Some(days) = self.days {
            config.days = days;
        }
        if let Some(view) = self.view {
            config.challenge_view = view;
        }
        if let Some(mode) = self.header_mode {
            config.header.mode = mode;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = cli.dashboard_config()?;

    match cli.command {
        Commands::Serve { addr } => {
            let app = server::router(server::AppState::new(config));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            info!("listening on http://{addr}");
            axum::serve(listener, app).await?;
        }
        Commands::Render { out } => {
            let data = DashboardData::generate(&config)?;
            let store = HeaderImageStore::new(config.header.upload_path.clone());
            let mut panel = AdminPanel::Hidden;
            let mut renderer = HtmlRenderer::new(FormInput::default());
            let result =
                page::render_dashboard(&config, &data, &mut renderer, &mut panel, &store);
            std::fs::write(&out, renderer.finish(panel))
                .with_context(|| format!("failed to write {}", out.display()))?;
            result?;
            println!("Dashboard written to {}.", out.display());
        }
        Commands::Export { dir } => {
            let data = DashboardData::generate(&config)?;
            let files = export::export_tables(&data, &dir)?;
            println!("Wrote {} tables to {}.", files.len(), dir.display());
        }
        Commands::Charts { out } => {
            let data = DashboardData::generate(&config)?;
            let mut specs = vec![data.signup_chart()];
            specs.extend(data.challenge_charts(config.challenge_view));
            let json = serde_json::to_string_pretty(&specs)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Chart specs written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::SetHeader { password, image } => {
            admin::authenticate(&password)?;
            let name = image.file_name().and_then(|name| name.to_str()).unwrap_or_default();
            if !admin::accepts_image_name(name) {
                anyhow::bail!(error::DashboardError::UploadRejected(format!(
                    "{} is not a png, jpg or jpeg file",
                    image.display()
                )));
            }
            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let store = HeaderImageStore::new(config.header.upload_path.clone());
            store.write(&bytes)?;
            println!("Header image written to {}.", store.path().display());
        }
    }

    Ok(())
}
