//! CLI entry point for bandsite

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bandsite")]
#[command(version)]
#[command(about = "Server-rendered website for a music act, backed by a headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (overrides PORT and bandsite.yml)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// List the page routes and the content each one fetches
    Routes,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "bandsite=debug,info"
    } else {
        "bandsite=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Server { port, ip } => {
            let site = bandsite::Site::new(&base_dir)?;
            let port = port.unwrap_or(site.config.port);
            let ip = ip.unwrap_or_else(|| site.config.ip.clone());

            tracing::info!(
                "Starting {} server at http://{}:{}",
                site.config.environment,
                ip,
                port
            );
            bandsite::server::start(site, &ip, port).await?;
        }

        Commands::Routes => {
            bandsite::commands::routes::run();
        }

        Commands::Version => {
            println!("bandsite version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
