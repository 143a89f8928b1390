//! CLI entry point for hashpage

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "hashpage")]
#[command(version)]
#[command(about = "A headless hash-routed page shell with cached partials", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Boot the page headlessly and print the resulting markup
    #[command(alias = "r")]
    Render {
        /// Page URL of a served site (the fragment picks the first page)
        #[arg(short, long)]
        url: Option<Url>,

        /// Fragment to navigate to after startup (repeatable)
        #[arg(short, long = "visit")]
        visits: Vec<String>,
    },

    /// Serve the site directory
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List site information
    List {
        /// Type of content to list (posts, partials)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "hashpage=debug,info"
    } else {
        "hashpage=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            hashpage::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Render { url, visits } => {
            let site = hashpage::Site::new(&base_dir)?;
            let html = hashpage::commands::render::run(&site, url, &visits).await?;
            println!("{}", html);
        }

        Commands::Serve { port, ip, open } => {
            let site = hashpage::Site::new(&base_dir)?;
            let port = port.unwrap_or(site.config.server.port);
            let ip = ip.unwrap_or_else(|| site.config.server.ip.clone());

            tracing::info!("Starting server at http://{}:{}", ip, port);
            hashpage::server::start(&site, &ip, port, open).await?;
        }

        Commands::List { r#type } => {
            let site = hashpage::Site::new(&base_dir)?;
            hashpage::commands::list::run(&site, &r#type).await?;
        }

        Commands::Version => {
            println!("hashpage version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
