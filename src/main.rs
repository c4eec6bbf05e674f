use std::fs;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use rand::RngCore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use manyfold::config::ServerConfig;
use manyfold::notify::LogObserver;
use manyfold::server::{AppState, create_router};
use manyfold::service::MembershipService;
use manyfold::store::{MembershipStore, SqliteStore};

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "manyfold")]
#[command(about = "A folder-membership server for media libraries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to (default 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default 8080)
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and API token (default ./data)
        #[arg(long)]
        data_dir: Option<String>,

        /// Optional TOML config file; flags take precedence over its
        /// contents when both are given.
        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and API token)
    Init {
        /// Data directory for the database and API token
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("manyfold.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let token_file = data_path.join(".api_token");

    if token_file.exists() {
        bail!(
            "Server already initialized. API token exists at: {}",
            token_file.display()
        );
    }

    let token = generate_token();
    fs::write(&token_file, &token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("API token (save this):");
    println!();
    println!("  {token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let token_file = config.token_path();
    if !token_file.exists() {
        bail!(
            "Server not initialized. Run 'manyfold admin init' first to create the database and API token."
        );
    }
    let api_token = fs::read_to_string(&token_file)?.trim().to_string();

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let service = Arc::new(MembershipService::new(Arc::new(store)));
    service.subscribe(Arc::new(LogObserver));

    let state = Arc::new(AppState::new(service, api_token));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("manyfold=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => {
                run_init(data_dir)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            config,
        } => {
            let mut server_config = match config {
                Some(path) => ServerConfig::from_file(path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(data_dir) = data_dir {
                server_config.data_dir = data_dir.into();
            }

            run_serve(server_config).await?;
        }
    }

    Ok(())
}
