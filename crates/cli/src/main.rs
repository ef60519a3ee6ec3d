//! Project Tracker CLI - manage Line accounts, dealers and the API token.
//!
//! # Usage
//!
//! ```bash
//! # Store the bearer token used by the HTTP backend
//! pt-cli token set eyJhbGciOi...
//!
//! # List Line accounts
//! pt-cli lines list
//!
//! # Register a Line account
//! pt-cli lines create --name "Line 官方帳號" --line-id @example
//!
//! # Deactivate a dealer
//! pt-cli dealers update 2 --status inactive
//! ```
//!
//! # Commands
//!
//! - `lines` - CRUD over Line official accounts
//! - `dealers` - CRUD over dealers
//! - `token` - Manage the persisted bearer token
//!
//! Configuration is read from the same environment variables as the admin
//! server (`TRACKER_BACKEND`, `TRACKER_API_BASE_URL`, `TRACKER_TOKEN_FILE`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use project_tracker_admin::{AdminConfig, services::Services};
use project_tracker_core::{CreateDealerDto, EntityStatus, UpdateDealerDto};

mod commands;

#[derive(Parser)]
#[command(name = "pt-cli")]
#[command(author, version, about = "Project Tracker CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage Line official accounts
    Lines {
        #[command(subcommand)]
        action: LineAction,
    },
    /// Manage dealers
    Dealers {
        #[command(subcommand)]
        action: DealerAction,
    },
    /// Manage the persisted API token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum LineAction {
    /// List all Line accounts
    List,
    /// Show one Line account
    Get { id: String },
    /// Register a Line account
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Public Line ID (e.g. `@example`)
        #[arg(short, long)]
        line_id: String,
    },
    /// Change fields of a Line account
    Update {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        line_id: Option<String>,

        /// `active` or `inactive`
        #[arg(short, long)]
        status: Option<EntityStatus>,
    },
    /// Remove a Line account
    Delete { id: String },
}

#[derive(Subcommand)]
enum DealerAction {
    /// List all dealers
    List,
    /// Show one dealer
    Get { id: String },
    /// Register a dealer
    Create {
        #[arg(short, long)]
        name: String,

        /// Dealer code (e.g. `DEALER_A`)
        #[arg(short, long)]
        code: String,

        /// Contact person
        #[arg(long)]
        contact: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        phone: String,
    },
    /// Change fields of a dealer
    Update {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        code: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,

        /// `active` or `inactive`
        #[arg(short, long)]
        status: Option<EntityStatus>,
    },
    /// Remove a dealer
    Delete { id: String },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a bearer token
    Set { token: String },
    /// Forget the stored token
    Clear,
    /// Show whether a token is stored
    Show,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;

    match cli.command {
        Commands::Lines { action } => {
            let service = Services::from_config(&config)?.lines;
            match action {
                LineAction::List => commands::lines::list(service.as_ref()).await?,
                LineAction::Get { id } => commands::lines::get(service.as_ref(), &id).await?,
                LineAction::Create { name, line_id } => {
                    commands::lines::create(service.as_ref(), name, line_id).await?;
                }
                LineAction::Update {
                    id,
                    name,
                    line_id,
                    status,
                } => {
                    commands::lines::update(service.as_ref(), &id, name, line_id, status).await?;
                }
                LineAction::Delete { id } => commands::lines::delete(service.as_ref(), &id).await?,
            }
        }
        Commands::Dealers { action } => {
            let service = Services::from_config(&config)?.dealers;
            match action {
                DealerAction::List => commands::dealers::list(service.as_ref()).await?,
                DealerAction::Get { id } => commands::dealers::get(service.as_ref(), &id).await?,
                DealerAction::Create {
                    name,
                    code,
                    contact,
                    email,
                    phone,
                } => {
                    let input = CreateDealerDto {
                        name,
                        code,
                        contact,
                        email,
                        phone,
                    };
                    commands::dealers::create(service.as_ref(), input).await?;
                }
                DealerAction::Update {
                    id,
                    name,
                    code,
                    contact,
                    email,
                    phone,
                    status,
                } => {
                    let input = UpdateDealerDto {
                        id: id.into(),
                        name,
                        code,
                        contact,
                        email,
                        phone,
                        status,
                    };
                    commands::dealers::update(service.as_ref(), input).await?;
                }
                DealerAction::Delete { id } => {
                    commands::dealers::delete(service.as_ref(), &id).await?;
                }
            }
        }
        Commands::Token { action } => {
            let store = commands::token::store(&config);
            match action {
                TokenAction::Set { token } => commands::token::set(store.as_ref(), token).await?,
                TokenAction::Clear => commands::token::clear(store.as_ref()).await?,
                TokenAction::Show => commands::token::show(store.as_ref()).await,
            }
        }
    }
    Ok(())
}
