//! # Command Line Interface
//!
//! `authgate` runs the HTTP service by default and carries the operator tasks
//! the endpoints deliberately lack: adding users, purging dead tokens and
//! applying migrations.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::api::{start_api_server, ApiState};
use crate::auth::{CreateUserRequest, TokenService, UserService};
use crate::config::AppConfig;
use crate::observability::{init_logging, init_observability, log_config_info};
use crate::storage::{create_pool, run_migrations};
use crate::{APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "authgate")]
#[command(about = "Password login and bearer token logout service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database URL override
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// User directory commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Access token maintenance
    Tokens {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Database management commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user with an Argon2id password hash
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Delete revoked and expired access tokens
    Purge,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Apply pending migrations
    Migrate,
}

/// Parse arguments, load configuration and run the selected command
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
        config.validate().context("invalid database URL")?;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::User { command: UserCommands::Create { email, name, password } } => {
            init_logging(&config.observability)?;
            create_user(&config, CreateUserRequest { email, name, password }).await
        }
        Commands::Tokens { command: TokenCommands::Purge } => {
            init_logging(&config.observability)?;
            purge_tokens(&config).await
        }
        Commands::Db { command: DbCommands::Migrate } => {
            init_logging(&config.observability)?;
            migrate(&config).await
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    init_observability(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting authgate");
    log_config_info(&config);

    if config.auth.uses_development_secret() {
        warn!("AUTHGATE_JWT_SECRET is unset; tokens are signed with the development secret");
    }

    let pool = create_pool(&config.database).await?;
    let state = ApiState::with_sqlx(pool, &config.auth)?;
    start_api_server(&config.server, state).await?;
    Ok(())
}

async fn create_user(config: &AppConfig, request: CreateUserRequest) -> anyhow::Result<()> {
    let pool = create_pool(&config.database).await?;
    let user = UserService::with_sqlx(pool, &config.auth)?
        .create_user(&request)
        .await
        .with_context(|| format!("failed to create user {}", request.email))?;

    println!("Created user {} <{}> ({})", user.name, user.email, user.id);
    Ok(())
}

async fn purge_tokens(config: &AppConfig) -> anyhow::Result<()> {
    let pool = create_pool(&config.database).await?;
    let removed = TokenService::with_sqlx(pool, &config.auth).purge().await?;

    println!("Purged {removed} revoked or expired access tokens");
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let database = crate::config::DatabaseConfig { auto_migrate: false, ..config.database.clone() };
    let pool = create_pool(&database).await?;

    println!("Running database migrations...");
    run_migrations(&pool).await?;
    println!("Migrations completed successfully!");
    Ok(())
}
