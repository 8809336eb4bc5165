//! CLI administration tool for link-shortener.
//!
//! Provides commands for managing users and plans, issuing session tokens,
//! viewing statistics, and performing database operations without requiring
//! HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # List users
//! cargo run --bin admin -- user list --limit 20
//!
//! # Move a user to another plan
//! cargo run --bin admin -- user plan ann@example.com PRO
//!
//! # Issue a session token for local testing
//! cargo run --bin admin -- session issue ann@example.com
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `SESSION_SECRET` (required for `session issue`): token signing key
//!
//! # Features
//!
//! - **User Management**: List users and change their plan
//! - **Sessions**: Run the sign-in flow for an existing user and print the token
//! - **Statistics**: Users, links and clicks
//! - **Database Tools**: Connection checks and info queries
//! - **Interactive Prompts**: Confirmation dialogs for plan changes
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use link_shortener::application::services::AuthService;
use link_shortener::config::{self, Config};
use link_shortener::domain::plan::PlanType;
use link_shortener::domain::repositories::UserRepository;
use link_shortener::domain::session::OAuthProfile;
use link_shortener::infrastructure::persistence::PgUserRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Issue session tokens
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// List users, newest first
    List {
        /// Maximum number of users to show
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },

    /// Change a user's plan
    Plan {
        /// User email
        email: String,

        /// FREE, PRO, BUSINESS or ENTERPRISE
        plan: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Session subcommands.
#[derive(Subcommand)]
enum SessionAction {
    /// Sign in as an existing user and print the session token
    Issue {
        /// User email
        email: String,

        /// Display name to store on sign-in (defaults to the current one)
        #[arg(short, long)]
        name: Option<String>,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Session { action } => handle_session_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn user_repository(pool: &PgPool) -> Arc<PgUserRepository> {
    Arc::new(PgUserRepository::new(Arc::new(pool.clone())))
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = user_repository(pool);

    match action {
        UserAction::List { limit } => list_users(repo, limit).await?,
        UserAction::Plan { email, plan, yes } => change_plan(repo, email, plan, yes).await?,
    }

    Ok(())
}

/// Lists users with their plan.
///
/// # Output Format
///
/// ```text
/// 👥 Users
///
///   Email                          Plan        Created
///   ──────────────────────────────────────────────────────────
///   ann@example.com                PRO         2026-01-15 10:30
/// ```
async fn list_users(repo: Arc<PgUserRepository>, limit: i64) -> Result<()> {
    println!("{}", "👥 Users".bright_blue().bold());
    println!();

    let users = repo
        .list(limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<30} {:<11} {:<20}",
        "Email".bright_white().bold(),
        "Plan".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(62).bright_black());

    for user in &users {
        let plan = match user.plan {
            PlanType::Free => user.plan.as_str().normal(),
            _ => user.plan.as_str().green(),
        };

        println!(
            "  {:<30} {:<11} {}",
            user.email.cyan(),
            plan,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Moves a user to another plan after confirmation.
async fn change_plan(
    repo: Arc<PgUserRepository>,
    email: String,
    plan: String,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "💳 Change Plan".bright_blue().bold());
    println!();

    let plan: PlanType = plan.parse()?;

    let user = repo
        .find_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    if user.plan == plan {
        println!("{}", format!("⚠️  {} is already on {}", email, plan).yellow());
        return Ok(());
    }

    let limits = plan.limits();
    println!("  User:  {}", user.email.cyan());
    println!("  Plan:  {} → {}", user.plan.as_str().bright_black(), plan.as_str().green());
    println!(
        "  Links: {}",
        limits
            .max_links
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Apply this plan?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.set_plan(user.id, plan)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to change plan: {}", e))?;

    println!();
    println!("{}", "✅ Plan updated".green().bold());
    println!(
        "{}",
        "   Existing sessions keep the old plan until the user signs in again.".bright_black()
    );
    println!();

    Ok(())
}

/// Dispatches session commands.
async fn handle_session_action(action: SessionAction, pool: &PgPool) -> Result<()> {
    match action {
        SessionAction::Issue { email, name } => issue_session(pool, email, name).await,
    }
}

/// Signs in as an existing user and prints the token.
///
/// # Flow
///
/// 1. Load and validate the service configuration (session secret, defaults)
/// 2. Look up the user by email
/// 3. Run [`AuthService::sign_in`] with an `admin` provider profile
/// 4. Print the token with usage instructions
async fn issue_session(pool: &PgPool, email: String, name: Option<String>) -> Result<()> {
    println!("{}", "🔑 Issue Session".bright_blue().bold());
    println!();

    let config = config::load_from_env()?;
    let repo = user_repository(pool);

    let user = repo
        .find_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    let profile = OAuthProfile {
        provider: "admin".to_string(),
        email: user.email.clone(),
        name: name.or(user.name),
        image: user.image,
    };

    let auth = AuthService::new(repo, config.session_settings());
    let signed_in = auth
        .sign_in(&profile)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to sign in: {}", e))?;

    println!("  User:    {}", signed_in.user.email.cyan());
    println!("  Plan:    {}", signed_in.user.plan.as_str().green());
    println!("  Expires: {} days", config.session_max_age_days);
    println!("  Token:   {}", signed_in.token.bright_yellow().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        signed_in.token.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/links",
        signed_in.token.bright_yellow()
    );
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of users, and users per plan
/// - Total number of links and active links
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let active_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE is_active")
            .fetch_one(pool)
            .await?;

    let clicks_count: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM links")
            .fetch_one(pool)
            .await?;

    let by_plan: Vec<(String, i64)> =
        sqlx::query_as("SELECT plan, COUNT(*) FROM users GROUP BY plan ORDER BY plan")
            .fetch_all(pool)
            .await?;

    println!(
        "  Users:         {}",
        users_count.to_string().bright_green().bold()
    );
    for (plan, count) in &by_plan {
        println!("    {:<12} {}", plan.bright_black(), count);
    }
    println!(
        "  Links:         {} ({} active)",
        links_count.to_string().bright_green().bold(),
        active_count
    );
    println!(
        "  Clicks:        {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
