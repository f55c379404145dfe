//! CLI administration tool for the URL shortener storage.
//!
//! Runs storage operations directly against whichever backend the
//! environment selects, without going through the HTTP layer.
//!
//! # Usage
//!
//! ```bash
//! # Check that the backend is reachable
//! cargo run --bin admin -- ping
//!
//! # Shorten a URL on behalf of a user
//! cargo run --bin admin -- shorten https://example.com/ --user 5f0c...
//!
//! # Resolve a short code or reference
//! cargo run --bin admin -- lookup 42
//!
//! # List a user's live URLs
//! cargo run --bin admin -- list --user 5f0c...
//!
//! # Tombstone URLs owned by a user
//! cargo run --bin admin -- delete --user 5f0c... 1 2 3
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_DSN` / `DATABASE_URL`: PostgreSQL backend
//! - `FILE_STORAGE_PATH`: JSON snapshot backend (when no DSN is set)
//! - `BASE_URL`: prefix of printed short references
//!
//! With neither storage variable set the memory backend is used, which only
//! lives for the duration of the command.

use url_shortener_core::config::{self, Config};
use url_shortener_core::domain::delete_request::DeleteRequest;
use url_shortener_core::domain::delete_worker::DeletePipeline;
use url_shortener_core::domain::repositories::{
    AddOutcome, ListOutcome, SearchOutcome, UrlRepository,
};
use url_shortener_core::runtime::{build_repository, init_tracing};
use url_shortener_core::utils::short_url::parse_short_code;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing URL shortener storage.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Storage commands.
#[derive(Subcommand)]
enum Commands {
    /// Check backend connectivity
    Ping,

    /// Shorten a URL
    Shorten {
        /// URL to shorten
        url: String,

        /// Owner user ID
        #[arg(short, long)]
        user: String,
    },

    /// Resolve a short code or short reference
    Lookup {
        /// Numeric code or full short reference
        code: String,
    },

    /// List live URLs owned by a user
    List {
        /// Owner user ID
        #[arg(short, long)]
        user: String,
    },

    /// Tombstone URLs owned by a user
    Delete {
        /// Owner user ID
        #[arg(short, long)]
        user: String,

        /// Short codes to delete
        #[arg(required = true)]
        codes: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    init_tracing(&config);

    let repository = build_repository(&config).await?;

    match cli.command {
        Commands::Ping => handle_ping(repository.as_ref()).await?,
        Commands::Shorten { url, user } => handle_shorten(repository.as_ref(), &url, &user).await?,
        Commands::Lookup { code } => handle_lookup(repository.as_ref(), &code).await?,
        Commands::List { user } => handle_list(repository.as_ref(), &user).await?,
        Commands::Delete { user, codes, yes } => {
            handle_delete(repository, &config, user, codes, yes).await?
        }
    }

    Ok(())
}

/// Accepts either a bare code (`42`) or a full reference (`http://host/42`).
fn parse_code(input: &str) -> Result<i64> {
    parse_short_code(input).with_context(|| format!("'{input}' is not a short code"))
}

/// Checks that the selected backend is reachable.
async fn handle_ping(repository: &dyn UrlRepository) -> Result<()> {
    println!("{}", "🔍 Checking storage...".bright_blue().bold());

    match repository.ping().await {
        Ok(()) => {
            println!("{}", "✅ Storage is reachable".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}", "❌ Storage is not reachable".red().bold());
            Err(anyhow::anyhow!("Ping failed: {}", e))
        }
    }
}

/// Shortens `url` for `user` and prints the reference.
async fn handle_shorten(repository: &dyn UrlRepository, url: &str, user: &str) -> Result<()> {
    let outcome = repository
        .add_url(url, user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    match &outcome {
        AddOutcome::Created(reference) => {
            println!("{}", "✅ Short URL created".green().bold());
            println!("  {}", reference.bright_yellow().bold());
        }
        AddOutcome::Conflict(reference) => {
            println!("{}", "⚠️  URL was already shortened".yellow());
            println!("  {}", reference.bright_yellow().bold());
        }
    }

    Ok(())
}

/// Resolves a short code and prints its state.
async fn handle_lookup(repository: &dyn UrlRepository, input: &str) -> Result<()> {
    let code = parse_code(input)?;

    let outcome = repository
        .search_url(code)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    match outcome {
        SearchOutcome::Found(url) => {
            println!("  {} {}", code.to_string().bright_black(), url.cyan());
            println!("  Status: {}", "LIVE".green());
        }
        SearchOutcome::Gone(url) => {
            println!("  {} {}", code.to_string().bright_black(), url.cyan());
            println!("  Status: {}", "DELETED".red());
        }
        SearchOutcome::NotFound => {
            println!("{}", format!("  No URL with code {code}").yellow());
        }
    }

    Ok(())
}

/// Lists the user's live URLs.
///
/// # Output Format
///
/// ```text
/// 📋 URLs for 5f0c...
///
///   Short URL                           Original URL
///   ──────────────────────────────────────────────────────────────
///   http://localhost:8080/1             https://example.com/
/// ```
async fn handle_list(repository: &dyn UrlRepository, user: &str) -> Result<()> {
    println!("{} {}", "📋 URLs for".bright_blue().bold(), user.cyan());
    println!();

    let urls = match repository
        .get_all_urls_for_user(user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list URLs: {}", e))?
    {
        ListOutcome::Found(urls) => urls,
        ListOutcome::NoContent => {
            println!("{}", "  No URLs found".yellow());
            return Ok(());
        }
    };

    println!(
        "  {:<35} {}",
        "Short URL".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for url in &urls {
        println!("  {:<35} {}", url.short_url.bright_yellow(), url.original_url.cyan());
    }

    println!();
    println!("  Total: {}", urls.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Queues the codes for deletion and waits for the worker to apply them.
///
/// # Safety
///
/// - Requires confirmation (default: No) unless `--yes`
/// - Codes not owned by `user` are skipped by the backend
async fn handle_delete(
    repository: Arc<dyn UrlRepository>,
    config: &Config,
    user: String,
    codes: Vec<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑️  Delete URLs".bright_blue().bold());
    println!();

    let codes = codes
        .iter()
        .map(|c| parse_code(c))
        .collect::<Result<Vec<_>>>()?;

    println!("  User:  {}", user.cyan());
    println!(
        "  Codes: {}",
        codes
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
            .bright_black()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these URLs?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let pipeline = DeletePipeline::spawn(
        repository,
        config.delete_queue_capacity,
        config.delete_batch_size,
    );

    pipeline
        .queue()
        .enqueue(DeleteRequest::new(user, codes))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to queue delete: {}", e))?;

    pipeline
        .shutdown()
        .await
        .context("Delete worker terminated abnormally")?;

    println!("{}", "✅ Delete request applied".green().bold());
    println!();

    Ok(())
}
