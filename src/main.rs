use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use passguard::cli::{self, Args, CliCommand};
use passguard::core::config::Config;
use passguard::core::service::SecurityService;
use passguard::db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    if Path::new(".env").exists() {
        dotenvy::dotenv().ok();
    }

    let args = Args::parse();
    let config = Config::load();

    let log_level = args
        .log_level
        .as_deref()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(config.log_level);

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();

    log::info!("🔒 Starting PassGuard - Password Security & Generator");

    let db_url = args
        .db
        .clone()
        .unwrap_or_else(|| config.database_url.clone());

    match args.command {
        // The analyzer and generator engines need no database; run these
        // before opening one so they never create a db file
        Some(CliCommand::Analyze) => cli::handlers::handle_analyze(),
        Some(CliCommand::Generate {
            length,
            count,
            no_uppercase,
            no_digits,
            no_symbols,
        }) => cli::handlers::handle_generate(length, count, no_uppercase, no_digits, no_symbols),
        Some(CliCommand::Stats { username, json }) => {
            let service = init_service(&db_url, &config).await?;
            cli::handlers::handle_stats(&service, &username, json).await
        }
        Some(CliCommand::Overview { json }) => {
            let service = init_service(&db_url, &config).await?;
            cli::handlers::handle_overview(&service, json).await
        }
        None => {
            let service = init_service(&db_url, &config).await?;

            let should_exit = Arc::new(AtomicBool::new(false));
            {
                let should_exit = Arc::clone(&should_exit);
                ctrlc::set_handler(move || {
                    log::info!("🔴 Ctrl+C received. Initiating shutdown...");
                    should_exit.store(true, Ordering::SeqCst);
                    println!("\nGoodbye!");
                    std::process::exit(0);
                })?;
            }

            let result = cli::menu::run(&service, &config, should_exit).await;
            log::info!("✅ PassGuard shutdown complete.");
            result
        }
    }
}

async fn init_service(db_url: &str, config: &Config) -> Result<SecurityService> {
    let db = match Database::new(db_url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Database connection failed: {e}");
            eprintln!("Troubleshooting:");
            eprintln!("• Does the database path exist and is it writable?");
            eprintln!("• Use --db or set DATABASE_URL in `.env`");
            anyhow::bail!("could not open database at {db_url}");
        }
    };

    Ok(SecurityService::new(db).with_weak_threshold(config.weak_score_threshold))
}
