// src/cli/handlers.rs
use anyhow::Result;
use inquire::{Password, PasswordDisplayMode};

use crate::analyzer::StrengthAnalyzer;
use crate::core::service::SecurityService;
use crate::generators::{GenerationOptions, PasswordGenerator};
use crate::utils;

// Handlers for the one-shot CLI commands. `analyze` and `generate` run the
// engines directly and never touch the database; `stats` and `overview`
// read through the service.

pub fn handle_analyze() -> Result<()> {
    let password = Password::new("Enter password to analyze:")
        .with_display_mode(PasswordDisplayMode::Hidden)
        .without_confirmation()
        .prompt()?;

    let analyzer = StrengthAnalyzer::new();
    let analysis = analyzer.analyze(&password);
    let suggestions = analyzer.improvement_suggestions(&analysis);

    utils::print_analysis(&analysis);
    if !suggestions.is_empty() {
        println!("Suggestions: {}", suggestions.join(", "));
    }

    Ok(())
}

pub fn handle_generate(
    length: usize,
    count: usize,
    no_uppercase: bool,
    no_digits: bool,
    no_symbols: bool,
) -> Result<()> {
    if length == 0 {
        anyhow::bail!("Password length must be at least 1");
    }
    if count == 0 {
        anyhow::bail!("Count must be at least 1");
    }

    let options = GenerationOptions {
        length,
        use_uppercase: !no_uppercase,
        use_digits: !no_digits,
        use_symbols: !no_symbols,
    };

    let generator = PasswordGenerator::new();
    let analyzer = StrengthAnalyzer::new();

    for password in generator.generate_many(count, &options) {
        let analysis = analyzer.analyze(&password);
        let score = i64::from(analysis.score);
        println!(
            "{} - {}",
            password,
            utils::strength_style(score)
                .apply_to(format!("{} ({}/100)", analysis.strength, analysis.score))
        );
    }

    Ok(())
}

pub async fn handle_stats(service: &SecurityService, username: &str, json: bool) -> Result<()> {
    let stats = service.user_stats(username).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let avg = stats.average_score.round() as i64;
    println!("{}", utils::info(&format!("Statistics for {}:", stats.username)));
    println!(
        "Tests: {} | Generated: {} | Strong: {}",
        stats.tests_performed, stats.passwords_generated, stats.strong_passwords
    );
    println!(
        "Average Score: {} | Breaches: {}",
        utils::strength_style(avg).apply_to(format!("{:.2}/100", stats.average_score)),
        stats.breach_count
    );

    Ok(())
}

pub async fn handle_overview(service: &SecurityService, json: bool) -> Result<()> {
    let overview = service.system_overview().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("{}", utils::info("System Overview:"));
    println!(
        "Users: {} | Tests: {} | Generated: {}",
        overview.total_users, overview.total_tests, overview.total_generated
    );
    println!(
        "Weak Tests: {} | Breaches: {}",
        utils::error(&overview.weak_tests.to_string()),
        utils::error(&overview.total_breaches.to_string())
    );

    Ok(())
}
