// src/cli/menu.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::core::config::Config;
use crate::core::service::{SecurityService, ServiceError};
use crate::models::{Severity, TestFilter, User};
use crate::utils::{self, Spinner};

const MENU_USERS: &str = "👤  User Management";
const MENU_TESTING: &str = "🔑  Test Password Strength";
const MENU_GENERATION: &str = "🔐  Generate Secure Password";
const MENU_BREACHES: &str = "🚨  Breach Management";
const MENU_STATS: &str = "📊  View History & Stats";
const MENU_EXIT: &str = "❌  Exit";

pub async fn run(
    service: &SecurityService,
    config: &Config,
    should_exit: Arc<AtomicBool>,
) -> Result<()> {
    utils::print_welcome_banner();

    let mut current_user: Option<User> = None;

    while !should_exit.load(Ordering::SeqCst) {
        println!("\n{}", utils::separator());
        if let Some(user) = &current_user {
            println!("{}", utils::info(&format!("Logged in as: {}", user.username)));
        }

        let options = vec![
            MENU_USERS,
            MENU_TESTING,
            MENU_GENERATION,
            MENU_BREACHES,
            MENU_STATS,
            MENU_EXIT,
        ];

        // Run the blocking prompt off the runtime so the exit flag stays
        // responsive
        let selection = tokio::task::spawn_blocking(move || {
            Select::new("What would you like to do?", options)
                .with_help_message("Use arrow keys to navigate, Enter to select. Ctrl+C to exit.")
                .prompt_skippable()
        })
        .await?;

        if should_exit.load(Ordering::SeqCst) {
            break;
        }

        match selection {
            Ok(Some(MENU_USERS)) => user_menu(service, &mut current_user).await?,
            Ok(Some(MENU_TESTING)) => testing_menu(service, &current_user, config).await?,
            Ok(Some(MENU_GENERATION)) => generation_menu(service, &current_user, config).await?,
            Ok(Some(MENU_BREACHES)) => breach_menu(service, &current_user).await?,
            Ok(Some(MENU_STATS)) => stats_menu(service, &current_user).await?,
            Ok(Some(_)) | Ok(None) | Err(InquireError::OperationInterrupted) => {
                println!("{}", utils::success("Goodbye!"));
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

// ---- Submenus ----

async fn user_menu(service: &SecurityService, current_user: &mut Option<User>) -> Result<()> {
    loop {
        let options = vec![
            "Create New User",
            "Login as User",
            "List All Users",
            "Back to Main Menu",
        ];

        let Some(choice) = cancellable(Select::new("User Management", options).prompt())? else {
            return Ok(());
        };

        match choice {
            "Create New User" => create_user(service).await?,
            "Login as User" => login_user(service, current_user).await?,
            "List All Users" => list_users(service).await?,
            _ => return Ok(()),
        }
    }
}

async fn testing_menu(
    service: &SecurityService,
    current_user: &Option<User>,
    config: &Config,
) -> Result<()> {
    loop {
        let options = vec![
            "Test a Password",
            "View Test History",
            "Find Weak Passwords",
            "Back to Main Menu",
        ];

        let Some(choice) = cancellable(Select::new("Password Testing", options).prompt())? else {
            return Ok(());
        };

        match choice {
            "Test a Password" => test_password(service, current_user).await?,
            "View Test History" => view_test_history(service, current_user).await?,
            "Find Weak Passwords" => find_weak_passwords(service, config).await?,
            _ => return Ok(()),
        }
    }
}

async fn generation_menu(
    service: &SecurityService,
    current_user: &Option<User>,
    config: &Config,
) -> Result<()> {
    loop {
        let options = vec![
            "Generate Single Password",
            "Generate Multiple Options",
            "View Generation History",
            "Back to Main Menu",
        ];

        let Some(choice) = cancellable(Select::new("Password Generation", options).prompt())?
        else {
            return Ok(());
        };

        match choice {
            "Generate Single Password" => generate_password(service, current_user, config).await?,
            "Generate Multiple Options" => generate_multiple(service, current_user, config).await?,
            "View Generation History" => view_generation_history(service, current_user).await?,
            _ => return Ok(()),
        }
    }
}

async fn breach_menu(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    loop {
        let options = vec![
            "Report New Breach",
            "View My Breaches",
            "Associate Password with Breach",
            "Back to Main Menu",
        ];

        let Some(choice) = cancellable(Select::new("Breach Management", options).prompt())? else {
            return Ok(());
        };

        match choice {
            "Report New Breach" => report_breach(service, current_user).await?,
            "View My Breaches" => view_user_breaches(service, current_user).await?,
            "Associate Password with Breach" => {
                associate_password_with_breach(service, current_user).await?
            }
            _ => return Ok(()),
        }
    }
}

async fn stats_menu(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    loop {
        let options = vec![
            "My Statistics",
            "Test History",
            "Generation History",
            "System Overview",
            "Back to Main Menu",
        ];

        let Some(choice) = cancellable(Select::new("History & Stats", options).prompt())? else {
            return Ok(());
        };

        match choice {
            "My Statistics" => view_user_stats(service, current_user).await?,
            "Test History" => view_test_history(service, current_user).await?,
            "Generation History" => view_generation_history(service, current_user).await?,
            "System Overview" => view_system_overview(service).await?,
            _ => return Ok(()),
        }
    }
}

// ---- User management ----

async fn create_user(service: &SecurityService) -> Result<()> {
    let Some(username) = prompt_text("Enter username:")? else {
        return Ok(());
    };
    let Some(password) = prompt_password("Enter password:")? else {
        return Ok(());
    };

    let spinner = Spinner::start("Creating user");
    let result = service.create_user(&username, &password).await;
    spinner.stop();

    match result {
        Ok(user) => println!(
            "{}",
            utils::success(&format!("User created successfully: {}", user.username))
        ),
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn login_user(service: &SecurityService, current_user: &mut Option<User>) -> Result<()> {
    let Some(username) = prompt_text("Enter username:")? else {
        return Ok(());
    };
    let Some(password) = prompt_password("Enter password:")? else {
        return Ok(());
    };

    match service.authenticate(&username, &password).await {
        Ok(Some(user)) => {
            println!(
                "{}",
                utils::success(&format!("Logged in as {}", user.username))
            );
            *current_user = Some(user);
        }
        Ok(None) => println!("{}", utils::error("Invalid username or password")),
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn list_users(service: &SecurityService) -> Result<()> {
    match service.list_users().await {
        Ok(users) if users.is_empty() => println!("{}", utils::warning("No users found")),
        Ok(users) => {
            println!("\n{}", utils::info("All Users:"));
            for user in users {
                println!(
                    "{} - Tests: {}, Generated: {}, Breaches: {}",
                    user.username,
                    user.tests_performed,
                    user.passwords_generated,
                    user.breach_count
                );
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

// ---- Password testing ----

async fn test_password(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };
    let Some(password) = prompt_password("Enter password to test:")? else {
        return Ok(());
    };

    let spinner = Spinner::start("Analyzing password");
    let result = service.test_password(&user.username, &password).await;
    spinner.stop();

    match result {
        Ok(outcome) => {
            utils::print_analysis(&outcome.analysis);
            if !outcome.suggestions.is_empty() {
                println!("Suggestions: {}", outcome.suggestions.join(", "));
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn view_test_history(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    match service.test_history(&user.username, TestFilter::All).await {
        Ok(tests) if tests.is_empty() => {
            println!("{}", utils::warning("No test history found"));
        }
        Ok(tests) => {
            println!("\n{}", utils::info("Test History:"));
            for test in tests {
                println!(
                    "Test ID {} - {} - Breaches: {} ({})",
                    test.id,
                    utils::strength_style(test.score)
                        .apply_to(format!("{}/100 {}", test.score, test.strength_category())),
                    test.breach_count,
                    utils::format_time_ago(test.created_at)
                );
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn find_weak_passwords(service: &SecurityService, config: &Config) -> Result<()> {
    let Some(threshold) = prompt_number("Weakness threshold:", config.weak_score_threshold)?
    else {
        return Ok(());
    };

    match service.weak_tests(threshold).await {
        Ok(tests) if tests.is_empty() => {
            println!(
                "{}",
                utils::success(&format!("No passwords found below threshold {}", threshold))
            );
        }
        Ok(tests) => {
            println!(
                "\n{}",
                utils::error(&format!("Weak Passwords (< {}):", threshold))
            );
            for test in tests {
                println!(
                    "User {} - {} - Test ID: {}",
                    test.user_id,
                    utils::error(&format!("{}/100 {}", test.score, test.strength_category())),
                    test.id
                );
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

// ---- Password generation ----

async fn generate_password(
    service: &SecurityService,
    current_user: &Option<User>,
    config: &Config,
) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    let Some(length) = prompt_number("Password length:", config.default_password_length)? else {
        return Ok(());
    };
    let Some(use_uppercase) = prompt_confirm("Include uppercase letters?")? else {
        return Ok(());
    };
    let Some(use_digits) = prompt_confirm("Include numbers?")? else {
        return Ok(());
    };
    let Some(use_symbols) = prompt_confirm("Include symbols?")? else {
        return Ok(());
    };

    let options = crate::generators::GenerationOptions {
        length,
        use_uppercase,
        use_digits,
        use_symbols,
    };

    let spinner = Spinner::start("Generating secure password");
    let result = service.generate_password(&user.username, &options).await;
    spinner.stop();

    match result {
        Ok(outcome) => {
            let score = i64::from(outcome.analysis.score);
            println!();
            println!(
                "{}",
                utils::success(&format!("Generated: {}", outcome.password))
            );
            println!(
                "Strength: {}",
                utils::strength_style(score).apply_to(format!(
                    "{} ({}/100)",
                    outcome.analysis.strength, outcome.analysis.score
                ))
            );
            println!("Meter: {}", utils::strength_meter(score));
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn generate_multiple(
    service: &SecurityService,
    current_user: &Option<User>,
    config: &Config,
) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    let Some(count) = prompt_number("How many passwords?", 5usize)? else {
        return Ok(());
    };
    let Some(length) = prompt_number("Password length:", config.default_password_length)? else {
        return Ok(());
    };

    let spinner = Spinner::start("Generating secure passwords");
    let result = service.generate_multiple(&user.username, count, length).await;
    spinner.stop();

    match result {
        Ok(outcomes) => {
            println!(
                "\n{}",
                utils::success(&format!("Generated {} Options:", outcomes.len()))
            );
            for (index, outcome) in outcomes.iter().enumerate() {
                let score = i64::from(outcome.analysis.score);
                println!(
                    "{}. {} - {}",
                    index + 1,
                    outcome.password,
                    utils::strength_style(score).apply_to(format!(
                        "{} ({}/100)",
                        outcome.analysis.strength, outcome.analysis.score
                    ))
                );
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn view_generation_history(
    service: &SecurityService,
    current_user: &Option<User>,
) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    match service
        .test_history(&user.username, TestFilter::GeneratedOnly)
        .await
    {
        Ok(tests) if tests.is_empty() => {
            println!("{}", utils::warning("No generation history found"));
        }
        Ok(tests) => {
            println!("\n{}", utils::info("Generation History:"));
            for test in tests {
                println!(
                    "Test ID {} - Score: {} ({})",
                    test.id,
                    utils::strength_style(test.score)
                        .apply_to(format!("{}/100 {}", test.score, test.strength_category())),
                    utils::format_time_ago(test.created_at)
                );
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

// ---- Breach management ----

async fn report_breach(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };
    let Some(breach_name) = prompt_text("Enter breach name:")? else {
        return Ok(());
    };

    println!("{}", utils::info("Severity levels: Low, High"));
    let Some(severity_input) =
        cancellable(Text::new("Enter severity:").with_default("Low").prompt())?
    else {
        return Ok(());
    };
    let severity = Severity::from_input(&severity_input);

    let spinner = Spinner::start("Creating breach record");
    let result = service
        .report_breach(&user.username, &breach_name, severity)
        .await;
    spinner.stop();

    match result {
        Ok(breach) => println!(
            "{}",
            utils::success(&format!(
                "Breach '{}' created successfully",
                breach.breach_name
            ))
        ),
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn view_user_breaches(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    match service.user_breaches(&user.username).await {
        Ok(breaches) if breaches.is_empty() => {
            println!("{}", utils::warning("No breaches found"));
        }
        Ok(breaches) => {
            println!("\n{}", utils::error("Security Breaches:"));
            for breach in breaches {
                let severity = match breach.severity {
                    Severity::High => utils::error(breach.severity.as_str()),
                    Severity::Low => utils::warning(breach.severity.as_str()),
                };
                println!(
                    "{} - {} - Affected: {} ({})",
                    breach.breach_name,
                    severity,
                    breach.affected_count,
                    utils::format_time_ago(breach.created_at)
                );
            }
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn associate_password_with_breach(
    service: &SecurityService,
    current_user: &Option<User>,
) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    let breaches = match service.user_breaches(&user.username).await {
        Ok(breaches) => breaches,
        Err(e) => {
            report_error(&e);
            return Ok(());
        }
    };
    let tests = match service.test_history(&user.username, TestFilter::All).await {
        Ok(tests) => tests,
        Err(e) => {
            report_error(&e);
            return Ok(());
        }
    };

    if breaches.is_empty() || tests.is_empty() {
        println!(
            "{}",
            utils::warning("Need both breaches and password tests to associate")
        );
        return Ok(());
    }

    let breach_options: Vec<String> = breaches
        .iter()
        .map(|breach| format!("{} ({})", breach.breach_name, breach.severity))
        .collect();
    let Some(breach_index) = prompt_select("Select breach:", breach_options)? else {
        return Ok(());
    };

    // Keep the pick list short; recent tests come last in history order
    let shown: Vec<_> = tests.iter().take(10).collect();
    let test_options: Vec<String> = shown
        .iter()
        .map(|test| {
            let kind = if test.is_generated { "Generated" } else { "Tested" };
            format!("{} - {}/100 (ID: {})", kind, test.score, test.id)
        })
        .collect();
    let Some(test_index) = prompt_select("Select password test:", test_options)? else {
        return Ok(());
    };

    let breach = &breaches[breach_index];
    let test = shown[test_index];

    let spinner = Spinner::start("Associating password with breach");
    let result = service.associate_test_with_breach(breach.id, test.id).await;
    spinner.stop();

    match result {
        Ok(()) => println!(
            "{}",
            utils::success(&format!("Associated with breach '{}'", breach.breach_name))
        ),
        Err(e) => report_error(&e),
    }
    Ok(())
}

// ---- Statistics ----

async fn view_user_stats(service: &SecurityService, current_user: &Option<User>) -> Result<()> {
    let Some(user) = require_login(current_user) else {
        return Ok(());
    };

    match service.user_stats(&user.username).await {
        Ok(stats) => {
            let avg = stats.average_score.round() as i64;
            println!(
                "\n{}",
                utils::info(&format!("Statistics for {}:", stats.username))
            );
            println!(
                "Tests: {} | Generated: {} | Strong: {}",
                stats.tests_performed, stats.passwords_generated, stats.strong_passwords
            );
            println!(
                "Average Score: {} | Breaches: {}",
                utils::strength_style(avg).apply_to(format!("{:.2}/100", stats.average_score)),
                stats.breach_count
            );
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

async fn view_system_overview(service: &SecurityService) -> Result<()> {
    match service.system_overview().await {
        Ok(overview) => {
            println!("\n{}", utils::info("System Overview:"));
            println!(
                "Users: {} | Tests: {} | Generated: {}",
                overview.total_users, overview.total_tests, overview.total_generated
            );
            println!(
                "Weak Tests: {} | Breaches: {}",
                utils::error(&overview.weak_tests.to_string()),
                utils::error(&overview.total_breaches.to_string())
            );
        }
        Err(e) => report_error(&e),
    }
    Ok(())
}

// ---- Prompt helpers ----

fn require_login(current_user: &Option<User>) -> Option<&User> {
    let user = current_user.as_ref();
    if user.is_none() {
        println!("{}", utils::error("Please login first"));
    }
    user
}

fn report_error(err: &ServiceError) {
    println!("{}", utils::error(&format!("Error: {}", err)));
}

// Esc and Ctrl+C inside a prompt abandon the current action; the main menu
// handles its own interrupt and exits
fn cancellable<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Blank input abandons the action as well
fn prompt_text(message: &str) -> Result<Option<String>> {
    let value = cancellable(Text::new(message).prompt())?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn prompt_password(message: &str) -> Result<Option<String>> {
    let value = cancellable(
        Password::new(message)
            .with_display_mode(PasswordDisplayMode::Hidden)
            .without_confirmation()
            .prompt(),
    )?;
    Ok(value.filter(|v| !v.is_empty()))
}

fn prompt_confirm(message: &str) -> Result<Option<bool>> {
    cancellable(Confirm::new(message).with_default(true).prompt())
}

fn prompt_number<T>(message: &str, default: T) -> Result<Option<T>>
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = cancellable(
        Text::new(message)
            .with_default(&default.to_string())
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    match raw.trim().parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            println!("{}", utils::error("Please enter a valid number"));
            Ok(None)
        }
    }
}

fn prompt_select(message: &str, options: Vec<String>) -> Result<Option<usize>> {
    match Select::new(message, options).raw_prompt() {
        Ok(choice) => Ok(Some(choice.index)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
