// src/utils/format.rs
use chrono::{DateTime, Utc};
use console::{style, Style};

use crate::analyzer::AnalysisResult;

// Format a duration for display
pub fn format_time_ago(time: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(time);

    let seconds = duration.num_seconds();

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", duration.num_minutes())
    } else if seconds < 86400 {
        format!("{} hours ago", duration.num_hours())
    } else if seconds < 2592000 {
        format!("{} days ago", duration.num_days())
    } else if seconds < 31536000 {
        format!("{} months ago", duration.num_days() / 30)
    } else {
        format!("{} years ago", duration.num_days() / 365)
    }
}

pub fn success(text: &str) -> String {
    style(text).green().to_string()
}

pub fn error(text: &str) -> String {
    style(text).red().to_string()
}

pub fn warning(text: &str) -> String {
    style(text).yellow().to_string()
}

pub fn info(text: &str) -> String {
    style(text).cyan().to_string()
}

pub fn separator() -> String {
    style("=".repeat(60)).blue().to_string()
}

// Color band shared by every score display: green for strong, yellow for
// good, magenta for fair, red for everything below
pub fn strength_style(score: i64) -> Style {
    if score >= 80 {
        Style::new().green()
    } else if score >= 60 {
        Style::new().yellow()
    } else if score >= 40 {
        Style::new().magenta()
    } else {
        Style::new().red()
    }
}

// Ten-segment bar, one segment per ten points, denser fill in higher bands
pub fn strength_meter(score: i64) -> String {
    let bars = (score / 10).clamp(0, 10) as usize;
    let fill = if score >= 80 {
        '█'
    } else if score >= 60 {
        '▓'
    } else if score >= 40 {
        '▒'
    } else {
        '░'
    };

    let mut meter = String::with_capacity(10);
    for _ in 0..bars {
        meter.push(fill);
    }
    for _ in bars..10 {
        meter.push(' ');
    }

    let styled = strength_style(score);
    format!(
        "[{}] {}",
        styled.apply_to(&meter),
        styled.apply_to(format!("{}/100", score))
    )
}

pub fn print_analysis(analysis: &AnalysisResult) {
    let score = i64::from(analysis.score);
    let styled = strength_style(score);

    println!();
    println!("{}", info("Password Analysis:"));
    println!(
        "Score: {} - {}",
        styled.apply_to(format!("{}/100", analysis.score)),
        styled.apply_to(analysis.strength.as_str())
    );
    println!("Strength Meter: {}", strength_meter(score));
    println!(
        "Length: {} | Lower: {} | Upper: {} | Digits: {} | Symbols: {}",
        analysis.length,
        analysis.has_lowercase,
        analysis.has_uppercase,
        analysis.has_digit,
        analysis.has_symbol
    );
    if !analysis.feedback.is_empty() {
        println!("Feedback: {}", analysis.feedback.join(", "));
    }
}

pub fn print_welcome_banner() {
    let inner = format!("  {}  ", "Password Security & Generator Tool");
    let bar = "═".repeat(inner.chars().count());

    println!();
    println!("{}", info(&format!("╔{}╗", bar)));
    println!("{}", info(&format!("║{}║", inner)));
    println!("{}", info(&format!("╚{}╝", bar)));
    println!();
    println!("Key Features:");
    println!(
        "  {} Password strength analysis with detailed scoring",
        success("•")
    );
    println!(
        "  {} Secure password generation with customizable options",
        success("•")
    );
    println!(
        "  {} Multi-user support with comprehensive tracking",
        success("•")
    );
    println!(
        "  {} Complete statistics and breach management",
        success("•")
    );
    println!();
}
