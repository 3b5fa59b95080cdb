// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String, // Argon2id PHC string
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordTest {
    pub id: i64,
    pub user_id: i64,
    pub score: i64,
    pub is_generated: bool,
    pub breach_count: i64,
    pub created_at: DateTime<Utc>,
}

impl PasswordTest {
    pub fn is_strong(&self) -> bool {
        self.score >= 60
    }

    pub fn strength_category(&self) -> &'static str {
        if self.is_strong() {
            "Strong"
        } else {
            "Weak"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    High,
}

impl Severity {
    /// Lenient parse for user input: anything that is not "High" is Low.
    pub fn from_input(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("high") {
            Severity::High
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::High => "High",
        }
    }

    /// Numeric rank used for ordering breach listings (High outranks Low).
    pub fn level(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::High => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breach {
    pub id: i64,
    pub user_id: i64,
    pub breach_name: String,
    pub severity: Severity,
    pub affected_count: i64,
    pub created_at: DateTime<Utc>,
}

// Which password tests a history listing should include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestFilter {
    All,
    TestedOnly,
    GeneratedOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub tests_performed: i64,
    pub passwords_generated: i64,
    pub breach_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub tests_performed: i64,
    pub passwords_generated: i64,
    pub strong_passwords: i64,
    pub breach_count: i64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemOverview {
    pub total_users: i64,
    pub total_tests: i64,
    pub total_generated: i64,
    pub weak_tests: i64,
    pub total_breaches: i64,
}
