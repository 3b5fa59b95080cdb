// src/core/service.rs
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::analyzer::{AnalysisResult, StrengthAnalyzer};
use crate::db::{Database, DbError};
use crate::generators::{GenerationOptions, PasswordGenerator};
use crate::models::{
    Breach, PasswordTest, Severity, SystemOverview, TestFilter, User, UserStats, UserSummary,
};

// Every new account starts with one low-severity reminder breach so the
// breach views are never empty on first login
const WELCOME_BREACH_NAME: &str = "New User Security Check";

pub const DEFAULT_WEAK_THRESHOLD: i64 = 40;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// What a caller gets back from testing a password: the stored row id plus
/// the full analysis and concrete improvement advice.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub test_id: i64,
    pub analysis: AnalysisResult,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub password: String,
    pub analysis: AnalysisResult,
    pub test_id: i64,
}

/// Facade over the analyzer, the generator and the database. Every
/// user-facing flow goes through here; only scores are persisted, the
/// cleartext of tested and generated passwords never reaches the database.
pub struct SecurityService {
    db: Database,
    analyzer: StrengthAnalyzer,
    generator: PasswordGenerator,
    weak_threshold: i64,
}

impl SecurityService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            analyzer: StrengthAnalyzer::new(),
            generator: PasswordGenerator::new(),
            weak_threshold: DEFAULT_WEAK_THRESHOLD,
        }
    }

    /// Overrides the score below which stored tests count as weak in the
    /// system overview.
    pub fn with_weak_threshold(mut self, threshold: i64) -> Self {
        self.weak_threshold = threshold;
        self
    }

    // ---- User management ----

    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::Validation(
                "Username must not be blank".into(),
            ));
        }
        if password.is_empty() {
            return Err(ServiceError::Validation(
                "Password must not be blank".into(),
            ));
        }

        if self.db.find_user_by_username(username).await?.is_some() {
            return Err(ServiceError::DuplicateUser(username.to_string()));
        }

        let password_hash = hash_password(password)?;

        // The account and its welcome breach land together or not at all
        let mut tx = self.db.begin().await?;
        let user = match self
            .db
            .insert_user_in_transaction(&mut tx, username, &password_hash)
            .await
        {
            Ok(user) => user,
            Err(DbError::UserExists) => {
                return Err(ServiceError::DuplicateUser(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        self.db
            .insert_breach_in_transaction(&mut tx, user.id, WELCOME_BREACH_NAME, Severity::Low)
            .await?;
        self.db.commit(tx).await?;

        log::info!("Created user '{}' (id {})", user.username, user.id);
        Ok(user)
    }

    /// Checks credentials. Unknown usernames and wrong passwords both come
    /// back as `None` so callers cannot probe which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.db.find_user_by_username(username).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            log::debug!("Failed login attempt for '{}'", username);
            Ok(None)
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self.db.list_users().await?)
    }

    /// Removes the user and, through the cascades, every test, breach and
    /// association they own.
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let user = self.require_user(username).await?;
        self.db.delete_user(user.id).await?;
        log::info!("Deleted user '{}' and all owned records", user.username);
        Ok(())
    }

    // ---- Password testing ----

    pub async fn test_password(&self, username: &str, password: &str) -> Result<TestOutcome> {
        let user = self.require_user(username).await?;

        let analysis = self.analyzer.analyze(password);
        let suggestions = self.analyzer.improvement_suggestions(&analysis);
        let record = self
            .db
            .insert_test(user.id, i64::from(analysis.score), false)
            .await?;

        log::debug!(
            "Recorded test {} for '{}' scoring {}",
            record.id,
            user.username,
            analysis.score
        );

        Ok(TestOutcome {
            test_id: record.id,
            analysis,
            suggestions,
        })
    }

    pub async fn test_history(
        &self,
        username: &str,
        filter: TestFilter,
    ) -> Result<Vec<PasswordTest>> {
        let user = self.require_user(username).await?;
        Ok(self.db.list_tests_for_user(user.id, filter).await?)
    }

    /// All stored tests scoring strictly below `threshold`, across users.
    pub async fn weak_tests(&self, threshold: i64) -> Result<Vec<PasswordTest>> {
        Ok(self.db.tests_below_score(threshold).await?)
    }

    // ---- Password generation ----

    pub async fn generate_password(
        &self,
        username: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutcome> {
        if options.length == 0 {
            return Err(ServiceError::Validation(
                "Password length must be at least 1".into(),
            ));
        }
        let user = self.require_user(username).await?;

        let password = self.generator.generate(options);
        let analysis = self.analyzer.analyze(&password);
        let record = self
            .db
            .insert_test(user.id, i64::from(analysis.score), true)
            .await?;

        Ok(GenerationOutcome {
            password,
            analysis,
            test_id: record.id,
        })
    }

    /// Generates `count` candidate passwords with the default character
    /// pools, each persisted as its own generated-test record.
    pub async fn generate_multiple(
        &self,
        username: &str,
        count: usize,
        length: usize,
    ) -> Result<Vec<GenerationOutcome>> {
        if count == 0 {
            return Err(ServiceError::Validation("Count must be at least 1".into()));
        }

        let options = GenerationOptions {
            length,
            ..GenerationOptions::default()
        };

        let mut outcomes = Vec::with_capacity(count);
        for _ in 0..count {
            outcomes.push(self.generate_password(username, &options).await?);
        }
        Ok(outcomes)
    }

    // ---- Breach management ----

    pub async fn report_breach(
        &self,
        username: &str,
        breach_name: &str,
        severity: Severity,
    ) -> Result<Breach> {
        let breach_name = breach_name.trim();
        if breach_name.is_empty() {
            return Err(ServiceError::Validation(
                "Breach name must not be blank".into(),
            ));
        }
        let user = self.require_user(username).await?;

        let breach = self.db.insert_breach(user.id, breach_name, severity).await?;
        log::info!(
            "Recorded {} severity breach '{}' for '{}'",
            severity,
            breach.breach_name,
            user.username
        );
        Ok(breach)
    }

    pub async fn user_breaches(&self, username: &str) -> Result<Vec<Breach>> {
        let user = self.require_user(username).await?;
        Ok(self.db.list_breaches_for_user(user.id).await?)
    }

    pub async fn all_breaches(&self) -> Result<Vec<Breach>> {
        Ok(self.db.list_all_breaches().await?)
    }

    /// Links a stored test to a breach. Linking the same pair again is a
    /// no-op rather than an error.
    pub async fn associate_test_with_breach(&self, breach_id: i64, test_id: i64) -> Result<()> {
        if self.db.find_breach_by_id(breach_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Breach {}", breach_id)));
        }
        if self.db.find_test_by_id(test_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Password test {}", test_id)));
        }

        self.db.link_test_to_breach(breach_id, test_id).await?;
        Ok(())
    }

    pub async fn breach_affected_tests(&self, breach_id: i64) -> Result<Vec<PasswordTest>> {
        if self.db.find_breach_by_id(breach_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Breach {}", breach_id)));
        }
        Ok(self.db.list_affected_tests(breach_id).await?)
    }

    // ---- Statistics ----

    pub async fn user_stats(&self, username: &str) -> Result<UserStats> {
        let user = self.require_user(username).await?;
        let mut stats = self.db.user_stats(user.id, &user.username).await?;
        // Two decimal places
        stats.average_score = (stats.average_score * 100.0).round() / 100.0;
        Ok(stats)
    }

    pub async fn system_overview(&self) -> Result<SystemOverview> {
        Ok(self.db.system_overview(self.weak_threshold).await?)
    }

    async fn require_user(&self, username: &str) -> Result<User> {
        self.db
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(username.to_string()))
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| ServiceError::Hash(format!("Invalid hash format: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_service() -> SecurityService {
        let db = Database::new("sqlite::memory:")
            .await
            .expect("in-memory database");
        SecurityService::new(db)
    }

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("tr0ub4dor&3").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("tr0ub4dor&3", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(ServiceError::Hash(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_inputs_are_rejected() {
        let service = memory_service().await;

        assert!(matches!(
            service.create_user("   ", "secret").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create_user("carol", "").await,
            Err(ServiceError::Validation(_))
        ));
        service.create_user("carol", "secret").await.unwrap();
        assert!(matches!(
            service.report_breach("carol", "  ", Severity::High).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_generation_bounds_are_validated() {
        let service = memory_service().await;
        service.create_user("dave", "hunter2").await.unwrap();

        let zero_length = GenerationOptions {
            length: 0,
            ..GenerationOptions::default()
        };
        assert!(matches!(
            service.generate_password("dave", &zero_length).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.generate_multiple("dave", 0, 12).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.generate_multiple("dave", 3, 0).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_operations_demand_an_existing_user() {
        let service = memory_service().await;

        assert!(matches!(
            service.test_password("ghost", "pw").await,
            Err(ServiceError::UserNotFound(_))
        ));
        assert!(matches!(
            service.user_stats("ghost").await,
            Err(ServiceError::UserNotFound(_))
        ));
        assert!(matches!(
            service.delete_user("ghost").await,
            Err(ServiceError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_average_score_rounds_to_two_decimals() {
        let service = memory_service().await;
        let user = service.create_user("erin", "secret").await.unwrap();

        // 10, 10 and 11 average to 10.333..., which must surface as 10.33
        service.db.insert_test(user.id, 10, false).await.unwrap();
        service.db.insert_test(user.id, 10, false).await.unwrap();
        service.db.insert_test(user.id, 11, true).await.unwrap();

        let stats = service.user_stats("erin").await.unwrap();
        assert_eq!(stats.average_score, 10.33);
    }
}
