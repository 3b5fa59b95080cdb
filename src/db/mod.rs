// src/db/mod.rs
use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use thiserror::Error;

use crate::models::{
    Breach, PasswordTest, Severity, SystemOverview, TestFilter, User, UserStats, UserSummary,
};

pub type DbTransaction = sqlx::Transaction<'static, Sqlite>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Username already taken")]
    UserExists,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Convert database-specific errors to our DbError
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = error {
            if db_err
                .message()
                .contains("UNIQUE constraint failed: users.username")
            {
                return DbError::UserExists;
            }
        }
        DbError::SqlxError(error.to_string())
    }
}

const SELECT_TEST: &str = r#"
SELECT t.id, t.user_id, t.score, t.is_generated, t.created_at,
       (SELECT COUNT(*) FROM breach_password_association a
        WHERE a.password_test_id = t.id) AS breach_count
FROM password_tests t"#;

const SELECT_BREACH: &str = r#"
SELECT b.id, b.user_id, b.breach_name, b.severity, b.created_at,
       (SELECT COUNT(*) FROM breach_password_association a
        WHERE a.breach_id = b.id) AS affected_count
FROM breaches b"#;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(connection_string: &str) -> Result<Self, DbError> {
        let db_path = connection_string
            .strip_prefix("sqlite:")
            .unwrap_or(connection_string);
        let in_memory = db_path == ":memory:";

        // Create the database directory if it doesn't exist
        if !in_memory {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DbError::InitError(format!("Failed to create database directory: {}", e))
                    })?;
                }
            }
        }

        log::info!("Initializing SQLite database at: {}", db_path);

        let options = format!("sqlite:{}", db_path)
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to :memory: opens its own database, so the pool
        // must stay at a single connection there
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS password_tests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                score INTEGER NOT NULL,
                is_generated INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS breaches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                breach_name TEXT NOT NULL,
                severity TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS breach_password_association (
                breach_id INTEGER NOT NULL,
                password_test_id INTEGER NOT NULL,
                PRIMARY KEY (breach_id, password_test_id),
                FOREIGN KEY (breach_id) REFERENCES breaches(id) ON DELETE CASCADE,
                FOREIGN KEY (password_test_id) REFERENCES password_tests(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_password_tests_user ON password_tests(user_id);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_password_tests_score ON password_tests(score);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_breaches_user ON breaches(user_id);")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // Transaction handles for multi-statement writes; a handle dropped
    // without commit rolls back
    pub async fn begin(&self) -> Result<DbTransaction, DbError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn commit(&self, tx: DbTransaction) -> Result<(), DbError> {
        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_user_in_transaction(
        &self,
        tx: &mut DbTransaction,
        username: &str,
        password_hash: &str,
    ) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .execute(&mut **tx)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    pub async fn insert_breach_in_transaction(
        &self,
        tx: &mut DbTransaction,
        user_id: i64,
        breach_name: &str,
        severity: Severity,
    ) -> Result<Breach, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO breaches (user_id, breach_name, severity, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(breach_name)
        .bind(severity.as_str())
        .bind(now.to_rfc3339())
        .execute(&mut **tx)
        .await?;

        Ok(Breach {
            id: result.last_insert_rowid(),
            user_id,
            breach_name: breach_name.to_string(),
            severity,
            affected_count: 0,
            created_at: now,
        })
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username,
                   (SELECT COUNT(*) FROM password_tests t
                    WHERE t.user_id = u.id AND t.is_generated = 0) AS tests_performed,
                   (SELECT COUNT(*) FROM password_tests t
                    WHERE t.user_id = u.id AND t.is_generated = 1) AS passwords_generated,
                   (SELECT COUNT(*) FROM breaches b
                    WHERE b.user_id = u.id) AS breach_count
            FROM users u
            ORDER BY u.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| UserSummary {
                id: row.get("id"),
                username: row.get("username"),
                tests_performed: row.get("tests_performed"),
                passwords_generated: row.get("passwords_generated"),
                breach_count: row.get("breach_count"),
            })
            .collect())
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    pub async fn insert_test(
        &self,
        user_id: i64,
        score: i64,
        is_generated: bool,
    ) -> Result<PasswordTest, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO password_tests (user_id, score, is_generated, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(score)
        .bind(is_generated)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(PasswordTest {
            id: result.last_insert_rowid(),
            user_id,
            score,
            is_generated,
            breach_count: 0,
            created_at: now,
        })
    }

    pub async fn find_test_by_id(&self, test_id: i64) -> Result<Option<PasswordTest>, DbError> {
        let query = format!("{} WHERE t.id = ?", SELECT_TEST);
        let row = sqlx::query(&query)
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_test).transpose()
    }

    pub async fn list_tests_for_user(
        &self,
        user_id: i64,
        filter: TestFilter,
    ) -> Result<Vec<PasswordTest>, DbError> {
        let query = match filter {
            TestFilter::All => format!("{} WHERE t.user_id = ? ORDER BY t.id ASC", SELECT_TEST),
            TestFilter::TestedOnly => format!(
                "{} WHERE t.user_id = ? AND t.is_generated = 0 ORDER BY t.id ASC",
                SELECT_TEST
            ),
            TestFilter::GeneratedOnly => format!(
                "{} WHERE t.user_id = ? AND t.is_generated = 1 ORDER BY t.id ASC",
                SELECT_TEST
            ),
        };

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_test).collect()
    }

    pub async fn tests_below_score(&self, threshold: i64) -> Result<Vec<PasswordTest>, DbError> {
        let query = format!("{} WHERE t.score < ? ORDER BY t.id ASC", SELECT_TEST);
        let rows = sqlx::query(&query)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_test).collect()
    }

    pub async fn insert_breach(
        &self,
        user_id: i64,
        breach_name: &str,
        severity: Severity,
    ) -> Result<Breach, DbError> {
        let mut tx = self.begin().await?;
        let breach = self
            .insert_breach_in_transaction(&mut tx, user_id, breach_name, severity)
            .await?;
        self.commit(tx).await?;
        Ok(breach)
    }

    pub async fn find_breach_by_id(&self, breach_id: i64) -> Result<Option<Breach>, DbError> {
        let query = format!("{} WHERE b.id = ?", SELECT_BREACH);
        let row = sqlx::query(&query)
            .bind(breach_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_breach).transpose()
    }

    pub async fn list_breaches_for_user(&self, user_id: i64) -> Result<Vec<Breach>, DbError> {
        let query = format!("{} WHERE b.user_id = ? ORDER BY b.id ASC", SELECT_BREACH);
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_breach).collect()
    }

    pub async fn list_all_breaches(&self) -> Result<Vec<Breach>, DbError> {
        let query = format!("{} ORDER BY b.id ASC", SELECT_BREACH);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_breach).collect()
    }

    /// Links a test to a breach. Re-linking an existing pair is a no-op.
    pub async fn link_test_to_breach(&self, breach_id: i64, test_id: i64) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO breach_password_association (breach_id, password_test_id)
            VALUES (?, ?)
            "#,
        )
        .bind(breach_id)
        .bind(test_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_affected_tests(&self, breach_id: i64) -> Result<Vec<PasswordTest>, DbError> {
        let query = format!(
            r#"{}
            JOIN breach_password_association link ON link.password_test_id = t.id
            WHERE link.breach_id = ?
            ORDER BY t.id ASC"#,
            SELECT_TEST
        );
        let rows = sqlx::query(&query)
            .bind(breach_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_test).collect()
    }

    pub async fn user_stats(&self, user_id: i64, username: &str) -> Result<UserStats, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN is_generated = 0 THEN 1 ELSE 0 END), 0) AS tests_performed,
                COALESCE(SUM(CASE WHEN is_generated = 1 THEN 1 ELSE 0 END), 0) AS passwords_generated,
                COALESCE(SUM(CASE WHEN score >= 60 THEN 1 ELSE 0 END), 0) AS strong_passwords,
                COALESCE(AVG(score), 0.0) AS average_score,
                (SELECT COUNT(*) FROM breaches WHERE user_id = ?) AS breach_count
            FROM password_tests
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats {
            username: username.to_string(),
            tests_performed: row.get("tests_performed"),
            passwords_generated: row.get("passwords_generated"),
            strong_passwords: row.get("strong_passwords"),
            breach_count: row.get("breach_count"),
            average_score: row.get("average_score"),
        })
    }

    pub async fn system_overview(&self, weak_threshold: i64) -> Result<SystemOverview, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM password_tests WHERE is_generated = 0) AS total_tests,
                (SELECT COUNT(*) FROM password_tests WHERE is_generated = 1) AS total_generated,
                (SELECT COUNT(*) FROM password_tests WHERE score < ?) AS weak_tests,
                (SELECT COUNT(*) FROM breaches) AS total_breaches
            "#,
        )
        .bind(weak_threshold)
        .fetch_one(&self.pool)
        .await?;

        Ok(SystemOverview {
            total_users: row.get("total_users"),
            total_tests: row.get("total_tests"),
            total_generated: row.get("total_generated"),
            weak_tests: row.get("weak_tests"),
            total_breaches: row.get("total_breaches"),
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::SqlxError(format!("Invalid datetime: {}", e)))
}

fn row_to_user(row: &SqliteRow) -> Result<User, DbError> {
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn row_to_test(row: &SqliteRow) -> Result<PasswordTest, DbError> {
    Ok(PasswordTest {
        id: row.get("id"),
        user_id: row.get("user_id"),
        score: row.get("score"),
        is_generated: row.get("is_generated"),
        breach_count: row.get("breach_count"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn row_to_breach(row: &SqliteRow) -> Result<Breach, DbError> {
    Ok(Breach {
        id: row.get("id"),
        user_id: row.get("user_id"),
        breach_name: row.get("breach_name"),
        severity: Severity::from_input(&row.get::<String, _>("severity")),
        affected_count: row.get("affected_count"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}
