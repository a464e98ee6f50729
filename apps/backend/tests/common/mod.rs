//! Common test utilities for integration tests.
//!
//! Integration tests require a PostgreSQL database (set DATABASE_URL).

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use vocab_backend::db::Database;
use vocab_backend::AppState;

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let app = vocab_backend::router(AppState { db: db.clone() });

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self) -> (Uuid, String) {
        let token = Uuid::new_v4().to_string();
        let id: Uuid = sqlx::query_scalar("INSERT INTO users (token) VALUES ($1) RETURNING id")
            .bind(&token)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to create test user");
        (id, token)
    }

    pub async fn create_language(&self, owner_id: Uuid, name: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO languages (owner_id, name) VALUES ($1, $2) RETURNING id")
            .bind(owner_id)
            .bind(name)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to create language")
    }

    pub async fn create_category(&self, language_id: i64, name: &str, method: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO categories (language_id, name, method) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(language_id)
        .bind(name)
        .bind(method)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create category")
    }

    /// Create an accepted word with one prompt part (position 0) and one
    /// answer part (position 1).
    pub async fn create_word(&self, category_id: i64, prompt: &str, answer: &str) -> i64 {
        let pool = self.db.pool();
        let word_id: i64 = sqlx::query_scalar(
            "INSERT INTO words (accepted, reset_time) VALUES (TRUE, NOW() - INTERVAL '1 day') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .expect("Failed to create word");

        sqlx::query(
            r#"
            INSERT INTO word_parts (word_id, position, answer, word)
            VALUES ($1, 0, FALSE, $2), ($1, 1, TRUE, $3)
            "#,
        )
        .bind(word_id)
        .bind(prompt)
        .bind(answer)
        .execute(pool)
        .await
        .expect("Failed to create word parts");

        sqlx::query("INSERT INTO word_categories (word_id, category_id) VALUES ($1, $2)")
            .bind(word_id)
            .bind(category_id)
            .execute(pool)
            .await
            .expect("Failed to link word to category");

        word_id
    }

    /// Number of grading records stored for a word.
    pub async fn stats_count(&self, word_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM word_stats WHERE word_id = $1")
            .bind(word_id)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count word stats")
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        // Words hang off categories only through the link table.
        let _ = sqlx::query(
            r#"
            DELETE FROM words
            WHERE id IN (
                SELECT wc.word_id
                FROM word_categories wc
                JOIN categories c ON c.id = wc.category_id
                JOIN languages l ON l.id = c.language_id
                WHERE l.owner_id = $1
            )
            "#,
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
