use crate::{
    config::Config,
    database::{
        DatabaseManager,
        entities::{CostEntry, Feature, Plan, UserUsageRecord},
    },
    server::Server,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Test server builder for creating test instances with configurable settings
pub struct TestServerBuilder {
    config: Config,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.cron.secret = "test-cron-secret".to_string();
        config.jobs.enabled = false;

        Self { config }
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the admin allow-list
    pub fn with_admin_users(mut self, user_ids: Vec<String>) -> Self {
        self.config.admin.user_ids = user_ids;
        self
    }

    /// Set the cron trigger secret
    pub fn with_cron_secret(mut self, secret: String) -> Self {
        self.config.cron.secret = secret;
        self
    }

    /// Build the test server with migrations applied
    pub async fn build(self) -> Server {
        let server = Server::new(self.config).await.unwrap();
        server.database.migrate().await.unwrap();
        server
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a usage row for a test user
pub async fn seed_usage_row(database: &Arc<dyn DatabaseManager>, user_id: &str, plan: Plan) {
    let record = UserUsageRecord::new(user_id, plan);
    database.usage().upsert(&record).await.unwrap();
}

/// Create a usage row with pre-populated counters
pub async fn seed_usage_row_with_counters(
    database: &Arc<dyn DatabaseManager>,
    user_id: &str,
    plan: Plan,
    chat_used_today: i32,
    videos: i32,
    voice_minutes: Decimal,
    images: i32,
) {
    let mut record = UserUsageRecord::new(user_id, plan);
    record.chat_used_today = chat_used_today;
    record.videos_generated_this_week = videos;
    record.voice_minutes_this_week = voice_minutes;
    record.images_generated_this_week = images;
    database.usage().upsert(&record).await.unwrap();
}

/// Append a ledger entry with an explicit timestamp and cost
#[allow(clippy::too_many_arguments)]
pub async fn seed_cost_entry(
    database: &Arc<dyn DatabaseManager>,
    user_id: &str,
    model: &str,
    prompt_tokens: i32,
    completion_tokens: i32,
    estimated_cost: Decimal,
    feature: Feature,
    created_at: DateTime<Utc>,
) -> CostEntry {
    let entry = CostEntry {
        id: 0,
        user_id: user_id.to_string(),
        model: model.to_string(),
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
        estimated_cost,
        feature,
        created_at,
    };
    database.costs().insert(&entry).await.unwrap()
}
