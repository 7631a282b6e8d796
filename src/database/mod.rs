//! Database access layer with domain-specific DAOs
//!
//! This module provides direct database access without abstraction layers.
//! Each domain (usage counters, cost ledger, model costs) has its own DAO
//! for focused operations.

use crate::config::Config;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use thiserror::Error;

pub mod dao;
pub mod entities;
pub mod migration;

pub use dao::{
    CostAggregates, CostLedgerDao, CostQuery, ModelCostsDao, UsageCounter, UsageDao,
    UserCostBreakdown,
};

/// Database error types
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Record not found")]
    NotFound,
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Migration error: {0}")]
    Migration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database manager trait for dependency injection and testing
#[async_trait]
pub trait DatabaseManager: Send + Sync {
    /// Run database migrations
    async fn migrate(&self) -> DatabaseResult<()>;

    /// Health check for database connection
    async fn health_check(&self) -> DatabaseResult<()>;

    /// Get usage counters DAO
    fn usage(&self) -> UsageDao;

    /// Get cost ledger DAO
    fn costs(&self) -> CostLedgerDao;

    /// Get model price table DAO
    fn model_costs(&self) -> ModelCostsDao;

    /// Get direct database connection (for migrations and admin operations)
    fn connection(&self) -> &DatabaseConnection;
}

/// Database connection manager implementation
pub struct DatabaseManagerImpl {
    pub connection: DatabaseConnection,
}

impl DatabaseManagerImpl {
    /// Create database manager from configuration
    pub async fn new_from_config(config: &Config) -> Result<Self, DatabaseError> {
        let connection = sea_orm::Database::connect(&config.database.url)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl DatabaseManager for DatabaseManagerImpl {
    /// Run database migrations
    async fn migrate(&self) -> DatabaseResult<()> {
        use crate::database::migration::Migrator;
        use sea_orm_migration::MigratorTrait;

        tracing::info!("Running database migrations");

        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::Migration(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Successfully completed all migrations");
        Ok(())
    }

    /// Health check for database connection
    async fn health_check(&self) -> DatabaseResult<()> {
        self.connection
            .ping()
            .await
            .map_err(|e| DatabaseError::Database(format!("db error: {}", e)))
    }

    /// Get usage counters DAO
    fn usage(&self) -> UsageDao {
        UsageDao::new(self.connection.clone())
    }

    /// Get cost ledger DAO
    fn costs(&self) -> CostLedgerDao {
        CostLedgerDao::new(self.connection.clone())
    }

    /// Get model price table DAO
    fn model_costs(&self) -> ModelCostsDao {
        ModelCostsDao::new(self.connection.clone())
    }

    /// Get direct database connection (for migrations and admin operations)
    fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
