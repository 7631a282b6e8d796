//! Optional embedded trigger for the counter reset operations.
//!
//! Deployments normally drive `/cron/reset-daily` and `/cron/reset-weekly`
//! from an external scheduler; enabling this module runs the same reset
//! operations in-process on a cron schedule instead. The jobs decide *when*,
//! never *whether*: the reset operations themselves stay unconditional.

pub mod scheduler;

use crate::{error::AppError, metering::MeteringService};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use scheduler::JobScheduler;

/// Configuration for the job system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Enable/disable the internal job scheduler
    pub enabled: bool,

    /// Daily counter reset schedule
    pub daily_reset: JobScheduleConfig,

    /// Weekly counter reset schedule
    pub weekly_reset: JobScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobScheduleConfig {
    /// Cron schedule expression (6-field format: sec min hour day month dow)
    pub schedule: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            daily_reset: JobScheduleConfig {
                schedule: "0 0 0 * * *".to_string(), // Midnight UTC
            },
            weekly_reset: JobScheduleConfig {
                schedule: "0 0 0 * * MON".to_string(), // Monday midnight UTC
            },
        }
    }
}

/// Result of job execution
#[derive(Debug, Clone)]
pub struct JobResult {
    pub success: bool,
    pub message: String,
    pub items_processed: u64,
}

impl JobResult {
    pub fn success_with_count(count: u64) -> Self {
        Self {
            success: true,
            message: format!("Successfully processed {count} items"),
            items_processed: count,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            items_processed: 0,
        }
    }
}

/// Trait for executable jobs
#[async_trait]
pub trait Job: Send + Sync {
    /// Get the job name for logging and identification
    fn name(&self) -> &str;

    /// Execute the job and return the result
    async fn execute(&self) -> Result<JobResult, AppError>;
}

/// Job that zeroes every user's daily chat counter.
pub struct DailyResetJob {
    metering: Arc<MeteringService>,
}

impl DailyResetJob {
    pub fn new(metering: Arc<MeteringService>) -> Self {
        Self { metering }
    }
}

#[async_trait]
impl Job for DailyResetJob {
    fn name(&self) -> &str {
        "daily_reset"
    }

    async fn execute(&self) -> Result<JobResult, AppError> {
        let count = self.metering.reset_daily_usage().await?;
        Ok(JobResult::success_with_count(count))
    }
}

/// Job that zeroes every user's weekly counters.
pub struct WeeklyResetJob {
    metering: Arc<MeteringService>,
}

impl WeeklyResetJob {
    pub fn new(metering: Arc<MeteringService>) -> Self {
        Self { metering }
    }
}

#[async_trait]
impl Job for WeeklyResetJob {
    fn name(&self) -> &str {
        "weekly_reset"
    }

    async fn execute(&self) -> Result<JobResult, AppError> {
        let count = self.metering.reset_weekly_usage().await?;
        Ok(JobResult::success_with_count(count))
    }
}
