use super::{Job, JobsConfig};
use crate::error::AppError;
use chrono::Utc;
use cron::Schedule;
use std::{str::FromStr, sync::Arc};
use tokio::{
    sync::{RwLock, broadcast},
    task::JoinHandle,
    time::Duration,
};
use tracing::{error, info, warn};

/// Job scheduler that manages periodic execution of jobs
pub struct JobScheduler {
    config: JobsConfig,
    handles: Arc<RwLock<Vec<JoinHandle<()>>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobScheduler {
    pub fn new(config: JobsConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            config,
            handles: Arc::new(RwLock::new(Vec::new())),
            shutdown_tx,
        }
    }

    /// Start the job scheduler with registered jobs
    pub async fn start(&mut self, jobs: Vec<Arc<dyn Job>>) -> Result<(), AppError> {
        if !self.config.enabled {
            info!("Job scheduler disabled in configuration");
            return Ok(());
        }

        info!("Starting job scheduler with {} jobs", jobs.len());

        let mut handles = self.handles.write().await;
        for job in jobs {
            let handle = self.spawn_job_with_schedule(job)?;
            handles.push(handle);
        }

        info!("Job scheduler started successfully");
        Ok(())
    }

    /// Stop the job scheduler and all running jobs
    pub async fn stop(&mut self) {
        let mut handles = self.handles.write().await;
        if handles.is_empty() {
            return;
        }

        info!("Stopping job scheduler...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal: {}", e);
        }

        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Job handle failed during shutdown: {}", e);
            }
        }

        info!("Job scheduler stopped");
    }

    /// Spawn a job that fires at each upcoming instant of its cron schedule
    fn spawn_job_with_schedule(&self, job: Arc<dyn Job>) -> Result<JoinHandle<()>, AppError> {
        let schedule_expr = self.get_schedule_for_job(job.name())?;
        // Validate up front so a bad expression fails startup, not the first tick
        parse_schedule(&schedule_expr)?;

        let job_name = job.name().to_string();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            info!("Job '{}' scheduled with '{}'", job_name, schedule_expr);

            loop {
                let wait = match next_fire_delay(&schedule_expr) {
                    Ok(wait) => wait,
                    Err(e) => {
                        error!("Job '{}' schedule error: {}", job_name, e);
                        break;
                    }
                };

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        info!("Executing job '{}'", job_name);

                        match job.execute().await {
                            Ok(result) => {
                                if result.success {
                                    info!("Job '{}' completed: {}", job_name, result.message);
                                } else {
                                    warn!("Job '{}' failed: {}", job_name, result.message);
                                }
                            }
                            Err(e) => {
                                error!("Job '{}' execution error: {}", job_name, e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Job '{}' received shutdown signal", job_name);
                        break;
                    }
                }
            }

            info!("Job '{}' stopped", job_name);
        });

        Ok(handle)
    }

    /// Get the schedule configuration for a specific job
    fn get_schedule_for_job(&self, job_name: &str) -> Result<String, AppError> {
        match job_name {
            "daily_reset" => Ok(self.config.daily_reset.schedule.clone()),
            "weekly_reset" => Ok(self.config.weekly_reset.schedule.clone()),
            _ => Err(AppError::Internal(format!("Unknown job: {job_name}"))),
        }
    }
}

fn parse_schedule(cron_expr: &str) -> Result<Schedule, AppError> {
    Schedule::from_str(cron_expr)
        .map_err(|e| AppError::Internal(format!("Invalid cron expression '{cron_expr}': {e}")))
}

/// Duration until the schedule's next fire instant.
/// Uses 6-field format (sec min hour day month dow).
fn next_fire_delay(cron_expr: &str) -> Result<Duration, AppError> {
    let schedule = parse_schedule(cron_expr)?;

    let now = Utc::now();
    let next_execution = schedule.upcoming(Utc).take(1).next().ok_or_else(|| {
        AppError::Internal(format!(
            "No upcoming execution found for cron expression: {cron_expr}"
        ))
    })?;

    let duration_until_next = (next_execution - now)
        .to_std()
        .map_err(|e| AppError::Internal(format!("Failed to convert duration: {e}")))?;

    Ok(duration_until_next)
}
