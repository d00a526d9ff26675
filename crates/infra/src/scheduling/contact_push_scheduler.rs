//! Cron scheduler for the Chatwoot contact push.
//!
//! Mirrors the customer sync scheduler: cron-triggered `execute_push`, the
//! same explicit start/stop lifecycle, and cancellation on drop. The push
//! orchestrator's run lock handles overlapping triggers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use storelink_core::SyncSettings;

use crate::integrations::chatwoot::ContactPush;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the contact push scheduler.
#[derive(Debug, Clone)]
pub struct ContactPushSchedulerConfig {
    /// Cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Timeout applied to a single push execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ContactPushSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 30 * * * *".into(), // half past every hour
            job_timeout: Duration::from_secs(600),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Contact push scheduler with explicit lifecycle management.
pub struct ContactPushScheduler {
    scheduler: Option<JobScheduler>,
    config: ContactPushSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    push: Arc<ContactPush>,
}

impl ContactPushScheduler {
    /// Create a scheduler running on the given cron expression.
    pub fn new(cron_expression: String, push: Arc<ContactPush>) -> Self {
        Self::with_config(
            ContactPushSchedulerConfig {
                cron_expression,
                ..Default::default()
            },
            push,
        )
    }

    /// Create a scheduler driven by the integration's configured cron
    /// expression.
    pub fn from_settings(settings: &dyn SyncSettings, push: Arc<ContactPush>) -> Self {
        Self::new(settings.cron_schedule().to_string(), push)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(config: ContactPushSchedulerConfig, push: Arc<ContactPush>) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            push,
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout {
                seconds: start_timeout.as_secs(),
            })?
            .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        self.monitor_handle = Some(tokio::spawn(async move {
            cancel.cancelled().await;
            debug!("Contact push scheduler monitor cancelled");
        }));

        info!(cron = %self.config.cron_expression, "Contact push scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|_| SchedulerError::Timeout {
                seconds: stop_timeout.as_secs(),
            })?
            .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout {
                    seconds: join_timeout.as_secs(),
                })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Contact push scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;

        let push = Arc::clone(&self.push);
        let job_timeout = self.config.job_timeout;

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let push = Arc::clone(&push);
            Box::pin(async move {
                match tokio::time::timeout(job_timeout, push.execute_push()).await {
                    Ok(Some(stats)) => {
                        debug!(errors = stats.errors, "Scheduled contact push finished");
                    }
                    Ok(None) => {
                        debug!("Scheduled contact push skipped");
                    }
                    Err(_) => {
                        warn!(
                            timeout_secs = job_timeout.as_secs(),
                            "Scheduled contact push timed out"
                        );
                    }
                }
            })
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        let job_id = job.guid();
        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered contact push job");
        Ok(scheduler)
    }
}

impl Drop for ContactPushScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ContactPushScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
