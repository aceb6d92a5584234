//! Download service types and events.

use std::time::Duration;

use crate::scrapers::FetchError;

/// Events emitted while a pack is crawled.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// A pack page answered.
    PageLocated { pack_id: String, url: String },
    /// No usable candidates; guessed file names will be tried instead.
    FallbackUsed { pack_id: String, count: usize },
    /// Download list is final.
    Planned { pack_id: String, total: usize },
    /// First attempt of a task is about to start.
    Started {
        index: usize,
        url: String,
        file_name: String,
    },
    /// An attempt failed and another will follow after `delay`.
    Retry {
        file_name: String,
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        error: String,
    },
    /// File written.
    Completed { file_name: String, bytes: u64 },
    /// Attempts exhausted.
    Failed {
        file_name: String,
        url: String,
        attempts: u32,
        error: String,
    },
}

/// Final state of one download task.
#[derive(Debug)]
pub enum TaskOutcome {
    Succeeded { attempts: u32, bytes: u64 },
    Failed { attempts: u32, error: FetchError },
}

impl TaskOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            TaskOutcome::Succeeded { attempts, .. } | TaskOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded { .. })
    }
}

/// Configuration for download service.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Attempts per task, including the first.
    pub max_attempts: u32,
    /// Attempt `n` failing waits `n * retry_base_delay` before the next one.
    pub retry_base_delay: Duration,
    /// Pause after each successful download except the last.
    pub request_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            request_delay: Duration::from_millis(1000),
        }
    }
}

impl DownloadConfig {
    /// Backoff after failed attempt number `attempt` (1-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * attempt
    }
}
