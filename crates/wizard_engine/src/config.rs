use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub downloads: DownloadSettings,
    pub job: JobSettings,
}

/// Transport-level settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Upper bound on downloads in the Running state at once.
    pub max_concurrency: usize,
    /// Hard limit on one task from start of fetch to end of read-back.
    pub task_timeout: Duration,
    /// How long shutdown waits for the pool to drain.
    pub drain_timeout: Duration,
    /// Where scratch files go; `None` means the system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            task_timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(15),
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobSettings {
    pub work_duration: Duration,
    /// Bounded wait when joining the job thread during teardown.
    pub join_timeout: Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            work_duration: Duration::from_secs(3),
            join_timeout: Duration::from_secs(5),
        }
    }
}
