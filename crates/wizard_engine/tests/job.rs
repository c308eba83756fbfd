use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use wizard_engine::{
    simulated_results, BackgroundJob, ChunkSink, DownloadSettings, DownloadState, EngineConfig,
    EngineEvent, EngineHandle, FetchError, Fetcher, JobError, JobItem, JobSettings,
};

fn quick_job() -> JobSettings {
    JobSettings {
        work_duration: Duration::from_millis(50),
        join_timeout: Duration::from_secs(1),
    }
}

#[test]
fn simulated_results_are_fixed_and_ordered() {
    let names: Vec<_> = simulated_results()
        .into_iter()
        .map(|JobItem { id, name }| (id, name))
        .collect();
    assert_eq!(
        names,
        vec![
            (1, "Project Alpha".to_string()),
            (2, "Project Beta".to_string()),
            (3, "Project Gamma".to_string()),
            (4, "Project Delta".to_string()),
        ]
    );
}

#[test]
fn job_posts_results_once_when_done() {
    wizard_logging::initialize_for_tests();
    let (tx, rx) = mpsc::channel();
    let mut job = BackgroundJob::new(quick_job());

    job.start(tx).expect("start");
    assert!(job.is_running());

    let event = rx.recv_timeout(Duration::from_secs(2)).expect("job finished");
    assert_eq!(
        event,
        EngineEvent::JobFinished {
            items: simulated_results()
        }
    );
    assert!(job.stop_and_join(Duration::from_secs(1)));
    assert!(!job.is_running());
    assert!(rx.try_recv().is_err());
}

#[test]
fn second_start_while_running_is_rejected() {
    let (tx, _rx) = mpsc::channel();
    let mut job = BackgroundJob::new(JobSettings {
        work_duration: Duration::from_secs(10),
        ..quick_job()
    });

    job.start(tx.clone()).expect("start");
    assert!(matches!(job.start(tx), Err(JobError::AlreadyRunning)));
    assert!(job.stop_and_join(Duration::from_secs(1)));
}

#[test]
fn stopped_job_posts_nothing_and_joins_quickly() {
    let (tx, rx) = mpsc::channel();
    let mut job = BackgroundJob::new(JobSettings {
        work_duration: Duration::from_secs(10),
        ..quick_job()
    });
    job.start(tx).expect("start");

    let started = Instant::now();
    assert!(job.stop_and_join(Duration::from_secs(1)));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn job_can_run_again_after_finishing() {
    let (tx, rx) = mpsc::channel();
    let mut job = BackgroundJob::new(quick_job());

    job.start(tx.clone()).expect("first run");
    rx.recv_timeout(Duration::from_secs(2)).expect("first result");
    assert!(wait_idle(&job));
    job.start(tx).expect("second run");
    rx.recv_timeout(Duration::from_secs(2)).expect("second result");
}

fn wait_idle(job: &BackgroundJob) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while job.is_running() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    true
}

struct EchoFetcher;

#[async_trait::async_trait]
impl Fetcher for EchoFetcher {
    async fn fetch(&self, url: &str, sink: &mut dyn ChunkSink) -> Result<u64, FetchError> {
        sink.write_chunk(url.as_bytes())?;
        Ok(url.len() as u64)
    }

    fn close(&self) {}
}

#[test]
fn engine_routes_job_and_download_events_through_one_channel() {
    wizard_logging::initialize_for_tests();
    let config = EngineConfig {
        job: quick_job(),
        ..EngineConfig::default()
    };
    let (mut engine, events) = EngineHandle::with_fetcher(config, Arc::new(EchoFetcher)).unwrap();

    engine.start_job().expect("job");
    let handle = engine.submit("https://thumbs.test/1").expect("submit");

    let mut saw_job = false;
    let mut saw_download = false;
    let deadline = Instant::now() + Duration::from_secs(3);
    while !(saw_job && saw_download) && Instant::now() < deadline {
        match events.recv_timeout(Duration::from_millis(100)) {
            Some(EngineEvent::JobFinished { items }) => saw_job = items.len() == 4,
            Some(EngineEvent::DownloadChanged { id, state }) if id == handle.id() => {
                saw_download |= state.is_terminal();
            }
            _ => {}
        }
    }
    assert!(saw_job && saw_download);

    engine.shutdown();
    assert!(engine.submit("https://thumbs.test/2").is_err());
    assert!(!engine.is_job_running());
}

struct StalledFetcher;

#[async_trait::async_trait]
impl Fetcher for StalledFetcher {
    async fn fetch(&self, _url: &str, _sink: &mut dyn ChunkSink) -> Result<u64, FetchError> {
        std::future::pending().await
    }

    fn close(&self) {}
}

#[test]
fn engine_shutdown_settles_downloads_in_flight() {
    wizard_logging::initialize_for_tests();
    let config = EngineConfig {
        job: JobSettings {
            work_duration: Duration::from_secs(30),
            join_timeout: Duration::from_secs(2),
        },
        downloads: DownloadSettings {
            max_concurrency: 2,
            drain_timeout: Duration::from_secs(2),
            ..DownloadSettings::default()
        },
        ..EngineConfig::default()
    };
    let (mut engine, _events) =
        EngineHandle::with_fetcher(config, Arc::new(StalledFetcher)).unwrap();

    engine.start_job().expect("job");
    let handles: Vec<_> = (1..=5)
        .map(|id| engine.submit(format!("https://thumbs.test/{id}")).expect("submit"))
        .collect();
    assert_eq!(engine.downloads_in_flight(), 5);

    let started = Instant::now();
    engine.shutdown();

    assert!(started.elapsed() < Duration::from_secs(2));
    for handle in &handles {
        assert_eq!(handle.state(), DownloadState::Aborted);
    }
    assert_eq!(engine.downloads_in_flight(), 0);
    assert!(!engine.is_job_running());
    assert!(engine.submit("https://thumbs.test/6").is_err());
}
