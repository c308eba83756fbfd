//! One download: stream into a scratch file, read it back, report.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use crate::{ChunkSink, DownloadSettings, FailureKind, FetchError, Fetcher};

/// How a task ended, before it is folded into a handle state.
#[derive(Debug)]
pub(crate) enum TaskOutcome {
    Completed(Bytes),
    Failed(FetchError),
    Aborted,
}

/// Scratch file for one response body. The file is removed when the spool is
/// dropped, whichever way the task ends.
struct Spool {
    file: NamedTempFile,
    cancel: CancellationToken,
}

impl Spool {
    fn create(dir: Option<&Path>, cancel: CancellationToken) -> Result<Self, FetchError> {
        let file = match dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(io_error)?;
        Ok(Self { file, cancel })
    }

    fn read_back(mut self) -> Result<Bytes, FetchError> {
        let file = self.file.as_file_mut();
        file.flush().map_err(io_error)?;
        file.seek(SeekFrom::Start(0)).map_err(io_error)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(io_error)?;
        Ok(Bytes::from(data))
    }
}

impl ChunkSink for Spool {
    fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), FetchError> {
        if self.cancel.is_cancelled() {
            return Err(FetchError::new(FailureKind::Cancelled, "aborted by caller"));
        }
        self.file.write_all(chunk).map_err(io_error)
    }
}

fn io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}

/// Runs one download to completion. Abort is checked before the fetch, on
/// every chunk, and once more before the body is read back; an abort while
/// waiting on the network drops the request outright.
pub(crate) async fn execute(
    fetcher: &dyn Fetcher,
    url: &str,
    cancel: &CancellationToken,
    settings: &DownloadSettings,
) -> TaskOutcome {
    if cancel.is_cancelled() {
        return TaskOutcome::Aborted;
    }
    let mut spool = match Spool::create(settings.temp_dir.as_deref(), cancel.clone()) {
        Ok(spool) => spool,
        Err(err) => return TaskOutcome::Failed(err),
    };

    let fetched = {
        let fetch = fetcher.fetch(url, &mut spool);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return TaskOutcome::Aborted,
            result = tokio::time::timeout(settings.task_timeout, fetch) => match result {
                Ok(result) => result,
                Err(_) => Err(FetchError::new(
                    FailureKind::Timeout,
                    format!("no response within {:?}", settings.task_timeout),
                )),
            },
        }
    };

    if cancel.is_cancelled() {
        return TaskOutcome::Aborted;
    }
    match fetched.and_then(|_| spool.read_back()) {
        Ok(bytes) => TaskOutcome::Completed(bytes),
        Err(err) if err.kind == FailureKind::Cancelled => TaskOutcome::Aborted,
        Err(err) => TaskOutcome::Failed(err),
    }
}
