//! Scoped span tracing to a file.
//!
//! A [`TraceSession`] owns one trace file. Spans are routed to it only while
//! [`TraceSession::run`] is executing; nothing is installed process-wide. The
//! file is flushed by [`TraceSession::close`], or on drop if the session is
//! abandoned early.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use cmx_matrix::TracingSink;
use thiserror::Error;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to create trace file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to flush trace file {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Cloneable handle to the trace file, shared by the subscriber's writers.
#[derive(Debug, Clone)]
struct TraceWriter(Arc<Mutex<BufWriter<File>>>);

impl TraceWriter {
    fn lock(&self) -> MutexGuard<'_, BufWriter<File>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Write for TraceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for TraceWriter {
    type Writer = TraceWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// An open trace file and the means to route spans into it.
#[derive(Debug)]
pub struct TraceSession {
    path: PathBuf,
    writer: TraceWriter,
    closed: bool,
}

impl TraceSession {
    /// Create (or truncate) the trace file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let file = File::create(&path).map_err(|source| SessionError::Create {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened trace file");
        Ok(Self {
            path,
            writer: TraceWriter(Arc::new(Mutex::new(BufWriter::new(file)))),
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with span output routed to the trace file.
    ///
    /// `f` receives a sink pinned to this session's subscriber, so row spans
    /// opened on worker threads land in the file too. The subscriber is
    /// uninstalled when `f` returns or unwinds.
    pub fn run<R>(&self, f: impl FnOnce(TracingSink) -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.writer.clone())
            .with_ansi(false)
            .with_thread_names(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let dispatch = tracing::Dispatch::new(subscriber);
        tracing::dispatcher::with_default(&dispatch, || {
            f(TracingSink::with_dispatch(dispatch.clone()))
        })
    }

    /// Flush and close the trace file, reporting any write failure.
    pub fn close(mut self) -> Result<(), SessionError> {
        self.closed = true;
        self.writer
            .lock()
            .flush()
            .map_err(|source| SessionError::Flush {
                path: self.path.clone(),
                source,
            })
    }
}

impl Drop for TraceSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.writer.lock().flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush trace file");
        }
    }
}
