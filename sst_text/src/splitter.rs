use std::error;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::pos::PosTag;

/// A request to parse one raw document.
#[derive(Clone, Debug)]
pub struct ParseRequest {
    pub text: String,
    pub date: Option<DateTime<Utc>>,
}

impl ParseRequest {
    pub fn new(text: impl Into<String>) -> Self {
        ParseRequest {
            text: text.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ParsedWord {
    pub text: String,
    pub stemmed: String,
    pub tag: PosTag,
}

#[derive(Clone, Debug)]
pub struct ParsedSentence {
    pub words: Vec<ParsedWord>,
}

/// Tagged word sequence produced by an annotation backend, grouped into
/// sentences.
#[derive(Clone, Debug)]
pub struct ParsedDocument {
    pub text: String,
    pub date: Option<DateTime<Utc>>,
    pub sentences: Vec<ParsedSentence>,
}

/// One stateful parsing worker. Workers are expensive to construct, so the
/// pool creates them lazily and reuses them across requests.
#[async_trait]
pub trait TextSplitter: Send {
    async fn process(&mut self, request: &ParseRequest) -> Result<ParsedDocument, ParseError>;

    /// Called exactly once by the pool when the worker is retired.
    fn dispose(&mut self) {}
}

pub trait SplitterFactory: Send + Sync {
    fn construct_single(&self) -> Box<dyn TextSplitter>;
}

/// Bounded pool of parsing workers.
///
/// At most `capacity` workers ever exist and at most `capacity` requests
/// are in flight; the rest queue on the semaphore in FIFO order. Workers
/// are constructed on demand, the first time a request finds no idle
/// worker, and are handed back after every request whether or not the
/// parse succeeded.
pub struct QueueTextSplitter {
    semaphore: Semaphore,
    idle: Mutex<Vec<Box<dyn TextSplitter>>>,
    factory: Box<dyn SplitterFactory>,
    constructed: AtomicUsize,
    disposed: AtomicBool,
}

impl QueueTextSplitter {
    pub fn new(capacity: usize, factory: Box<dyn SplitterFactory>) -> Result<Self, PoolError> {
        if capacity < 1 {
            return Err(PoolError::InvalidCapacity(capacity));
        }

        Ok(QueueTextSplitter {
            semaphore: Semaphore::new(capacity),
            idle: Mutex::new(Vec::with_capacity(capacity)),
            factory,
            constructed: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
        })
    }

    /// Number of workers constructed so far; never exceeds the capacity.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub async fn process(&self, request: &ParseRequest) -> Result<ParsedDocument, PoolError> {
        // A closed semaphore also rejects the requests that were already
        // queued when the pool was shut down.
        let _permit = self.semaphore.acquire().await.map_err(|_| PoolError::Disposed)?;

        let mut worker = {
            let mut idle = self.idle.lock().unwrap();
            idle.pop()
        }
        .unwrap_or_else(|| {
            self.constructed.fetch_add(1, Ordering::SeqCst);
            self.factory.construct_single()
        });

        let result = worker.process(request).await;

        // The worker slot is released on success and failure alike; a
        // parse failure must not shrink the pool.
        let mut idle = self.idle.lock().unwrap();
        if self.disposed.load(Ordering::SeqCst) {
            drop(idle);
            worker.dispose();
        } else {
            idle.push(worker);
            drop(idle);
        }

        result.map_err(PoolError::from)
    }

    /// Retires every constructed worker exactly once and rejects any later
    /// `process` call. Workers still processing are disposed as they are
    /// handed back.
    pub fn shutdown(&self) {
        let mut idle = self.idle.lock().unwrap();
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.semaphore.close();

        for worker in idle.iter_mut() {
            worker.dispose();
        }
        idle.clear();
    }
}

impl Drop for QueueTextSplitter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Failure reported by an annotation backend for a single request.
#[derive(Debug)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse failed: {}", self.message)
    }
}

impl error::Error for ParseError {}

#[derive(Debug)]
pub enum PoolError {
    InvalidCapacity(usize),
    Disposed,
    Parse(Box<ParseError>),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity(capacity) => {
                write!(f, "splitter pool capacity must be at least 1, got {}", capacity)
            },
            Self::Disposed => write!(f, "splitter pool has been shut down"),
            Self::Parse(err) => err.fmt(f),
        }
    }
}

impl error::Error for PoolError {}

impl From<ParseError> for PoolError {
    fn from(err: ParseError) -> Self {
        PoolError::Parse(Box::new(err))
    }
}
