//! Bounded worker pool.
//!
//! A dispatcher takes connections from a bounded queue and hands each to a
//! worker running on a blocking thread. At most `max_workers` workers are
//! active; the dispatcher waits for a free slot *before* taking the next
//! connection, so up to `queue_size` connections wait in the queue and
//! senders beyond that block.
//!
//! ```text
//!  clients ──► mpsc(queue_size) ──► dispatcher ──► Semaphore(max_workers)
//!                                                   └─► spawn_blocking(Worker::serve)
//! ```

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use super::config::ServiceConfig;
use super::worker::{apply_output, Worker, WorkerReport};
use crate::errors::Result;
use crate::pipeline::runner::Analyzer;

/// A client connection as a pair of byte streams.
pub struct Connection {
    pub id: u64,
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl Connection {
    pub fn new(
        id: u64,
        input: impl Read + Send + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        Self {
            id,
            input: Box::new(BufReader::new(input)),
            output: Box::new(output),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish()
    }
}

/// What a pool run served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub connections: usize,
    pub failed: usize,
    pub sentences: usize,
    pub words: usize,
}

impl PoolReport {
    /// Account for one finished worker, logging it if it failed.
    fn record(&mut self, outcome: std::result::Result<Result<WorkerReport>, JoinError>) {
        self.connections += 1;
        match outcome {
            Ok(Ok(worker)) => {
                self.sentences += worker.sentences;
                self.words += worker.words;
            }
            Ok(Err(e)) => {
                warn!("worker failed: {}", e);
                self.failed += 1;
            }
            Err(e) => {
                warn!("worker task panicked: {}", e);
                self.failed += 1;
            }
        }
    }
}

#[derive(Debug)]
pub struct WorkerPool {
    template: Analyzer,
    config: ServiceConfig,
    slots: Arc<Semaphore>,
}

impl WorkerPool {
    /// Pool whose workers fork `template`. Each worker gets fresh streaming
    /// state and shares the template's loaded stages.
    pub fn new(mut template: Analyzer, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        apply_output(&mut template, config.output)?;
        let slots = Arc::new(Semaphore::new(config.max_workers));
        Ok(Self {
            template,
            config,
            slots,
        })
    }

    /// The bounded queue connections are submitted through.
    pub fn queue(&self) -> (mpsc::Sender<Connection>, mpsc::Receiver<Connection>) {
        mpsc::channel(self.config.queue_size)
    }

    /// Workers currently free.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Serve connections until every sender of `queue` is dropped and all
    /// workers have finished. Finished workers are reaped and reported as
    /// they end, not only at shutdown.
    pub async fn serve(&self, mut queue: mpsc::Receiver<Connection>) -> PoolReport {
        let mut workers = JoinSet::new();
        let mut report = PoolReport::default();
        loop {
            let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await else {
                break;
            };
            while let Some(done) = workers.try_join_next() {
                report.record(done);
            }
            // Keep reaping while the queue is idle.
            let next = loop {
                tokio::select! {
                    conn = queue.recv() => break conn,
                    Some(done) = workers.join_next(), if !workers.is_empty() => {
                        report.record(done);
                    }
                }
            };
            let Some(conn) = next else {
                break;
            };
            let id = conn.id;
            info!(connection = id, "worker starting");
            let analyzer = self.template.fork();
            let config = self.config.clone();
            workers.spawn_blocking(move || {
                let _permit = permit;
                let Connection { input, output, .. } = conn;
                let mut worker = Worker::new(analyzer, &config)?;
                worker.serve(input, output)
            });
        }

        while let Some(done) = workers.join_next().await {
            report.record(done);
        }
        info!(
            connections = report.connections,
            failed = report.failed,
            "worker pool drained"
        );
        report
    }
}
