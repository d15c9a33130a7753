//! Serving analyzers to concurrent clients over a line protocol.
//!
//! - [`config`]: worker counts, queue size and per-connection modes.
//! - [`worker`]: the protocol one client is served with.
//! - [`pool`]: bounded dispatch of connections onto workers.
//! - [`stats`]: throughput counters reported to clients.

pub mod config;
pub mod pool;
pub mod stats;
pub mod worker;

pub use config::{InputMode, ServiceConfig, DEFAULT_MAX_WORKERS, DEFAULT_QUEUE_SIZE};
pub use pool::{Connection, PoolReport, WorkerPool};
pub use stats::ServerStats;
pub use worker::{Worker, WorkerReport, ACK, FLUSH_BUFFER, PRINT_STATS, RESET_STATS};
