//! Project overview:
//! - Four-node file store that shards files across backends by file type
//! - A single front-door node owns routing, path rewriting and aggregation,
//!   so backend sharding is invisible to clients
//! - Newline-header framed protocol on every TCP link
//! - One OS thread per client; backend connections are dialed per operation
//!   and never pooled
//!
//! Key behaviors:
//! - uploadf/downlf/removef: routed by extension (c stays local on the
//!   front door, pdf/txt/zip go to their owning nodes)
//! - downltar: per-type tar archive built on the owning node and relayed
//! - dispfnames: one directory listing aggregated across all four nodes in
//!   fixed class order

pub mod client;
pub mod dispatch;
pub mod error;
pub mod pathmap;
pub mod route;
pub mod server;
pub mod storage;
pub mod wire;

pub use error::{Result, StoreError};
pub use route::{route, BackendId, FileType};
pub use storage::Storage;
