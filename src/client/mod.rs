//! Client Module
//!
//! Load-generating client: a fan-out driver and its request workers.
//!
//! ## Architecture
//! - One scoped thread per worker, all joined before the driver returns
//! - One connection per worker, never shared or pooled
//! - Output may interleave across workers, line by line

mod worker;
mod driver;

pub use worker::{RequestWorker, CLIENT_BUFFER_SIZE};
pub use driver::{FanOut, FanOutReport, WorkerOutcome};
