//! Fan-out Driver
//!
//! Spawns one request worker per configured thread against a single target
//! and waits for all of them.

use std::io::{self, Write};
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{Result, WserverError};
use crate::protocol::RenderSummary;

use super::RequestWorker;

/// Result of one worker's exchange
#[derive(Debug)]
pub struct WorkerOutcome {
    pub id: usize,
    pub result: Result<RenderSummary>,
}

/// Outcomes of every worker, ordered by worker id
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub outcomes: Vec<WorkerOutcome>,
}

impl FanOutReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Concurrent request generator
pub struct FanOut {
    config: Arc<ClientConfig>,
}

impl FanOut {
    /// Validate the config; nothing touches the network yet
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run every worker, rendering to standard output
    pub fn run(&self) -> Result<FanOutReport> {
        self.run_with(|_| io::stdout())
    }

    /// Run every worker, rendering worker `i` into `sink(i)`
    ///
    /// Returns after every spawned worker has finished, whether it succeeded
    /// or not. A failed connect ends only that worker. Failing to spawn a
    /// worker is fatal, but workers already started are still joined first.
    pub fn run_with<F, W>(&self, sink: F) -> Result<FanOutReport>
    where
        F: Fn(usize) -> W + Sync,
        W: Write,
    {
        let num_threads = self.config.num_threads;
        let sink = &sink;

        let joined = crossbeam::scope(|scope| -> Result<FanOutReport> {
            let mut handles = Vec::with_capacity(num_threads);

            for id in 0..num_threads {
                let worker = RequestWorker::new(id, Arc::clone(&self.config));
                let spawned = scope
                    .builder()
                    .name(format!("wclient-worker-{}", id))
                    .spawn(move |_| {
                        let mut out = sink(id);
                        let result = worker.run(&mut out);
                        if let Err(e) = &result {
                            tracing::error!("Worker {} failed: {}", id, e);
                        }
                        WorkerOutcome { id, result }
                    });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => return Err(WserverError::Spawn(e)),
                }
            }

            let mut report = FanOutReport {
                outcomes: Vec::with_capacity(num_threads),
            };
            for handle in handles {
                let outcome = handle.join().map_err(WserverError::from_panic)?;
                report.outcomes.push(outcome);
            }
            Ok(report)
        });

        let report = joined.map_err(WserverError::from_panic)??;
        tracing::info!(
            "{} of {} workers completed",
            report.succeeded(),
            report.outcomes.len()
        );
        Ok(report)
    }
}
