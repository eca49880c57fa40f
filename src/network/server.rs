//! TCP Server
//!
//! Fixed pool of acceptor workers over one shared listening socket.
//!
//! Each worker loops: take the accept lock, accept, release the lock, run the
//! request handler, close the connection. Only admission is serialized;
//! handling overlaps freely across workers.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::config::ServerConfig;
use crate::error::{Result, WserverError};
use crate::handler::RequestHandler;

use super::io::{accept, open_listener};
use super::{Connection, DispatchStats};

// =============================================================================
// Accept Lock
// =============================================================================

/// Mutual exclusion around the accept call on the shared listener
///
/// Held for the duration of one accept and nothing else.
#[derive(Debug, Default)]
pub struct AcceptLock {
    inner: Mutex<()>,
}

impl AcceptLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some worker is currently inside accept
    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }

    /// Accept one connection while holding the lock
    fn accept(&self, listener: &TcpListener) -> Result<TcpStream> {
        let _guard = self.inner.lock();
        accept(listener)
    }
}

// =============================================================================
// Server
// =============================================================================

/// A bound server, ready to run its worker pool
pub struct Server {
    config: Arc<ServerConfig>,
    listener: Arc<TcpListener>,
    handler: Arc<dyn RequestHandler>,
    handle: ServerHandle,
}

impl Server {
    /// Validate the config, then open the listening socket
    ///
    /// Configuration errors are reported before any socket exists.
    pub fn bind(config: ServerConfig, handler: impl RequestHandler) -> Result<Self> {
        config.validate()?;

        let listener = open_listener(&config.bind_host, config.port)?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            "Listening on {} with {} workers (buffer {} bytes)",
            local_addr,
            config.num_threads,
            config.buffer_size
        );

        let handle = ServerHandle {
            local_addr,
            num_threads: config.num_threads,
            stop: Arc::new(AtomicBool::new(false)),
            accept_lock: Arc::new(AcceptLock::new()),
            stats: Arc::new(DispatchStats::new()),
        };

        Ok(Self {
            config: Arc::new(config),
            listener: Arc::new(listener),
            handler: Arc::new(handler),
            handle,
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.handle.local_addr
    }

    /// Cloneable handle for inspecting or stopping the server
    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Start the worker pool (blocking)
    ///
    /// Returns the first fatal worker error, or `Ok(())` once every worker has
    /// stopped after [`ServerHandle::shutdown`]. Without a shutdown request
    /// this only returns on a fatal error. Either way the whole pool is
    /// stopped and joined before this returns.
    pub fn run(self) -> Result<()> {
        let num_threads = self.config.num_threads;
        let (done_tx, done_rx) = channel::bounded(num_threads);

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            match self.spawn_worker(id, done_tx.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    tracing::error!("Failed to spawn worker {}: {}", id, e);
                    self.handle.shutdown();
                    join_all(workers);
                    return Err(e);
                }
            }
        }
        drop(done_tx);

        tracing::debug!("Spawned {} acceptor workers", num_threads);
        supervise(&self.handle, workers, done_rx)
    }

    fn spawn_worker(&self, id: usize, done: Sender<WorkerExit>) -> Result<JoinHandle<()>> {
        let worker = AcceptWorker {
            id,
            config: Arc::clone(&self.config),
            listener: Arc::clone(&self.listener),
            handler: Arc::clone(&self.handler),
            handle: self.handle.clone(),
        };

        thread::Builder::new()
            .name(format!("wserver-worker-{}", id))
            .spawn(move || worker.run(done))
            .map_err(WserverError::Spawn)
    }
}

/// Worker id plus how its accept loop ended
type WorkerExit = (usize, Result<()>);

/// Wait for the pool to finish; the first fatal error stops everyone else
fn supervise(
    handle: &ServerHandle,
    workers: Vec<JoinHandle<()>>,
    done: Receiver<WorkerExit>,
) -> Result<()> {
    // Every worker reports exactly once, even when its handler panicked.
    for _ in 0..workers.len() {
        match done.recv() {
            Ok((_, Ok(()))) => {}
            Ok((id, Err(e))) => {
                tracing::error!("Worker {} failed: {}", id, e);
                handle.shutdown();
                join_all(workers);
                return Err(e);
            }
            Err(_) => break,
        }
    }

    for worker in workers {
        worker.join().map_err(WserverError::from_panic)?;
    }

    tracing::info!("All workers stopped");
    Ok(())
}

/// Join workers after a failure, logging rather than propagating panics
fn join_all(workers: Vec<JoinHandle<()>>) {
    for worker in workers {
        if let Err(payload) = worker.join() {
            tracing::warn!("{}", WserverError::from_panic(payload));
        }
    }
}

// =============================================================================
// Server Handle
// =============================================================================

/// Shared view of a running server
#[derive(Clone)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    num_threads: usize,
    stop: Arc<AtomicBool>,
    accept_lock: Arc<AcceptLock>,
    stats: Arc<DispatchStats>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Whether the accept lock is held right now
    pub fn accept_lock_held(&self) -> bool {
        self.accept_lock.is_held()
    }

    /// Ask every worker to stop after its current connection
    ///
    /// Workers blocked in accept are woken with one loopback connection each.
    /// In-flight requests are not drained or interrupted.
    pub fn shutdown(&self) {
        if self.stop.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!("Shutdown requested");

        let wake_addr = wake_addr(self.local_addr);
        for _ in 0..self.num_threads {
            if let Err(e) = TcpStream::connect(wake_addr) {
                tracing::debug!("Wake-up connect to {} failed: {}", wake_addr, e);
                break;
            }
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Loopback equivalent of a wildcard bind address
fn wake_addr(local: SocketAddr) -> SocketAddr {
    let mut addr = local;
    if addr.ip().is_unspecified() {
        match addr {
            SocketAddr::V4(_) => addr.set_ip(Ipv4Addr::LOCALHOST.into()),
            SocketAddr::V6(_) => addr.set_ip(Ipv6Addr::LOCALHOST.into()),
        }
    }
    addr
}

// =============================================================================
// Acceptor Worker
// =============================================================================

struct AcceptWorker {
    id: usize,
    config: Arc<ServerConfig>,
    listener: Arc<TcpListener>,
    handler: Arc<dyn RequestHandler>,
    handle: ServerHandle,
}

impl AcceptWorker {
    fn run(self, done: Sender<WorkerExit>) {
        let result = self.serve();
        let _ = done.send((self.id, result));
    }

    fn serve(&self) -> Result<()> {
        let stats = &self.handle.stats;

        loop {
            if self.handle.stop_requested() {
                tracing::debug!("Worker {} stopping", self.id);
                return Ok(());
            }

            let stream = self.handle.accept_lock.accept(&self.listener)?;
            stats.record_accept();

            let mut conn = Connection::new(stream, self.config.buffer_size);

            if self.handle.stop_requested() {
                self.close(conn);
                return Ok(());
            }

            tracing::debug!("Worker {} accepted {}", self.id, conn.peer_addr());
            self.dispatch(&mut conn);
            self.close(conn);
        }
    }

    /// Run the handler; failures stay scoped to this connection
    fn dispatch(&self, conn: &mut Connection) {
        let stats = &self.handle.stats;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(conn)));

        match outcome {
            Ok(Ok(())) => stats.record_handled(),
            Ok(Err(e)) => {
                stats.record_handler_failure();
                tracing::warn!("Handler failed for {}: {}", conn.peer_addr(), e);
            }
            Err(payload) => {
                stats.record_handler_failure();
                tracing::warn!(
                    "Handler panicked for {}: {}",
                    conn.peer_addr(),
                    WserverError::from_panic(payload)
                );
            }
        }
    }

    fn close(&self, conn: Connection) {
        let peer = conn.peer_addr().to_string();
        if let Err(e) = conn.close() {
            tracing::debug!("Close of {} reported: {}", peer, e);
        }
        self.handle.stats.record_close();
    }
}
