//! Tests for the server dispatcher
//!
//! These tests verify:
//! - Configuration errors before any socket is opened
//! - More clients than workers complete without deadlock
//! - Every accepted connection is closed exactly once
//! - The accept lock is never held while a handler runs
//! - Handler errors and panics stay scoped to one connection
//! - Handling overlaps across workers
//! - Shutdown stops and joins the pool

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wserver::network::Connection;
use wserver::protocol::read_request_head;
use wserver::{
    BasicHandler, ClientConfig, FanOut, RequestHandler, RequestWorker, Server, ServerConfig,
    ServerHandle, WserverError,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(num_threads: usize) -> ServerConfig {
    ServerConfig::builder()
        .bind_host("127.0.0.1")
        .port(0)
        .num_threads(num_threads)
        .build()
}

fn start_server(
    num_threads: usize,
    handler: impl RequestHandler,
) -> (ServerHandle, JoinHandle<wserver::Result<()>>) {
    let server = Server::bind(test_config(num_threads), handler).unwrap();
    let handle = server.handle();
    let join = thread::spawn(move || server.run());
    (handle, join)
}

fn stop_server(handle: &ServerHandle, join: JoinHandle<wserver::Result<()>>) {
    handle.shutdown();
    join.join().unwrap().unwrap();
}

/// One request through a RequestWorker, returning the rendered output
fn fetch(port: u16, path: &str) -> (wserver::Result<wserver::protocol::RenderSummary>, String) {
    let config = Arc::new(ClientConfig::new("127.0.0.1", port, path, 1));
    let mut out = Vec::new();
    let result = RequestWorker::new(0, config).run(&mut out);
    (result, String::from_utf8_lossy(&out).into_owned())
}

/// Handler that fails on `/fail`, panics on `/panic`, and otherwise answers
fn selective_handler(conn: &mut Connection) -> wserver::Result<()> {
    let max_line = conn.buffer_size();
    let head = read_request_head(conn, max_line)?;
    match head.target.as_str() {
        "/fail" => Err(WserverError::Handler("refused".to_string())),
        "/panic" => panic!("handler exploded"),
        _ => {
            conn.write_all(b"HTTP/1.0 200 OK\r\n\r\nok\n")?;
            Ok(())
        }
    }
}

// =============================================================================
// Startup Tests
// =============================================================================

#[test]
fn test_zero_threads_rejected_before_bind() {
    // Find a free port, then make sure the failed bind left it free.
    let port = {
        let probe = TcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap().port()
    };
    let config = ServerConfig::builder()
        .bind_host("127.0.0.1")
        .port(port)
        .num_threads(0)
        .build();

    assert!(matches!(
        Server::bind(config, BasicHandler::new()),
        Err(WserverError::Config(_))
    ));
    assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
}

#[test]
fn test_zero_buffer_rejected() {
    let config = ServerConfig::builder()
        .bind_host("127.0.0.1")
        .port(0)
        .buffer_size(0)
        .build();

    assert!(matches!(
        Server::bind(config, BasicHandler::new()),
        Err(WserverError::Config(_))
    ));
}

#[test]
fn test_bind_port_in_use() {
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = ServerConfig::builder()
        .bind_host("127.0.0.1")
        .port(taken.local_addr().unwrap().port())
        .build();

    assert!(matches!(
        Server::bind(config, BasicHandler::new()),
        Err(WserverError::Bind { .. })
    ));
}

#[test]
fn test_shutdown_joins_idle_pool() {
    let (handle, join) = start_server(4, BasicHandler::new());
    stop_server(&handle, join);

    assert_eq!(handle.stats().accepted(), handle.stats().closed());
    assert_eq!(handle.stats().handled(), 0);
}

#[test]
fn test_shutdown_twice_is_harmless() {
    let (handle, join) = start_server(2, BasicHandler::new());
    handle.shutdown();
    handle.shutdown();
    join.join().unwrap().unwrap();
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[test]
fn test_basic_handler_response() {
    let (handle, join) = start_server(2, BasicHandler::new());

    let (result, out) = fetch(handle.local_addr().port(), "/test.txt");
    let summary = result.unwrap();

    assert!(summary.saw_terminator);
    assert!(out.starts_with("Header: HTTP/1.0 200 OK\r\n"));
    assert!(out.ends_with("requested /test.txt\n"));

    stop_server(&handle, join);
}

#[test]
fn test_more_clients_than_workers() {
    let (handle, join) = start_server(4, BasicHandler::new());

    let config = ClientConfig::new("127.0.0.1", handle.local_addr().port(), "/index.html", 20);
    let report = FanOut::new(config).unwrap().run_with(|_| Vec::new()).unwrap();

    assert_eq!(report.outcomes.len(), 20);
    assert!(report.all_succeeded());
    for outcome in &report.outcomes {
        let summary = outcome.result.as_ref().unwrap();
        assert!(summary.saw_terminator);
        assert_eq!(summary.body_lines, 1);
    }

    stop_server(&handle, join);

    let stats = handle.stats();
    assert_eq!(stats.handled(), 20);
    assert_eq!(stats.accepted(), stats.closed());
}

#[test]
fn test_accept_lock_not_held_during_handling() {
    let slot: Arc<OnceLock<ServerHandle>> = Arc::new(OnceLock::new());
    let violated = Arc::new(AtomicBool::new(false));
    let checks = Arc::new(AtomicUsize::new(0));

    let handler = {
        let slot = Arc::clone(&slot);
        let violated = Arc::clone(&violated);
        let checks = Arc::clone(&checks);
        move |conn: &mut Connection| -> wserver::Result<()> {
            // Single worker: nobody else can be inside accept right now.
            if let Some(handle) = slot.get() {
                if handle.accept_lock_held() {
                    violated.store(true, Ordering::SeqCst);
                }
                checks.fetch_add(1, Ordering::SeqCst);
            }
            BasicHandler::new().handle(conn)
        }
    };

    let server = Server::bind(test_config(1), handler).unwrap();
    let handle = server.handle();
    let _ = slot.set(handle.clone());
    let join = thread::spawn(move || server.run());

    for _ in 0..5 {
        let (result, _) = fetch(handle.local_addr().port(), "/");
        result.unwrap();
    }

    stop_server(&handle, join);

    assert_eq!(checks.load(Ordering::SeqCst), 5);
    assert!(!violated.load(Ordering::SeqCst));
}

#[test]
fn test_handling_overlaps_across_workers() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handler = {
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        move |conn: &mut Connection| -> wserver::Result<()> {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(300));
            active.fetch_sub(1, Ordering::SeqCst);
            BasicHandler::new().handle(conn)
        }
    };

    let (handle, join) = start_server(2, handler);

    let config = ClientConfig::new("127.0.0.1", handle.local_addr().port(), "/slow", 2);
    let report = FanOut::new(config).unwrap().run_with(|_| Vec::new()).unwrap();
    assert!(report.all_succeeded());

    stop_server(&handle, join);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Failure Containment Tests
// =============================================================================

#[test]
fn test_handler_error_closes_connection_and_continues() {
    let (handle, join) = start_server(1, selective_handler);
    let port = handle.local_addr().port();

    // The failing handler wrote nothing; the close shows up as end-of-stream.
    let (result, out) = fetch(port, "/fail");
    let summary = result.unwrap();
    assert!(out.is_empty());
    assert_eq!(summary.header_lines, 0);

    let (result, out) = fetch(port, "/ok");
    result.unwrap();
    assert!(out.ends_with("ok\n"));

    stop_server(&handle, join);

    let stats = handle.stats();
    assert_eq!(stats.handler_failures(), 1);
    assert_eq!(stats.handled(), 1);
    assert_eq!(stats.accepted(), stats.closed());
}

#[test]
fn test_handler_panic_is_contained() {
    let (handle, join) = start_server(1, selective_handler);
    let port = handle.local_addr().port();

    let (result, out) = fetch(port, "/panic");
    result.unwrap();
    assert!(out.is_empty());

    // The only worker survived the panic.
    let (result, out) = fetch(port, "/ok");
    result.unwrap();
    assert!(out.ends_with("ok\n"));

    stop_server(&handle, join);
    assert_eq!(handle.stats().handler_failures(), 1);
    assert_eq!(handle.stats().accepted(), handle.stats().closed());
}

#[test]
fn test_oversized_request_line_capped_at_buffer_size() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let handler = {
        let seen = Arc::clone(&seen);
        move |conn: &mut Connection| -> wserver::Result<()> {
            let max_line = conn.buffer_size();
            let outcome = match read_request_head(conn, max_line) {
                Ok(head) => format!("accepted {} bytes", head.target.len()),
                Err(e) => e.to_string(),
            };
            *seen.lock().unwrap() = Some(outcome);
            Ok(())
        }
    };

    let config = ServerConfig::builder()
        .bind_host("127.0.0.1")
        .port(0)
        .num_threads(1)
        .buffer_size(64)
        .build();
    let server = Server::bind(config, handler).unwrap();
    let handle = server.handle();
    let join = thread::spawn(move || server.run());

    // Far more than the limit and no newline; the connection stays open, so
    // only the cap can end the read.
    let mut client = TcpStream::connect(handle.local_addr()).unwrap();
    client.write_all(b"GET /").unwrap();
    client.write_all(&[b'a'; 4096]).unwrap();

    // The server gives up on its own and closes.
    let mut rest = Vec::new();
    let _ = client.read_to_end(&mut rest);

    stop_server(&handle, join);

    let outcome = seen.lock().unwrap().clone().unwrap();
    assert!(outcome.contains("exceeds 64 bytes"), "{}", outcome);
    assert_eq!(handle.stats().accepted(), handle.stats().closed());
}
