//! Logger module
//!
//! Named log points for the adapter and the demo server. Call sites use these
//! functions instead of emitting events directly so message wording stays in one
//! place. Events go through `tracing`; only the binary installs a subscriber.

use std::net::SocketAddr;
use std::path::Path;

use hyper::{Method, StatusCode, Uri};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::DecodeError;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init(default_level: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, workers: Option<usize>) {
    tracing::info!("Listening on: http://{addr}");
    match workers {
        Some(workers) => tracing::info!("Worker threads: {workers}"),
        None => tracing::info!("Worker threads: one per CPU core"),
    }
}

pub fn log_server_stop() {
    tracing::info!("Shutdown requested, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

/// A connection ended with an error, including failed response writes
pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::warn!("Failed to serve connection: {err:?}");
}

pub fn log_connection_timeout(secs: u64) {
    tracing::warn!("Connection timeout after {secs} seconds");
}

pub fn log_request(method: &Method, uri: &Uri) {
    tracing::info!("[Request] {method} {uri}");
}

pub fn log_response(method: &Method, path: &str, status: StatusCode) {
    tracing::info!("[Response] {method} {path} - {}", status.as_u16());
}

pub fn log_discarded_query_values(path: &str, name: &str) {
    tracing::warn!(
        "request on {path} received > 1 values for query parameter {name}. extra values discarded."
    );
}

pub fn log_decode_failure(err: &DecodeError) {
    tracing::warn!("Rejected request body: {err}");
}

/// The payload type cannot be represented as JSON
pub fn log_encode_defect(type_name: &str, err: &serde_json::Error) {
    tracing::error!("failed to marshal content (type {type_name}) to JSON: {err}");
}

pub fn log_migration(path: &Path, created: bool) {
    let path = path.display();
    if created {
        tracing::info!("[Migrate] Created people store at {path}");
    } else {
        tracing::info!("[Migrate] People store already present at {path}");
    }
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

/// Run `f` under a scoped subscriber and return everything it logged
#[cfg(test)]
pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logged = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logged)
}
