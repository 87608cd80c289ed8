// Server loop module
// Accepts connections until Ctrl+C

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use super::ServerContext;
use restez::logger;

/// Accept connections and hand each to its own task.
///
/// Returns once a shutdown signal arrives. Connections already being served keep
/// running on their tasks until the runtime is dropped.
pub async fn start_server_loop(
    listener: TcpListener,
    ctx: Arc<ServerContext>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        if ctx.access_log {
                            logger::log_connection_accepted(&peer_addr);
                        }
                        handle_connection(stream, Arc::clone(&ctx));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            signal = &mut shutdown => {
                if let Err(e) = signal {
                    logger::log_error(&format!("Failed to listen for shutdown signal: {e}"));
                }
                logger::log_server_stop();
                return Ok(());
            }
        }
    }
}
