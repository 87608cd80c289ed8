// Connection handling module
// Serves a single accepted TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::ServerContext;
use restez::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive
/// 3. Serves every request on the connection through the route table
/// 4. Bounds the whole connection by the configured read/write timeout
///
/// A response that cannot be written (client gone, reset) ends the connection
/// with an error, which is logged here and goes no further.
pub fn handle_connection(stream: tokio::net::TcpStream, ctx: Arc<ServerContext>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let timeout_secs = std::cmp::max(
            ctx.performance.read_timeout,
            ctx.performance.write_timeout,
        );
        let timeout_duration = Duration::from_secs(timeout_secs);

        let mut builder = http1::Builder::new();
        builder.keep_alive(ctx.performance.keep_alive_timeout > 0);

        let service_ctx = Arc::clone(&ctx);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let ctx = Arc::clone(&service_ctx);
                async move { Ok::<_, Infallible>(ctx.serve(req).await) }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_connection_timeout(timeout_secs),
        }
    });
}
