// Server module entry
// Binds the listener, runs the accept loop and serves each connection with the route table

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};

use crate::config::PerformanceConfig;
use crate::routes::Routes;
use restez::logger;

pub use listener::bind_listener;
pub use server_loop::start_server_loop;

/// Everything a connection task needs, shared read-only across connections
pub struct ServerContext {
    pub routes: Routes,
    pub performance: PerformanceConfig,
    pub access_log: bool,
}

impl ServerContext {
    pub async fn serve(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        if self.access_log {
            logger::log_request(&method, req.uri());
        }

        let response = self.routes.dispatch(req).await;

        if self.access_log {
            logger::log_response(&method, &path, response.status());
        }
        response
    }
}
