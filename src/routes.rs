//! Request routing dispatch module
//!
//! Explicit route table owned by the server. Handler units are registered per
//! method and exact path; anything else is answered with an error envelope.

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response, StatusCode};
use restez::{handle_get, handle_post, write_json, Envelope, HandlerUnit, QueryParams};
use std::collections::HashMap;

use crate::people::{self, FileStore};

/// Method and path → handler unit
pub struct Routes<B = Incoming> {
    table: HashMap<String, Vec<(Method, HandlerUnit<B>)>>,
}

impl<B> Default for Routes<B> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<B> Routes<B> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(mut self, method: Method, path: &str, unit: HandlerUnit<B>) -> Self {
        self.table
            .entry(path.to_string())
            .or_default()
            .push((method, unit));
        self
    }

    pub async fn dispatch(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let Some(handlers) = self.table.get(req.uri().path()) else {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("no route for {}", req.uri().path()),
            );
        };

        let unit = handlers
            .iter()
            .find(|(method, _)| method == req.method())
            .map(|(_, unit)| unit.clone());

        match unit {
            Some(unit) => unit.call(req).await,
            None => error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("method {} not allowed on {}", req.method(), req.uri().path()),
            ),
        }
    }
}

/// Routes served by the people demo
pub fn people_routes<B>(store: &FileStore) -> Routes<B>
where
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<restez::BoxError>,
{
    let insert_store = store.clone();
    let list_store = store.clone();

    Routes::new()
        .route(
            Method::POST,
            "/new",
            handle_post(move |req: people::NewPersonRequest| {
                people::add_new_person(insert_store.clone(), req)
            }),
        )
        .route(
            Method::GET,
            "/list",
            handle_get(move |params: QueryParams| {
                people::list_people(list_store.clone(), params)
            }),
        )
}

fn error_response(status: StatusCode, error: String) -> Response<Full<Bytes>> {
    write_json(status, &Envelope::<()>::Error { error })
}
