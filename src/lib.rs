//! Adapter between hyper requests and typed async handler functions
//!
//! A handler is any async function `Input -> Result<Output, E>`. The adapter decodes
//! the input from the request (query string for read verbs, JSON body for write verbs),
//! runs the handler and writes the result as a fixed JSON envelope:
//!
//! - success: `{"status":"OK","response":<output>}` with 200
//! - failure: `{"status":"ERROR","error":"<message>"}` with 500
//!
//! Routing is left to the caller: [`handle_get`], [`handle_post`] and [`handle_put`]
//! return a [`HandlerUnit`] that can be registered with any router or served directly
//! as a hyper service.

pub mod adapter;
pub mod decode;
pub mod envelope;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use adapter::{handle_get, handle_post, handle_put, HandlerFuture, HandlerUnit};
pub use decode::{decode_body, query_parameters, QueryParams};
pub use envelope::{write_error, write_json, write_response, write_success, Envelope};
pub use error::{BoxError, DecodeError};
