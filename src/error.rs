//! Error types for request decoding

/// Boxed error accepted from arbitrary request body implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to turn a request into a handler's input
///
/// The message always names the target type so a client can tell which
/// shape the endpoint expected.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body could not be read from the connection
    #[error("unable to parse request as type {target}: failed to read body: {source}")]
    Body {
        target: &'static str,
        #[source]
        source: BoxError,
    },

    /// The body was read but is not valid JSON for the target type
    #[error("unable to parse request as type {target}: {source}")]
    Json {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn body<T>(source: impl Into<BoxError>) -> Self {
        Self::Body {
            target: std::any::type_name::<T>(),
            source: source.into(),
        }
    }

    pub fn json<T>(source: serde_json::Error) -> Self {
        Self::Json {
            target: std::any::type_name::<T>(),
            source,
        }
    }

    /// Name of the type the request was decoded into
    pub const fn target(&self) -> &'static str {
        match self {
            Self::Body { target, .. } | Self::Json { target, .. } => target,
        }
    }
}
