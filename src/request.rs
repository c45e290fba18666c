use crate::logging::RequestLog;

/// Metadata about an incoming request.
///
/// Carries the identifier that correlates log events for one handler
/// invocation. The transport assigns it; [`RequestMeta::generate`] is there
/// for callers that have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    /// Unique identifier for this request
    pub request_id: String,
}

impl RequestMeta {
    /// Creates metadata for the given request id.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Creates metadata with a random UUID v4 request id.
    pub fn generate() -> Self {
        Self::new(format!("req-{}", uuid::Uuid::new_v4()))
    }

    /// Returns a logger that stamps this request's id on every event.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id)
    }
}
