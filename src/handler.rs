//! The profile update request handler.
//!
//! One call to [`ProfileUpdateHandler::handle`] runs the whole request:
//!
//! 1. admit `userId` and `newEmail` through the [`FieldSanitizer`]
//! 2. insert the pair with bound parameters
//! 3. on insert failure, write the generic write error and stop
//! 4. query every record for `userId`, again with a bound parameter
//! 5. render each record with both values HTML-escaped
//! 6. on query failure, write the generic read error after whatever was
//!    already rendered
//!
//! Failures are recovered here. The caller receives a [`PageStatus`], never
//! an error, and the response body carries only fixed messages.

use std::ops::ControlFlow;

use thiserror::Error;

use crate::config::HandlerConfig;
use crate::logging::RequestLog;
use crate::page::{self, INVALID_INPUT_MESSAGE, READ_ERROR_MESSAGE, WRITE_ERROR_MESSAGE};
use crate::web::{ExtractMetadata, ExtractTaintedInputs, ProfileUpdateForm, RequestAdapter};
use crate::{
    FieldSanitizer, RecordStore, RequestMeta, SanitizationError, Sanitizer, Sink, SinkError,
    SqliteStore, StoreError, Tainted, VecSink,
};

/// How a handled request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// The write and read succeeded and every matching record was rendered.
    Rendered {
        /// Number of records rendered.
        records: usize,
    },
    /// A field failed admission. Nothing was written to the store.
    InputRejected,
    /// The insert failed. No read was attempted.
    WriteFailure,
    /// The insert succeeded but the query failed.
    ReadFailure {
        /// Records rendered before the failure.
        rendered: usize,
    },
    /// The response sink failed. The page is incomplete.
    ResponseFailure,
}

impl PageStatus {
    /// Returns `true` for [`PageStatus::Rendered`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// A fully buffered response, for callers that want the page as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// How the request ended.
    pub status: PageStatus,
    /// The response body.
    pub body: String,
}

/// Internal failure taxonomy. Never leaves this module.
#[derive(Debug, Error)]
enum HandleError {
    #[error("{field} rejected")]
    Input {
        field: &'static str,
        #[source]
        source: SanitizationError,
    },

    #[error("could not store user data")]
    Write(#[source] StoreError),

    #[error("could not fetch user data after {rendered} records")]
    Read {
        rendered: usize,
        #[source]
        source: StoreError,
    },

    #[error("could not write response")]
    Response(#[source] SinkError),
}

/// Handles profile update requests against a [`RecordStore`].
///
/// The handler holds only its store and sanitizer. Neither carries
/// per-request state, so one handler can serve concurrent requests if `S`
/// is `Sync`.
///
/// # Examples
///
/// ```no_run
/// use profile_guard::{
///     FieldSanitizer, ProfileUpdateHandler, RequestMeta, SqliteStore, StoreConfig, Tainted,
/// };
///
/// let store = SqliteStore::new(StoreConfig::new("profiles.db"));
/// store.initialize().unwrap();
/// let handler = ProfileUpdateHandler::new(store, FieldSanitizer::default());
///
/// let page = handler.handle_to_page(
///     &RequestMeta::new("req-1"),
///     Tainted::new("bob".to_string()),
///     Tainted::new("bob@x.com".to_string()),
/// );
/// assert_eq!(page.body, "User ID: bob<br>Email: bob@x.com<br>");
/// ```
#[derive(Debug, Clone)]
pub struct ProfileUpdateHandler<S> {
    store: S,
    sanitizer: FieldSanitizer,
}

impl ProfileUpdateHandler<SqliteStore> {
    /// Builds a SQLite-backed handler from configuration.
    ///
    /// Does not touch the database. Call
    /// [`SqliteStore::initialize`] through [`store`](Self::store) if the
    /// schema may be missing.
    pub fn from_config(config: &HandlerConfig) -> Self {
        Self::new(
            SqliteStore::new(config.store.clone()),
            FieldSanitizer::new(config.max_field_len()),
        )
    }
}

impl<S: RecordStore> ProfileUpdateHandler<S> {
    /// Creates a handler over a store.
    pub fn new(store: S, sanitizer: FieldSanitizer) -> Self {
        Self { store, sanitizer }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles one request, writing the response incrementally into `sink`.
    pub fn handle(
        &self,
        meta: &RequestMeta,
        user_id: Tainted<String>,
        new_email: Tainted<String>,
        sink: &dyn Sink,
    ) -> PageStatus {
        let log = meta.log();
        log.info(format_args!(
            "profile update received (user_id {} bytes, email {} bytes)",
            user_id.byte_len(),
            new_email.byte_len()
        ));

        match self.process(&log, user_id, new_email, sink) {
            Ok(records) => {
                log.info(format_args!("profile update rendered {} records", records));
                PageStatus::Rendered { records }
            }
            Err(failure) => recover(&log, failure, sink),
        }
    }

    /// Handles one request and returns the buffered page.
    pub fn handle_to_page(
        &self,
        meta: &RequestMeta,
        user_id: Tainted<String>,
        new_email: Tainted<String>,
    ) -> RenderedPage {
        let sink = VecSink::new();
        let status = self.handle(meta, user_id, new_email, &sink);
        RenderedPage {
            status,
            body: sink.into_body(),
        }
    }

    /// Extracts `userId` and `newEmail` from a request and handles it.
    pub fn handle_request(&self, adapter: &RequestAdapter, sink: &dyn Sink) -> PageStatus {
        let meta = adapter.extract_metadata();
        let form = ProfileUpdateForm::from_inputs(&adapter.extract_tainted_inputs());
        self.handle(&meta, form.user_id, form.new_email, sink)
    }

    fn process(
        &self,
        log: &RequestLog<'_>,
        user_id: Tainted<String>,
        new_email: Tainted<String>,
        sink: &dyn Sink,
    ) -> Result<usize, HandleError> {
        let user_id = self
            .sanitizer
            .sanitize(user_id)
            .map_err(|source| HandleError::Input {
                field: "userId",
                source,
            })?;
        let email = self
            .sanitizer
            .sanitize(new_email)
            .map_err(|source| HandleError::Input {
                field: "newEmail",
                source,
            })?;

        self.store
            .insert(&user_id, &email)
            .map_err(HandleError::Write)?;
        log.debug(format_args!("record stored"));

        let mut rendered = 0;
        let mut sink_error = None;
        let result = self.store.for_each_by_user_id(&user_id, &mut |record| {
            match page::render_record(sink, &record) {
                Ok(()) => {
                    rendered += 1;
                    ControlFlow::Continue(())
                }
                Err(e) => {
                    sink_error = Some(e);
                    ControlFlow::Break(())
                }
            }
        });

        if let Some(e) = sink_error {
            return Err(HandleError::Response(e));
        }
        match result {
            Ok(_) => Ok(rendered),
            Err(source) => Err(HandleError::Read { rendered, source }),
        }
    }
}

fn recover(log: &RequestLog<'_>, failure: HandleError, sink: &dyn Sink) -> PageStatus {
    let (message, status) = match &failure {
        HandleError::Input { .. } => {
            log.warn(format_args!("{}: {}", failure, source_text(&failure)));
            (INVALID_INPUT_MESSAGE, PageStatus::InputRejected)
        }
        HandleError::Write(_) => {
            log.error(&failure, format_args!("profile update aborted before read"));
            (WRITE_ERROR_MESSAGE, PageStatus::WriteFailure)
        }
        HandleError::Read { rendered, .. } => {
            log.error(&failure, format_args!("profile read aborted"));
            (
                READ_ERROR_MESSAGE,
                PageStatus::ReadFailure {
                    rendered: *rendered,
                },
            )
        }
        HandleError::Response(_) => {
            log.error(&failure, format_args!("response abandoned"));
            return PageStatus::ResponseFailure;
        }
    };

    match page::render_error(sink, message) {
        Ok(()) => status,
        Err(e) => {
            log.error(&e, format_args!("could not write error page"));
            PageStatus::ResponseFailure
        }
    }
}

fn source_text(failure: &HandleError) -> String {
    std::error::Error::source(failure)
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{EMAIL_LABEL, USER_ID_LABEL};
    use crate::{Html, SinkErrorKind, UserRecord, Verified};
    use std::cell::Cell;
    use std::io;
    use std::sync::Mutex;

    /// In-memory store that records inserts and can fail on demand.
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<UserRecord>>,
        fail_insert: bool,
        // Fail the read after yielding this many matching records.
        fail_read_after: Option<usize>,
    }

    impl MemoryStore {
        fn inserted(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    impl RecordStore for MemoryStore {
        fn insert(
            &self,
            user_id: &Verified<String>,
            email: &Verified<String>,
        ) -> Result<(), StoreError> {
            if self.fail_insert {
                return Err(StoreError::write(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "table user_data is read-only at /var/db/secret.db",
                )));
            }
            self.records.lock().unwrap().push(UserRecord {
                user_id: user_id.as_str().to_string(),
                email: email.as_str().to_string(),
            });
            Ok(())
        }

        fn for_each_by_user_id(
            &self,
            user_id: &Verified<String>,
            visit: &mut dyn FnMut(UserRecord) -> ControlFlow<()>,
        ) -> Result<usize, StoreError> {
            let records = self.records.lock().unwrap().clone();
            let mut visited = 0;
            for record in records.into_iter().filter(|r| r.user_id == *user_id.as_str()) {
                if self.fail_read_after == Some(visited) {
                    return Err(StoreError::read(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "syntax error near \"'\"",
                    )));
                }
                visited += 1;
                if visit(record).is_break() {
                    break;
                }
            }
            if self.fail_read_after == Some(visited) {
                return Err(StoreError::read("cursor closed"));
            }
            Ok(visited)
        }
    }

    /// Sink that fails once `limit` fragments have been written.
    struct FailingSink {
        inner: VecSink,
        limit: usize,
        written: Cell<usize>,
    }

    impl FailingSink {
        fn after(limit: usize) -> Self {
            Self {
                inner: VecSink::new(),
                limit,
                written: Cell::new(0),
            }
        }
    }

    impl Sink for FailingSink {
        fn sink(&self, fragment: &Html) -> Result<(), SinkError> {
            if self.written.get() >= self.limit {
                return Err(SinkError::with_message(SinkErrorKind::Io, "reset by peer"));
            }
            self.written.set(self.written.get() + 1);
            self.inner.sink(fragment)
        }
    }

    fn tainted(value: &str) -> Tainted<String> {
        Tainted::new(value.to_string())
    }

    fn handler(store: MemoryStore) -> ProfileUpdateHandler<MemoryStore> {
        ProfileUpdateHandler::new(store, FieldSanitizer::new(64))
    }

    fn meta() -> RequestMeta {
        RequestMeta::new("req-test")
    }

    #[test]
    fn round_trip_renders_single_record() {
        let handler = handler(MemoryStore::default());

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted("bob@x.com"));

        assert_eq!(page.status, PageStatus::Rendered { records: 1 });
        assert_eq!(page.body, "User ID: bob<br>Email: bob@x.com<br>");
    }

    #[test]
    fn renders_every_record_for_user() {
        let handler = handler(MemoryStore::default());
        handler.handle_to_page(&meta(), tainted("bob"), tainted("old@x.com"));
        handler.handle_to_page(&meta(), tainted("alice"), tainted("alice@x.com"));

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted("new@x.com"));

        assert_eq!(page.status, PageStatus::Rendered { records: 2 });
        assert_eq!(
            page.body,
            "User ID: bob<br>Email: old@x.com<br>User ID: bob<br>Email: new@x.com<br>"
        );
    }

    #[test]
    fn markup_is_escaped_in_output() {
        let handler = handler(MemoryStore::default());

        let page = handler.handle_to_page(
            &meta(),
            tainted("a' OR '1'='1"),
            tainted("<script>alert(1)</script>"),
        );

        assert!(page.status.is_success());
        assert!(!page.body.contains("<script>"));
        assert!(page.body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.body.contains("a&#x27; OR &#x27;1&#x27;=&#x27;1"));
    }

    #[test]
    fn stored_values_are_kept_verbatim() {
        let handler = handler(MemoryStore::default());

        handler.handle_to_page(&meta(), tainted("<b>"), tainted("x&y"));

        let records = handler.store().records.lock().unwrap().clone();
        assert_eq!(records[0].user_id, "<b>");
        assert_eq!(records[0].email, "x&y");
    }

    #[test]
    fn empty_inputs_round_trip() {
        let handler = handler(MemoryStore::default());

        let page = handler.handle_to_page(&meta(), tainted(""), tainted(""));

        assert_eq!(page.status, PageStatus::Rendered { records: 1 });
        assert_eq!(page.body, "User ID: <br>Email: <br>");
    }

    #[test]
    fn write_failure_skips_read() {
        let handler = handler(MemoryStore {
            fail_insert: true,
            ..MemoryStore::default()
        });

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted("bob@x.com"));

        assert_eq!(page.status, PageStatus::WriteFailure);
        assert_eq!(page.body, WRITE_ERROR_MESSAGE);
        assert!(!page.body.contains(USER_ID_LABEL));
    }

    #[test]
    fn write_failure_message_is_generic() {
        let handler = handler(MemoryStore {
            fail_insert: true,
            ..MemoryStore::default()
        });

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted("bob@x.com"));

        assert!(!page.body.contains("read-only"));
        assert!(!page.body.contains("/var/db"));
    }

    #[test]
    fn read_failure_writes_read_error() {
        let handler = handler(MemoryStore {
            fail_read_after: Some(0),
            ..MemoryStore::default()
        });

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted("bob@x.com"));

        assert_eq!(page.status, PageStatus::ReadFailure { rendered: 0 });
        assert_eq!(page.body, READ_ERROR_MESSAGE);
        assert!(!page.body.contains("syntax error"));
        assert_eq!(handler.store().inserted(), 1);
    }

    #[test]
    fn read_failure_keeps_rows_already_rendered() {
        let store = MemoryStore {
            fail_read_after: Some(1),
            ..MemoryStore::default()
        };
        store.records.lock().unwrap().push(UserRecord {
            user_id: "bob".to_string(),
            email: "first@x.com".to_string(),
        });
        let handler = handler(store);

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted("second@x.com"));

        assert_eq!(page.status, PageStatus::ReadFailure { rendered: 1 });
        assert_eq!(
            page.body,
            format!("User ID: bob<br>Email: first@x.com<br>{READ_ERROR_MESSAGE}")
        );
        assert!(!page.body.contains("second@x.com"));
    }

    #[test]
    fn oversized_input_is_rejected_before_write() {
        let handler = handler(MemoryStore::default());
        let long = "x".repeat(65);

        let page = handler.handle_to_page(&meta(), tainted("bob"), tainted(&long));

        assert_eq!(page.status, PageStatus::InputRejected);
        assert_eq!(page.body, INVALID_INPUT_MESSAGE);
        assert_eq!(handler.store().inserted(), 0);
    }

    #[test]
    fn nul_in_user_id_round_trips() {
        let handler = handler(MemoryStore::default());

        let page = handler.handle_to_page(&meta(), tainted("a\0b"), tainted("e"));

        assert_eq!(page.status, PageStatus::Rendered { records: 1 });
        assert_eq!(page.body, "User ID: a\0b<br>Email: e<br>");
        assert_eq!(handler.store().inserted(), 1);
    }

    #[test]
    fn sink_failure_stops_rendering() {
        let store = MemoryStore::default();
        store.records.lock().unwrap().push(UserRecord {
            user_id: "bob".to_string(),
            email: "first@x.com".to_string(),
        });
        let handler = handler(store);
        // One record is six fragments; fail partway through the second.
        let sink = FailingSink::after(8);

        let status = handler.handle(&meta(), tainted("bob"), tainted("second@x.com"), &sink);

        assert_eq!(status, PageStatus::ResponseFailure);
        assert!(sink.inner.body().starts_with("User ID: bob<br>Email: first@x.com<br>"));
        assert!(!sink.inner.body().contains("second@x.com"));
    }

    #[test]
    fn sink_failure_on_error_page() {
        let handler = handler(MemoryStore {
            fail_insert: true,
            ..MemoryStore::default()
        });
        let sink = FailingSink::after(0);

        let status = handler.handle(&meta(), tainted("bob"), tainted("bob@x.com"), &sink);

        assert_eq!(status, PageStatus::ResponseFailure);
        assert!(sink.inner.is_empty());
    }

    #[test]
    fn handle_request_reads_adapter_params() {
        let handler = handler(MemoryStore::default());
        let mut adapter = RequestAdapter::new("req-adapter".to_string());
        adapter.add_form_param("userId".to_string(), "carol".to_string());
        adapter.add_query_param("newEmail".to_string(), "carol@x.com".to_string());
        let sink = VecSink::new();

        let status = handler.handle_request(&adapter, &sink);

        assert_eq!(status, PageStatus::Rendered { records: 1 });
        assert_eq!(
            sink.body(),
            format!("{USER_ID_LABEL}carol<br>{EMAIL_LABEL}carol@x.com<br>")
        );
    }

    #[test]
    fn from_config_applies_field_limit() {
        let config = HandlerConfig::new(crate::StoreConfig::new("unused.db"))
            .with_max_field_len(3)
            .unwrap();

        let handler = ProfileUpdateHandler::from_config(&config);

        assert_eq!(handler.sanitizer.max_len(), 3);
    }

    #[test]
    fn sqlite_handler_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProfileUpdateHandler<SqliteStore>>();
    }

    #[test]
    fn page_status_success_flag() {
        assert!(PageStatus::Rendered { records: 0 }.is_success());
        assert!(!PageStatus::WriteFailure.is_success());
        assert!(!PageStatus::ReadFailure { rendered: 2 }.is_success());
        assert!(!PageStatus::InputRejected.is_success());
        assert!(!PageStatus::ResponseFailure.is_success());
    }
}
