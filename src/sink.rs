use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::Write;

use crate::{Html, Tainted};

/// Error returned when writing to a response sink fails.
///
/// # Examples
///
/// ```
/// use profile_guard::{SinkError, SinkErrorKind};
///
/// let error = SinkError::new(SinkErrorKind::Unescaped);
/// assert_eq!(error.kind(), SinkErrorKind::Unescaped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    kind: SinkErrorKind,
    message: Option<String>,
}

impl SinkError {
    /// Creates a new sink error with the specified kind.
    pub fn new(kind: SinkErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a new sink error with a custom message.
    pub fn with_message(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SinkErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "sink error ({}): {}", self.kind, msg)
        } else {
            write!(f, "sink error ({})", self.kind)
        }
    }
}

impl std::error::Error for SinkError {}

/// Kind of sink error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// Raw text was offered without output encoding.
    Unescaped,
    /// The underlying writer failed.
    Io,
}

impl fmt::Display for SinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unescaped => write!(f, "unescaped output"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

/// A response body that accepts only encoded markup.
///
/// The `sink` method takes `&Html`, so neither a raw `String` nor a
/// `Tainted<String>` can be written into a response:
///
/// ```compile_fail
/// use profile_guard::{Sink, VecSink};
///
/// let sink = VecSink::new();
/// sink.sink(&"<script>".to_string()); // Type mismatch!
/// ```
///
/// Implementations write each fragment as it arrives. Output is incremental,
/// not atomic: fragments written before a failure stay written.
// The signature of `sink` must keep taking `&Html`. Widening it to `&str`
// or `&T` lets stored text reach the response unencoded (CWE-79).
pub trait Sink {
    /// Writes an encoded fragment to the response.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the underlying transport fails.
    fn sink(&self, fragment: &Html) -> Result<(), SinkError>;

    /// Attempts to write untrusted text (always fails).
    ///
    /// This is the runtime counterpart of the compile-time rule: tainted text
    /// is refused with `SinkErrorKind::Unescaped` and nothing is written.
    ///
    /// ```
    /// use profile_guard::{Sink, SinkErrorKind, Tainted, VecSink};
    ///
    /// let sink = VecSink::new();
    /// let result = sink.sink_untrusted(Tainted::new("<b>".to_string()));
    /// assert_eq!(result.unwrap_err().kind(), SinkErrorKind::Unescaped);
    /// assert!(sink.is_empty());
    /// ```
    fn sink_untrusted(&self, _value: Tainted<String>) -> Result<(), SinkError> {
        Err(SinkError::new(SinkErrorKind::Unescaped))
    }
}

/// A sink over any `std::io::Write`, flushing after every fragment.
///
/// This is the transport-facing sink: wrap stdout, a socket, or a response
/// body writer. Flushing per fragment is what makes partial output visible
/// to the client when a later step fails.
///
/// # Examples
///
/// ```
/// use profile_guard::{Html, Sink, WriterSink};
///
/// let sink = WriterSink::new(Vec::new());
/// sink.sink(&Html::escape("a & b")).unwrap();
///
/// assert_eq!(sink.into_inner(), b"a &amp; b");
/// ```
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: RefCell<W>,
    bytes_written: Cell<usize>,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
            bytes_written: Cell::new(0),
        }
    }

    /// Returns the number of bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written.get()
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn sink(&self, fragment: &Html) -> Result<(), SinkError> {
        let mut writer = self.writer.borrow_mut();
        writer
            .write_all(fragment.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| SinkError::with_message(SinkErrorKind::Io, e.to_string()))?;
        self.bytes_written
            .set(self.bytes_written.get() + fragment.as_bytes().len());
        Ok(())
    }
}

/// A sink that collects fragments in memory.
///
/// Used to build a [`RenderedPage`](crate::RenderedPage) and for tests.
///
/// # Examples
///
/// ```
/// use profile_guard::{Html, Sink, VecSink};
///
/// let sink = VecSink::new();
/// sink.sink(&Html::from_static("User ID: ")).unwrap();
/// sink.sink(&Html::escape("<bob>")).unwrap();
///
/// assert_eq!(sink.len(), 2);
/// assert_eq!(sink.body(), "User ID: &lt;bob&gt;");
/// ```
#[derive(Debug, Default)]
pub struct VecSink {
    fragments: RefCell<Vec<Html>>,
}

impl VecSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            fragments: RefCell::new(Vec::new()),
        }
    }

    /// Returns the number of fragments written.
    pub fn len(&self) -> usize {
        self.fragments.borrow().len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.fragments.borrow().is_empty()
    }

    /// Provides borrowed access to the fragments.
    pub fn with_fragments<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Html]) -> R,
    {
        f(&self.fragments.borrow())
    }

    /// Returns the concatenated body written so far.
    pub fn body(&self) -> String {
        self.fragments
            .borrow()
            .iter()
            .map(Html::as_str)
            .collect()
    }

    /// Consumes the sink and returns the concatenated body.
    pub fn into_body(self) -> String {
        self.fragments
            .into_inner()
            .into_iter()
            .map(Html::into_string)
            .collect()
    }
}

impl Sink for VecSink {
    fn sink(&self, fragment: &Html) -> Result<(), SinkError> {
        self.fragments.borrow_mut().push(fragment.clone());
        Ok(())
    }
}
