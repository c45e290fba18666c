use std::fmt;

use crate::{Tainted, Verified};

/// Default maximum field length in characters.
///
/// 320 is the longest address RFC 3696 allows, and it is generous for an
/// identifier.
pub const DEFAULT_MAX_FIELD_LEN: usize = 320;

/// Error returned when sanitization fails.
///
/// The message describes the violated constraint and never echoes the
/// rejected input.
///
/// # Examples
///
/// ```
/// use profile_guard::{SanitizationError, SanitizationErrorKind};
///
/// let error = SanitizationError::new(SanitizationErrorKind::TooLong, "value too long");
/// assert_eq!(error.kind(), SanitizationErrorKind::TooLong);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationError {
    kind: SanitizationErrorKind,
    message: String,
}

impl SanitizationError {
    /// Creates a new sanitization error.
    pub fn new(kind: SanitizationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SanitizationErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SanitizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sanitization failed ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for SanitizationError {}

/// Kind of sanitization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizationErrorKind {
    /// Input exceeds the maximum allowed length.
    TooLong,
}

impl fmt::Display for SanitizationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "input too long"),
        }
    }
}

/// Trait for promoting tainted values into verified values.
///
/// # Invariants
///
/// Implementations MUST:
/// - Check the input against their rules before calling `Verified::new_unchecked`
/// - Return `Err(SanitizationError)` if a rule fails
/// - Not leak the input in errors
pub trait Sanitizer<T> {
    /// Sanitizes a tainted value, returning a verified value on success.
    ///
    /// # Errors
    ///
    /// Returns `SanitizationError` if the input fails validation.
    fn sanitize(&self, input: Tainted<T>) -> Result<Verified<T>, SanitizationError>;
}

/// Admits request fields as store bind parameters.
///
/// Bind parameters are never parsed as SQL, so content is not restricted:
/// empty strings, quotes, semicolons and markup are all accepted and kept
/// byte-for-byte, NUL included. The sanitizer does not trim. The only rule
/// is a length cap of `max_len` characters.
///
/// Output safety is a separate concern handled by [`Html`](crate::Html) at
/// render time.
///
/// # Examples
///
/// ```
/// use profile_guard::{FieldSanitizer, Sanitizer, Tainted};
///
/// let sanitizer = FieldSanitizer::new(64);
///
/// // Hostile-looking input is admitted unchanged
/// let verified = sanitizer
///     .sanitize(Tainted::new("a' OR '1'='1".to_string()))
///     .expect("quotes are fine in a bind parameter");
/// assert_eq!(verified.as_ref(), "a' OR '1'='1");
///
/// // Empty input is admitted
/// assert!(sanitizer.sanitize(Tainted::new(String::new())).is_ok());
///
/// // NUL is bound with an explicit length and kept
/// let verified = sanitizer.sanitize(Tainted::new("a\0b".to_string())).unwrap();
/// assert_eq!(verified.as_str(), "a\0b");
///
/// // Over-length input is refused
/// assert!(sanitizer.sanitize(Tainted::new("x".repeat(65))).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSanitizer {
    max_len: usize,
}

impl FieldSanitizer {
    /// Creates a field sanitizer with the given maximum length in characters.
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is 0.
    pub fn new(max_len: usize) -> Self {
        assert!(max_len > 0, "max_len must be greater than 0");
        Self { max_len }
    }

    /// Creates a field sanitizer with [`DEFAULT_MAX_FIELD_LEN`].
    pub fn default_limits() -> Self {
        Self::new(DEFAULT_MAX_FIELD_LEN)
    }

    /// Returns the configured maximum length in characters.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for FieldSanitizer {
    fn default() -> Self {
        Self::default_limits()
    }
}

impl Sanitizer<String> for FieldSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, SanitizationError> {
        let raw = input.into_inner();

        // Byte length bounds char count from above, so skip the walk for short input.
        if raw.len() > self.max_len && raw.chars().count() > self.max_len {
            return Err(SanitizationError::new(
                SanitizationErrorKind::TooLong,
                format!("input exceeds maximum length of {}", self.max_len),
            ));
        }

        Ok(Verified::new_unchecked(raw))
    }
}
