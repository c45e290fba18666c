use std::fmt;

/// A wrapper for untrusted request data that must pass a sanitizer before use.
///
/// Every request parameter enters the crate as `Tainted<String>`. The value
/// cannot be bound into a store operation or written into a response until a
/// [`Sanitizer`](crate::Sanitizer) has promoted it to
/// [`Verified<T>`](crate::Verified).
///
/// # Security Properties
///
/// - Does NOT implement `Deref` or any implicit conversion traits
/// - Inner value is inaccessible outside this crate
/// - Store operations and sinks do not accept it
///
/// # Examples
///
/// ```
/// use profile_guard::Tainted;
///
/// let user_id = Tainted::new("a' OR '1'='1".to_string());
///
/// // Debug output marks it as tainted and hides the content
/// assert_eq!(format!("{:?}", user_id), "Tainted { .. }");
///
/// // But the value cannot be used directly:
/// // let sql = format!("SELECT * FROM user_data WHERE user_id = '{}'", user_id); // Won't compile!
/// ```
// Clone is required: a single request value may be admitted by more than one sanitizer.
#[derive(Clone)]
pub struct Tainted<T> {
    // Must stay private. A public field bypasses admission entirely (CWE-20).
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value.
    ///
    /// Use this for anything that arrived over the transport.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Extracts the inner value for sanitization.
    ///
    /// Only sanitizer implementations inside this crate may call this, and
    /// only on the way to building a `Verified<T>`. Widening the visibility
    /// lets raw request text reach SQL and markup (CWE-74, CWE-89, CWE-79).
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

impl Tainted<String> {
    /// Returns the length of the untrusted value in bytes.
    ///
    /// Exposes only the size, never the content, so callers can log request
    /// shape without leaking the value.
    pub fn byte_len(&self) -> usize {
        self.inner.len()
    }
}

// No Deref, AsRef, Borrow, From<T> or Into<T>: any of them lets tainted data
// flow into a store or a response without admission.

// Debug marks the value as tainted without printing it, so request text
// cannot reach logs through `{:?}`.
impl<T> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted").finish_non_exhaustive()
    }
}
