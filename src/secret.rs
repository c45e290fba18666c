use std::fmt;

/// A wrapper that keeps sensitive configuration out of logs.
///
/// Database connection strings routinely carry credentials, so the store
/// location is held as `Secret<String>` from the moment it is read from the
/// environment. Formatting never shows the value. Reading it requires an
/// explicit call to [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use profile_guard::Secret;
///
/// let url = Secret::new("file:/var/lib/profiles.db?mode=rw".to_string());
///
/// assert_eq!(format!("{:?}", url), "[REDACTED]");
/// assert_eq!(format!("{}", url), "[REDACTED]");
/// assert_eq!(url.expose_secret(), "file:/var/lib/profiles.db?mode=rw");
/// ```
// No Clone, Copy or Default: copies of a secret should be deliberate.
pub struct Secret<T> {
    // Must stay private (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// Do not pass the result to a logger or into a response.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T: Clone> Secret<T> {
    /// Makes an explicit copy of the secret.
    ///
    /// Named so that duplicating a secret shows up in review.
    pub fn duplicate_secret(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

// Debug and Display must stay "[REDACTED]" unconditionally, in every build.

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
