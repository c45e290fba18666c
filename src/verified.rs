/// A wrapper for data that has passed a sanitizer and may be bound into a
/// store operation.
///
/// `Verified<T>` is proof that a value went through a controlled admission
/// path. [`RecordStore`](crate::RecordStore) methods accept only
/// `&Verified<String>`, so a raw request parameter cannot be handed to the
/// store by accident.
///
/// Note that `Verified` means "admitted as a bind parameter", not "safe to
/// emit as markup". Rendering always goes through [`Html::escape`](crate::Html::escape).
///
/// # Construction Invariants
///
/// There is no public constructor and no `From<T>`. Only the sanitizers in
/// this crate call `new_unchecked`.
///
/// ```compile_fail
/// use profile_guard::Verified;
///
/// // No public constructor:
/// let verified = Verified::new("data".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Creates a `Verified<T>` without performing validation.
    ///
    /// Callers inside the crate are responsible for having validated the
    /// value first.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the `Verified<T>` and returns the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl Verified<String> {
    /// Borrows the verified value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}
