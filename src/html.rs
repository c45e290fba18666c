//! Markup-safe fragments for response bodies.
//!
//! [`Html`] is the only type a [`Sink`](crate::Sink) accepts. It can be built
//! in exactly two ways:
//! - [`Html::from_static`] for template text fixed at compile time
//! - [`Html::escape`] for anything else, which encodes the five
//!   HTML-significant characters
//!
//! Stored values are escaped at render time, not at write time. The store
//! holds exactly what was admitted, so nothing gets double-encoded.

use std::fmt;

/// A fragment of markup that is safe to write into an HTML response.
///
/// # Examples
///
/// ```
/// use profile_guard::Html;
///
/// let fragment = Html::escape("<script>alert(1)</script>");
/// assert_eq!(fragment.as_str(), "&lt;script&gt;alert(1)&lt;/script&gt;");
///
/// let tag = Html::from_static("<br>");
/// assert_eq!(tag.as_str(), "<br>");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Html {
    // Private: every value here went through `escape` or is a `'static` literal.
    inner: String,
}

impl Html {
    /// Wraps a compile-time literal as markup.
    ///
    /// Only `&'static str` is accepted, so runtime data cannot come through
    /// here.
    pub fn from_static(markup: &'static str) -> Self {
        Self {
            inner: markup.to_string(),
        }
    }

    /// Encodes text for an HTML element or quoted attribute context.
    ///
    /// `&`, `<`, `>`, `"` and `'` become entities. Everything else passes
    /// through, including control characters, which carry no markup meaning.
    pub fn escape(text: &str) -> Self {
        let mut inner = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => inner.push_str("&amp;"),
                '<' => inner.push_str("&lt;"),
                '>' => inner.push_str("&gt;"),
                '"' => inner.push_str("&quot;"),
                '\'' => inner.push_str("&#x27;"),
                _ => inner.push(ch),
            }
        }
        Self { inner }
    }

    /// Returns the encoded markup.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the encoded markup as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Consumes the fragment and returns the encoded markup.
    pub fn into_string(self) -> String {
        self.inner
    }
}

impl fmt::Debug for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Html").field(&self.inner).finish()
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
