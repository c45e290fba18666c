use std::fmt;

/// A request-scoped logging interface.
///
/// `RequestLog` is obtained from [`RequestMeta::log`](crate::RequestMeta::log)
/// and borrows the request id, so it cannot outlive the request it describes.
/// Every event carries `request_id` as a structured field.
///
/// Log lines describe what happened (operation, counts, error kinds). They do
/// not carry submitted field values; use [`Tainted::byte_len`](crate::Tainted::byte_len)
/// when the size matters.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for a request id. Only `RequestMeta` calls this.
    pub(crate) fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message with request ID.
    ///
    /// ```no_run
    /// # use profile_guard::RequestMeta;
    /// let meta = RequestMeta::new("req-1");
    /// meta.log().info(format_args!("rendered {} records", 2));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs an error-level message with request ID and the error chain.
    pub fn error(&self, error: &(dyn std::error::Error + 'static), args: fmt::Arguments<'_>) {
        tracing::error!(
            request_id = %self.request_id,
            error = %error,
            cause = %ErrorChain(error),
            "{}",
            args
        );
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}

/// Formats an error's `source()` chain as `a: b: c`.
struct ErrorChain<'e>(&'e (dyn std::error::Error + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut source = self.0.source();
        let mut first = true;
        while let Some(err) = source {
            if !first {
                f.write_str(": ")?;
            }
            write!(f, "{}", err)?;
            first = false;
            source = err.source();
        }
        if first {
            f.write_str("<none>")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Outer(io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("outer")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_lists_sources() {
        let err = Outer(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        assert_eq!(ErrorChain(&err).to_string(), "disk on fire");
    }

    #[test]
    fn error_chain_without_source() {
        let err = io::Error::new(io::ErrorKind::Other, "plain");
        assert_eq!(ErrorChain(&err).to_string(), "<none>");
    }

    #[test]
    fn logging_methods_do_not_panic_without_subscriber() {
        let log = RequestLog::new("req-log");
        log.info(format_args!("info {}", 1));
        log.warn(format_args!("warn"));
        log.debug(format_args!("debug"));
        log.error(
            &io::Error::new(io::ErrorKind::Other, "boom"),
            format_args!("error"),
        );
        assert_eq!(log.request_id(), "req-log");
    }
}
