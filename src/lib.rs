//! Injection-safe profile update handling.
//!
//! A profile update request carries two untrusted fields, `userId` and
//! `newEmail`. This crate stores the pair and renders every record for that
//! user back as HTML, with the types arranged so that neither SQL injection
//! nor markup injection can be written by accident:
//!
//! - **Taint tracking**: request values arrive as [`Tainted<T>`] and can only
//!   be unwrapped by a [`Sanitizer`], which yields [`Verified<T>`]
//! - **Parameterized storage**: a [`RecordStore`] accepts only verified values
//!   and binds them as statement parameters
//! - **Escaped output**: a [`Sink`] accepts only [`Html`], which is either a
//!   static literal or the escaped form of a string
//! - **Generic failures**: store errors become fixed messages in the page and
//!   structured events in the log
//!
//! # Core Types
//!
//! - [`ProfileUpdateHandler`]: runs one request end to end
//! - [`SqliteStore`]: the shipped [`RecordStore`]
//! - [`FieldSanitizer`]: admission rules for request fields
//! - [`Secret<T>`]: redacts the store connection string in logs and output
//!
//! # Examples
//!
//! ```no_run
//! use profile_guard::{HandlerConfig, ProfileUpdateHandler, RequestMeta, Tainted};
//!
//! let config = HandlerConfig::from_env()?;
//! let handler = ProfileUpdateHandler::from_config(&config);
//! handler.store().initialize()?;
//!
//! let page = handler.handle_to_page(
//!     &RequestMeta::generate(),
//!     Tainted::new("bob".to_string()),
//!     Tainted::new("<b>bob</b>@x.com".to_string()),
//! );
//! assert!(page.body.contains("&lt;b&gt;bob&lt;/b&gt;@x.com"));
//! # Ok::<(), profile_guard::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handler;
mod html;
mod logging;
pub mod page;
mod request;
mod sanitizer;
mod secret;
mod sink;
mod store;
mod tainted;
#[cfg(test)]
mod test_utils;
mod verified;
pub mod web;

pub use config::{
    ConfigError, HandlerConfig, StoreConfig, DEFAULT_BUSY_TIMEOUT, ENV_BUSY_TIMEOUT_MS,
    ENV_DATABASE_URL, ENV_MAX_FIELD_LEN,
};
pub use error::Error;
pub use handler::{PageStatus, ProfileUpdateHandler, RenderedPage};
pub use html::Html;
pub use logging::RequestLog;
pub use request::RequestMeta;
pub use sanitizer::{
    FieldSanitizer, SanitizationError, SanitizationErrorKind, Sanitizer, DEFAULT_MAX_FIELD_LEN,
};
pub use secret::Secret;
pub use sink::{Sink, SinkError, SinkErrorKind, VecSink, WriterSink};
pub use store::{BoxError, RecordStore, SqliteStore, StoreError, UserRecord};
pub use tainted::Tainted;
pub use verified::Verified;
