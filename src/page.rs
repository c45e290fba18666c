//! Response body layout.
//!
//! A page is either one generic error line or a sequence of record lines:
//!
//! ```text
//! User ID: <escaped user id><br>Email: <escaped email><br>
//! ```
//!
//! Error messages are fixed literals and never include driver or input text.

use crate::{Html, Sink, SinkError, UserRecord};

/// Written when request fields fail admission.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input.";
/// Written when the store insert fails.
pub const WRITE_ERROR_MESSAGE: &str = "Error storing user data.";
/// Written when the store query fails.
pub const READ_ERROR_MESSAGE: &str = "Error fetching user data.";

/// Prefix of each record's user id line.
pub const USER_ID_LABEL: &str = "User ID: ";
/// Prefix of each record's email line.
pub const EMAIL_LABEL: &str = "Email: ";
const LINE_BREAK: &str = "<br>";

/// Writes one record as two lines, escaping both stored values.
pub fn render_record(sink: &dyn Sink, record: &UserRecord) -> Result<(), SinkError> {
    sink.sink(&Html::from_static(USER_ID_LABEL))?;
    sink.sink(&Html::escape(&record.user_id))?;
    sink.sink(&Html::from_static(LINE_BREAK))?;
    sink.sink(&Html::from_static(EMAIL_LABEL))?;
    sink.sink(&Html::escape(&record.email))?;
    sink.sink(&Html::from_static(LINE_BREAK))
}

/// Writes a fixed error message.
pub fn render_error(sink: &dyn Sink, message: &'static str) -> Result<(), SinkError> {
    sink.sink(&Html::from_static(message))
}
