//! Transport boundary.
//!
//! The web framework is an external collaborator. This module is the thin
//! layer a framework integration fills in:
//! - [`RequestAdapter`] holds raw query and form parameters as plain strings
//! - extraction turns them into [`TaintedInputs`], so nothing leaves the
//!   boundary untainted
//! - [`ProfileUpdateForm`] picks out the two fields the handler needs
//!
//! # Integration Flow
//!
//! ```text
//! HTTP request
//!   -> framework code fills a RequestAdapter
//!   -> ProfileUpdateHandler::handle_request(&adapter, &sink)
//!        -> extract RequestMeta + TaintedInputs
//!        -> ProfileUpdateForm::from_inputs
//!        -> handle(meta, user_id, new_email, sink)
//! ```

mod adapter;
mod extract;
mod form;

pub use adapter::{RequestAdapter, TaintedInputs};
pub use extract::{ExtractMetadata, ExtractTaintedInputs};
pub use form::{ProfileUpdateForm, NEW_EMAIL_PARAM, USER_ID_PARAM};
