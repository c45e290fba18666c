//! Extraction boundary traits for web integration.

use crate::request::RequestMeta;

use super::TaintedInputs;

/// Extracts request metadata from a framework-specific request.
///
/// Implementations map a framework's request id (header, span, generated)
/// into [`RequestMeta`]. They do not validate or decode parameters.
///
/// # Examples
///
/// ```
/// use profile_guard::web::ExtractMetadata;
/// use profile_guard::RequestMeta;
///
/// struct MyFrameworkRequest {
///     trace_id: String,
/// }
///
/// impl ExtractMetadata for MyFrameworkRequest {
///     fn extract_metadata(&self) -> RequestMeta {
///         RequestMeta::new(self.trace_id.clone())
///     }
/// }
/// ```
pub trait ExtractMetadata {
    /// Extracts request metadata for logging correlation.
    fn extract_metadata(&self) -> RequestMeta;
}

/// Extracts tainted inputs from a framework-specific request.
///
/// Every value that crosses the transport boundary MUST come out wrapped in
/// `Tainted<T>`.
///
/// # Examples
///
/// ```
/// use profile_guard::web::{ExtractTaintedInputs, RequestAdapter, TaintedInputs};
/// use std::collections::HashMap;
///
/// struct MyFrameworkRequest {
///     form: HashMap<String, String>,
/// }
///
/// impl ExtractTaintedInputs for MyFrameworkRequest {
///     fn extract_tainted_inputs(&self) -> TaintedInputs {
///         let mut adapter = RequestAdapter::new("req-1".to_string());
///         for (k, v) in &self.form {
///             adapter.add_form_param(k.clone(), v.clone());
///         }
///         adapter.extract_tainted_inputs()
///     }
/// }
/// ```
pub trait ExtractTaintedInputs {
    /// Extracts all untrusted inputs from the request.
    fn extract_tainted_inputs(&self) -> TaintedInputs;
}
