//! Request adapter for mapping HTTP requests to crate types.

use std::collections::HashMap;

use crate::request::RequestMeta;
use crate::Tainted;

use super::{ExtractMetadata, ExtractTaintedInputs};

/// Framework-agnostic view of an inbound request.
///
/// Holds owned strings only, so framework code can fill it from whatever
/// request type it has. Query-string and form-body parameters are kept
/// apart. Precedence between them is decided by
/// [`ProfileUpdateForm`](super::ProfileUpdateForm), not here.
///
/// # Examples
///
/// ```
/// use profile_guard::web::{ExtractTaintedInputs, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-001".to_string());
/// adapter.add_form_param("userId".to_string(), "bob".to_string());
/// adapter.add_form_param("newEmail".to_string(), "bob@x.com".to_string());
///
/// let inputs = adapter.extract_tainted_inputs();
/// assert!(inputs.form_params().contains_key("userId"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    query_params: HashMap<String, String>,
    form_params: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an adapter with no parameters.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            query_params: HashMap::new(),
            form_params: HashMap::new(),
        }
    }

    /// Adds a query-string parameter. A repeated key keeps the last value.
    pub fn add_query_param(&mut self, key: String, value: String) {
        self.query_params.insert(key, value);
    }

    /// Adds a form-body parameter. A repeated key keeps the last value.
    pub fn add_form_param(&mut self, key: String, value: String) {
        self.form_params.insert(key, value);
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl ExtractMetadata for RequestAdapter {
    fn extract_metadata(&self) -> RequestMeta {
        RequestMeta::new(self.request_id.clone())
    }
}

impl ExtractTaintedInputs for RequestAdapter {
    fn extract_tainted_inputs(&self) -> TaintedInputs {
        TaintedInputs {
            query_params: taint_all(&self.query_params),
            form_params: taint_all(&self.form_params),
        }
    }
}

fn taint_all(params: &HashMap<String, String>) -> HashMap<String, Tainted<String>> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), Tainted::new(v.clone())))
        .collect()
}

/// All untrusted parameters of one request.
///
/// Keys are plain strings (parameter names are compared, never rendered or
/// stored). Values are `Tainted<String>`.
#[derive(Debug, Clone)]
pub struct TaintedInputs {
    query_params: HashMap<String, Tainted<String>>,
    form_params: HashMap<String, Tainted<String>>,
}

impl TaintedInputs {
    /// Returns all query-string parameters.
    pub fn query_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.query_params
    }

    /// Returns all form-body parameters.
    pub fn form_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.form_params
    }

    /// Returns a copy of a query-string parameter.
    pub fn get_query(&self, name: &str) -> Option<Tainted<String>> {
        self.query_params.get(name).cloned()
    }

    /// Returns a copy of a form-body parameter.
    pub fn get_form(&self, name: &str) -> Option<Tainted<String>> {
        self.form_params.get(name).cloned()
    }
}
