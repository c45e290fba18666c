use crate::Tainted;

use super::TaintedInputs;

/// Parameter carrying the user identifier.
pub const USER_ID_PARAM: &str = "userId";
/// Parameter carrying the new email address.
pub const NEW_EMAIL_PARAM: &str = "newEmail";

/// The two fields of a profile update, still tainted.
///
/// A form-body value takes precedence over a query-string value of the same
/// name. A parameter that is absent from both becomes an empty string, which
/// the handler accepts like any other value.
#[derive(Debug, Clone)]
pub struct ProfileUpdateForm {
    /// Submitted `userId`.
    pub user_id: Tainted<String>,
    /// Submitted `newEmail`.
    pub new_email: Tainted<String>,
}

impl ProfileUpdateForm {
    /// Picks the profile fields out of a request's inputs.
    pub fn from_inputs(inputs: &TaintedInputs) -> Self {
        Self {
            user_id: pick(inputs, USER_ID_PARAM),
            new_email: pick(inputs, NEW_EMAIL_PARAM),
        }
    }
}

fn pick(inputs: &TaintedInputs, name: &str) -> Tainted<String> {
    inputs
        .get_form(name)
        .or_else(|| inputs.get_query(name))
        .unwrap_or_else(|| Tainted::new(String::new()))
}
