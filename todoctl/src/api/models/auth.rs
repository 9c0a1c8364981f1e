use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::session::SessionToken;
use crate::validation::{Field, Validate, ValidationErrors, Validator};

/// Request to register a new user. Missing fields decode as empty strings and
/// are reported by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterPayload {
    /// Email address (must be unique)
    pub email: String,
    /// At least 6 characters
    pub password: String,
    /// Must equal `password`
    pub confirm_password: String,
    /// At least 3 characters (must be unique)
    pub username: String,
}

impl Validate for RegisterPayload {
    fn validate(&self) -> ValidationErrors {
        let mut v = Validator::new();

        v.required("email", &self.email);
        v.valid_email("email", &self.email);

        v.required("password", &self.password);
        v.min_length("password", &self.password, 6);

        v.required("confirmPassword", &self.confirm_password);
        v.must_match(Field::new("password", &self.password), Field::new("confirmPassword", &self.confirm_password));

        v.required("username", &self.username);
        v.min_length("username", &self.username, 3);

        v.into_errors()
    }
}

/// Request to log in
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl Validate for LoginPayload {
    fn validate(&self) -> ValidationErrors {
        let mut v = Validator::new();
        v.required("email", &self.email);
        v.valid_email("email", &self.email);
        v.required("password", &self.password);
        v.into_errors()
    }
}

/// Response after successful login or registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: SessionToken,
}
