//! Request and response bodies for the Account Service. Requests carry
//! passwords and OTPs, so they must never be logged.

use serde::{Deserialize, Serialize};

use super::record::{Gender, Role};

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub contact: &'a str,
    pub street: &'a str,
    pub city: &'a str,
    pub pincode: &'a str,
    pub roles: Role,
    pub age: u8,
    pub gender: Gender,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub new_password: &'a str,
}

/// Envelope the Account Service answers every call with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response_message: Option<String>,
}
