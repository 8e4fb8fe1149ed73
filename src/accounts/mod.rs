//! Account flows against the external Account Service.
//!
//! The validator is pure; the recovery workflow and the registration submitter
//! talk to the service only through the [`AccountService`] trait, so a shell can
//! plug in [`HttpAccountService`] or its own implementation.

pub mod client;
pub mod errors;
pub mod record;
pub mod recovery;
pub mod register;
#[cfg(test)]
mod test_support;
pub mod types;
pub mod validator;

use std::time::Duration;

pub use client::{AccountService, HttpAccountService};
pub use errors::{AccountError, TransportError};
pub use record::{Field, Gender, RegistrationRecord, Role, ValidRegistration};
pub use recovery::{
    CredentialRecovery, OtpIssued, RecoveryError, RecoveryPhase, RecoverySession, RecoveryState,
    Redeemed,
};
pub use register::{Outcome, RegistrationSubmitter};
pub use validator::{validate, ValidationErrors};

/// Default Account Service base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Login entry point the shell returns to after registration or a reset.
pub const LOGIN_ROUTE: &str = "/user/login";

/// Page that collects the OTP and the new password.
pub const RESET_PASSWORD_ROUTE: &str = "/reset-password";

/// Navigation the shell should perform once it has shown a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: &'static str,
    pub after: Duration,
}

impl Redirect {
    #[must_use]
    pub const fn new(to: &'static str, after_ms: u64) -> Self {
        Self {
            to,
            after: Duration::from_millis(after_ms),
        }
    }
}
