//! # airline-accounts
//!
//! Client-side account flows for the airline reservation service: passenger
//! registration and password recovery through a one-time password (OTP).
//!
//! ## Registration
//!
//! A [`RegistrationRecord`](accounts::RegistrationRecord) is filled in field by
//! field, validated locally and only then posted to `/api/user/register`. An
//! invalid record never reaches the network.
//!
//! ## Password Recovery
//!
//! 1. **Request:** The caller submits an email; the Account Service sends an OTP
//!    and the workflow hands back a [`RecoverySession`](accounts::RecoverySession).
//! 2. **Redeem:** The caller passes that session with the OTP and the new
//!    password; on success the user is sent back to the login page.
//!
//! Operations return outcome values (notices and redirects) instead of touching
//! any display, so the embedding shell decides how to present them.

pub mod accounts;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
