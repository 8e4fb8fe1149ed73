//! Password recovery through a one-time password.
//!
//! Phase one asks the Account Service to send an OTP to an email and yields a
//! [`RecoverySession`]. Phase two redeems that session with the OTP and a new
//! password. The workflow allows one outstanding call at a time; a second
//! submit while a call is pending is refused rather than queued.
//!
//! Transport failures during phase one are reported with a single message that
//! does not say whether the email is registered. The underlying cause stays
//! available through [`std::error::Error::source`] for logging.

use secrecy::{ExposeSecret, SecretString};
use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, info, instrument, warn};
use ulid::Ulid;

use super::{
    client::AccountService,
    errors::{AccountError, TransportError},
    types::{ForgotPasswordRequest, ResetPasswordRequest},
    Redirect, LOGIN_ROUTE, RESET_PASSWORD_ROUTE,
};

pub const OTP_SENT_NOTICE: &str = "OTP Sent Successfully!";
pub const RESET_DONE_NOTICE: &str = "Password Reset Successful!";

const OTP_REQUEST_FAILED: &str = "OTP request failed!";
const RESET_FAILED: &str = "Password Reset Failed!";
const OTP_TRANSPORT_FAILED: &str = "Server Error or Email Not Found!";
const RESET_TRANSPORT_FAILED: &str = "Server Error!";

/// Delay before the shell moves on after a recovery notice.
const REDIRECT_DELAY_MS: u64 = 1_500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryPhase {
    Issuance,
    Redemption,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryState {
    Idle,
    AwaitingOtpIssuance,
    OtpIssued,
    AwaitingRedemption,
    Completed,
    Failed(RecoveryPhase),
}

impl RecoveryState {
    #[must_use]
    pub fn is_awaiting(self) -> bool {
        matches!(
            self,
            RecoveryState::AwaitingOtpIssuance | RecoveryState::AwaitingRedemption
        )
    }
}

/// Hand-off from phase one to phase two. Only a successful OTP request
/// creates one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverySession {
    id: Ulid,
    email: String,
}

impl RecoverySession {
    fn new(email: &str) -> Self {
        Self {
            id: Ulid::new(),
            email: email.to_string(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// The email exactly as it was submitted in phase one.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug)]
pub struct OtpIssued {
    pub session: RecoverySession,
    pub notice: &'static str,
    pub redirect: Redirect,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Redeemed {
    pub notice: &'static str,
    pub redirect: Redirect,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RecoveryError {
    /// A required input was empty; nothing was sent.
    MissingField(&'static str),
    /// A call from this workflow is still outstanding.
    InFlight,
    /// Redemption without a live session issued by this workflow.
    NoSession,
    AlreadyCompleted,
    /// The service declined the request.
    Rejected(String),
    /// No interpretable reply; `message` is what the user should see.
    Transport {
        message: &'static str,
        cause: TransportError,
    },
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryError::MissingField(field) => write!(formatter, "{field} is required!"),
            RecoveryError::InFlight => {
                write!(formatter, "A request is already in progress. Please wait.")
            }
            RecoveryError::NoSession => {
                write!(formatter, "Request a new OTP before resetting the password.")
            }
            RecoveryError::AlreadyCompleted => {
                write!(formatter, "Password has already been reset.")
            }
            RecoveryError::Rejected(message) => formatter.write_str(message),
            RecoveryError::Transport { message, .. } => formatter.write_str(message),
        }
    }
}

impl std::error::Error for RecoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecoveryError::Transport { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Inner {
    state: RecoveryState,
    // id of the session handed out by the last successful OTP request
    session: Option<Ulid>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a call as outstanding. Dropping it before `finish` puts the workflow
/// back where it was, so an abandoned call leaves no trace.
struct PendingCall<'a> {
    inner: &'a Mutex<Inner>,
    previous: Option<Inner>,
}

impl PendingCall<'_> {
    fn previous_session(&self) -> Option<Ulid> {
        self.previous.and_then(|previous| previous.session)
    }

    fn finish(mut self, state: RecoveryState, session: Option<Ulid>) {
        self.previous = None;
        let mut inner = lock(self.inner);
        inner.state = state;
        inner.session = session;
    }
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            debug!("recovery call abandoned, restoring {:?}", previous.state);
            *lock(self.inner) = previous;
        }
    }
}

/// Two-phase password recovery against an [`AccountService`].
pub struct CredentialRecovery<S> {
    service: S,
    inner: Mutex<Inner>,
}

impl<S: AccountService> CredentialRecovery<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner {
                state: RecoveryState::Idle,
                session: None,
            }),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn state(&self) -> RecoveryState {
        lock(&self.inner).state
    }

    /// Drops any issued session and returns to `Idle`.
    pub fn abandon(&self) {
        let mut inner = lock(&self.inner);
        inner.state = RecoveryState::Idle;
        inner.session = None;
    }

    /// Asks the service to send an OTP to `email`.
    ///
    /// # Errors
    /// Returns an error if the email is empty, a call is already outstanding,
    /// the recovery already completed, or the service did not issue an OTP.
    #[instrument(skip(self, email))]
    pub async fn request_otp(&self, email: &str) -> Result<OtpIssued, RecoveryError> {
        if email.trim().is_empty() {
            return Err(RecoveryError::MissingField("email"));
        }

        let pending = self.begin(RecoveryState::AwaitingOtpIssuance, |inner| {
            match inner.state {
                RecoveryState::Idle | RecoveryState::OtpIssued | RecoveryState::Failed(_) => {
                    Ok(())
                }
                RecoveryState::Completed => Err(RecoveryError::AlreadyCompleted),
                RecoveryState::AwaitingOtpIssuance | RecoveryState::AwaitingRedemption => {
                    Err(RecoveryError::InFlight)
                }
            }
        })?;

        let result = self
            .service
            .forgot_password(&ForgotPasswordRequest { email })
            .await;

        match result {
            Ok(_) => {
                let session = RecoverySession::new(email);
                pending.finish(RecoveryState::OtpIssued, Some(session.id));
                info!(session = %session.id, "OTP issued");

                Ok(OtpIssued {
                    session,
                    notice: OTP_SENT_NOTICE,
                    redirect: Redirect::new(RESET_PASSWORD_ROUTE, REDIRECT_DELAY_MS),
                })
            }
            Err(err) => {
                // a failed re-send leaves the OTP issued earlier redeemable
                let session = pending.previous_session();
                pending.finish(RecoveryState::Failed(RecoveryPhase::Issuance), session);
                Err(failure(err, RecoveryPhase::Issuance))
            }
        }
    }

    /// Redeems `otp` for `session` and sets `new_password`.
    ///
    /// # Errors
    /// Returns an error if an input is empty, `session` is not the live session
    /// of this workflow, a call is already outstanding, or the service did not
    /// reset the password.
    #[instrument(skip(self, session, otp, new_password), fields(session_id = %session.id))]
    pub async fn redeem(
        &self,
        session: &RecoverySession,
        otp: &SecretString,
        new_password: &SecretString,
    ) -> Result<Redeemed, RecoveryError> {
        if otp.expose_secret().is_empty() {
            return Err(RecoveryError::MissingField("otp"));
        }
        if new_password.expose_secret().is_empty() {
            return Err(RecoveryError::MissingField("newPassword"));
        }

        let pending = self.begin(RecoveryState::AwaitingRedemption, |inner| {
            match inner.state {
                RecoveryState::AwaitingOtpIssuance | RecoveryState::AwaitingRedemption => {
                    Err(RecoveryError::InFlight)
                }
                RecoveryState::Completed => Err(RecoveryError::AlreadyCompleted),
                RecoveryState::OtpIssued | RecoveryState::Failed(_)
                    if inner.session == Some(session.id) =>
                {
                    Ok(())
                }
                _ => Err(RecoveryError::NoSession),
            }
        })?;

        let request = ResetPasswordRequest {
            email: session.email(),
            otp: otp.expose_secret(),
            new_password: new_password.expose_secret(),
        };
        let result = self.service.reset_password(&request).await;

        match result {
            Ok(_) => {
                pending.finish(RecoveryState::Completed, None);
                info!("password reset");

                Ok(Redeemed {
                    notice: RESET_DONE_NOTICE,
                    redirect: Redirect::new(LOGIN_ROUTE, REDIRECT_DELAY_MS),
                })
            }
            Err(err) => {
                pending.finish(
                    RecoveryState::Failed(RecoveryPhase::Redemption),
                    Some(session.id),
                );
                Err(failure(err, RecoveryPhase::Redemption))
            }
        }
    }

    /// Moves to `next` if `check` allows it, remembering the current state.
    fn begin(
        &self,
        next: RecoveryState,
        check: impl FnOnce(&Inner) -> Result<(), RecoveryError>,
    ) -> Result<PendingCall<'_>, RecoveryError> {
        let mut inner = lock(&self.inner);
        check(&inner)?;

        let previous = *inner;
        inner.state = next;

        Ok(PendingCall {
            inner: &self.inner,
            previous: Some(previous),
        })
    }
}

fn failure(err: AccountError, phase: RecoveryPhase) -> RecoveryError {
    let (default, transport_message) = match phase {
        RecoveryPhase::Issuance => (OTP_REQUEST_FAILED, OTP_TRANSPORT_FAILED),
        RecoveryPhase::Redemption => (RESET_FAILED, RESET_TRANSPORT_FAILED),
    };

    match err {
        AccountError::Rejected(message) => {
            let message = message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| default.to_string());
            warn!("{:?} rejected: {}", phase, message);
            RecoveryError::Rejected(message)
        }
        AccountError::Transport(cause) => {
            warn!("{:?} failed: {}", phase, cause);
            RecoveryError::Transport {
                message: transport_message,
                cause,
            }
        }
    }
}
