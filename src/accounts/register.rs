//! Passenger registration: validate locally, then create the account.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};

use super::{
    client::AccountService,
    errors::{AccountError, TransportError},
    record::RegistrationRecord,
    validator::ValidationErrors,
    Redirect, LOGIN_ROUTE,
};

pub const VALIDATION_NOTICE: &str = "Please fix the validation errors!";

const REGISTRATION_FAILED: &str = "Registration Failed!";
const REGISTRATION_SUCCEEDED: &str = "Registration Successful!";
const TRANSPORT_FAILED: &str = "Server Error! Try again later.";

/// Delay before the shell moves on to the login page.
const REDIRECT_DELAY_MS: u64 = 1_000;

/// Terminal result of a single registration attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The record broke at least one field rule; nothing was sent.
    Rejected(ValidationErrors),
    Accepted {
        message: String,
        redirect: Redirect,
    },
    /// The service declined the registration.
    ServiceRejected(String),
    TransportFailed {
        message: &'static str,
        cause: TransportError,
    },
    /// Another submission from this submitter is still outstanding.
    InFlight,
}

impl Outcome {
    /// Text a shell would show for this outcome.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Outcome::Rejected(_) => VALIDATION_NOTICE,
            Outcome::Accepted { message, .. } | Outcome::ServiceRejected(message) => message,
            Outcome::TransportFailed { message, .. } => message,
            Outcome::InFlight => "A registration is already in progress. Please wait.",
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}

/// Clears the in-flight flag when the submission ends or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RegistrationSubmitter<S> {
    service: S,
    in_flight: AtomicBool,
}

impl<S: AccountService> RegistrationSubmitter<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates `record` and, if it passes, registers it with the service.
    #[instrument(skip(self, record))]
    pub async fn submit(&self, record: RegistrationRecord) -> Outcome {
        let registration = match record.into_valid() {
            Ok(registration) => registration,
            Err(errors) => {
                info!(fields = errors.len(), "registration rejected by validation");
                return Outcome::Rejected(errors);
            }
        };

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("registration already in flight");
            return Outcome::InFlight;
        };

        match self.service.register(&registration.request()).await {
            Ok(message) => {
                info!("registration accepted");
                Outcome::Accepted {
                    message: message
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| REGISTRATION_SUCCEEDED.to_string()),
                    redirect: Redirect::new(LOGIN_ROUTE, REDIRECT_DELAY_MS),
                }
            }
            Err(err @ AccountError::Rejected(_)) => {
                let message = err
                    .rejection_message(REGISTRATION_FAILED)
                    .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
                warn!("registration declined: {}", message);
                Outcome::ServiceRejected(message)
            }
            Err(AccountError::Transport(cause)) => {
                warn!("registration failed: {}", cause);
                Outcome::TransportFailed {
                    message: TRANSPORT_FAILED,
                    cause,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{record::Field, test_support::ScriptedService};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn valid_record() -> RegistrationRecord {
        RegistrationRecord::new()
            .with(Field::Name, "Alice")
            .with(Field::Email, "a@b.com")
            .with(Field::Password, "secret")
            .with(Field::Gender, "Male")
            .with(Field::Contact, "9876543210")
            .with(Field::Age, "30")
            .with(Field::Street, "1 Main St")
            .with(Field::City, "Town")
            .with(Field::Pincode, "123456")
    }

    #[tokio::test]
    async fn invalid_record_never_calls_the_service() {
        let submitter = RegistrationSubmitter::new(ScriptedService::default());

        let outcome = submitter
            .submit(valid_record().with(Field::Contact, "12345"))
            .await;

        match &outcome {
            Outcome::Rejected(errors) => assert!(errors.contains(Field::Contact)),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(outcome.message(), "Please fix the validation errors!");
        assert_eq!(submitter.service().calls(), 0);
    }

    #[tokio::test]
    async fn accepted_registration_redirects_to_login() {
        let submitter = RegistrationSubmitter::new(ScriptedService::replying([Ok(Some(
            "User registered successfully".to_string(),
        ))]));

        let outcome = submitter.submit(valid_record()).await;

        assert_eq!(
            outcome,
            Outcome::Accepted {
                message: "User registered successfully".to_string(),
                redirect: Redirect::new("/user/login", 1_000),
            }
        );
        assert_eq!(submitter.service().emails(), vec!["a@b.com".to_string()]);
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn service_rejection_surfaces_message() {
        let submitter = RegistrationSubmitter::new(ScriptedService::replying([Err(
            AccountError::Rejected(Some("Email exists".to_string())),
        )]));

        let outcome = submitter.submit(valid_record()).await;

        assert_eq!(outcome, Outcome::ServiceRejected("Email exists".to_string()));
    }

    #[tokio::test]
    async fn service_rejection_without_message_uses_default() {
        let submitter =
            RegistrationSubmitter::new(ScriptedService::replying([Err(AccountError::Rejected(
                None,
            ))]));

        let outcome = submitter.submit(valid_record()).await;

        assert_eq!(
            outcome,
            Outcome::ServiceRejected("Registration Failed!".to_string())
        );
    }

    #[tokio::test]
    async fn transport_failure_is_generic() {
        let cause = TransportError::Http {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        let submitter = RegistrationSubmitter::new(ScriptedService::replying([Err(
            AccountError::Transport(cause.clone()),
        )]));

        let outcome = submitter.submit(valid_record()).await;

        assert_eq!(outcome.message(), "Server Error! Try again later.");
        assert_eq!(
            outcome,
            Outcome::TransportFailed {
                message: "Server Error! Try again later.",
                cause,
            }
        );
    }

    #[tokio::test]
    async fn concurrent_submit_is_refused() {
        let gate = Arc::new(Notify::new());
        let submitter = RegistrationSubmitter::new(
            ScriptedService::replying([Ok(None)]).gated(Arc::clone(&gate)),
        );

        let (first, second) = tokio::join!(submitter.submit(valid_record()), async {
            tokio::task::yield_now().await;
            let second = submitter.submit(valid_record()).await;
            gate.notify_one();
            second
        });

        assert!(first.is_accepted());
        assert_eq!(second, Outcome::InFlight);
        assert_eq!(submitter.service().calls(), 1);
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn guard_is_released_after_failure() {
        let submitter = RegistrationSubmitter::new(ScriptedService::replying([
            Err(AccountError::Rejected(Some("Email exists".to_string()))),
            Ok(None),
        ]));

        let first = submitter.submit(valid_record()).await;
        let second = submitter.submit(valid_record()).await;

        assert_eq!(first, Outcome::ServiceRejected("Email exists".to_string()));
        assert_eq!(
            second,
            Outcome::Accepted {
                message: "Registration Successful!".to_string(),
                redirect: Redirect::new("/user/login", 1_000),
            }
        );
    }
}
