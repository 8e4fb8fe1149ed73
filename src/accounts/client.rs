//! Account Service access. [`AccountService`] is the seam the recovery workflow
//! and the registration submitter call through; [`HttpAccountService`] speaks
//! JSON over HTTP to the real service. Request bodies contain secrets and are
//! never logged; only the method and URL are recorded on the span.

use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::Serialize;
use std::future::Future;
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

use super::{
    errors::{AccountError, TransportError},
    types::{ForgotPasswordRequest, RegisterRequest, ResetPasswordRequest, ServiceReply},
};
use crate::APP_USER_AGENT;

pub const REGISTER_PATH: &str = "/api/user/register";
pub const FORGOT_PASSWORD_PATH: &str = "/api/user/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/api/user/reset-password";

/// Maximum number of error body characters kept in a transport error.
const MAX_ERROR_CHARS: usize = 200;

/// Calls exposed by the Account Service.
///
/// `Ok` carries the service message of a successful reply. A reply with
/// `success: false` is [`AccountError::Rejected`]; anything without an
/// interpretable reply is [`AccountError::Transport`].
pub trait AccountService {
    fn register(
        &self,
        request: &RegisterRequest<'_>,
    ) -> impl Future<Output = Result<Option<String>, AccountError>> + Send;

    fn forgot_password(
        &self,
        request: &ForgotPasswordRequest<'_>,
    ) -> impl Future<Output = Result<Option<String>, AccountError>> + Send;

    fn reset_password(
        &self,
        request: &ResetPasswordRequest<'_>,
    ) -> impl Future<Output = Result<Option<String>, AccountError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpAccountService {
    client: Client,
    base_url: String,
}

impl HttpAccountService {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is not an absolute http(s) URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| TransportError::Config(format!("Failed to build client: {err}")))?;

        Self::with_client(client, base_url)
    }

    /// Creates a service using an existing reqwest client.
    ///
    /// # Errors
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, TransportError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    /// Posts a JSON body and interprets the reply envelope.
    ///
    /// With `rejections_in_error_body`, a non-2xx response whose body is a
    /// `success: false` envelope counts as a rejection instead of a transport
    /// failure.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        rejections_in_error_body: bool,
    ) -> Result<Option<String>, AccountError> {
        let url = self.endpoint(path);

        let span = info_span!("account_service.post", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_request_error)?;

        debug!("{} replied {}", url, status);

        interpret_reply(status, &text, rejections_in_error_body)
    }
}

impl AccountService for HttpAccountService {
    async fn register(&self, request: &RegisterRequest<'_>) -> Result<Option<String>, AccountError> {
        self.post(REGISTER_PATH, request, true).await
    }

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest<'_>,
    ) -> Result<Option<String>, AccountError> {
        self.post(FORGOT_PASSWORD_PATH, request, false).await
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest<'_>,
    ) -> Result<Option<String>, AccountError> {
        self.post(RESET_PASSWORD_PATH, request, false).await
    }
}

fn parse_base_url(base_url: &str) -> Result<String, TransportError> {
    let trimmed = base_url.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| TransportError::Config(format!("Invalid API URL '{trimmed}': {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(TransportError::Config(format!(
                "Invalid API URL '{trimmed}': unsupported scheme {scheme}"
            )));
        }
    }

    if url.host().is_none() {
        return Err(TransportError::Config(format!(
            "Invalid API URL '{trimmed}': no host specified"
        )));
    }

    Ok(trimmed.to_string())
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn interpret_reply(
    status: StatusCode,
    body: &str,
    rejections_in_error_body: bool,
) -> Result<Option<String>, AccountError> {
    if status.is_success() {
        let reply: ServiceReply = serde_json::from_str(body).map_err(|err| {
            TransportError::Parse(format!("Failed to decode response: {err}"))
        })?;

        return if reply.success {
            Ok(reply.response_message)
        } else {
            Err(AccountError::Rejected(reply.response_message))
        };
    }

    if rejections_in_error_body {
        if let Ok(reply) = serde_json::from_str::<ServiceReply>(body) {
            if !reply.success {
                return Err(AccountError::Rejected(reply.response_message));
            }
        }
    }

    warn!("account service returned {}", status);

    Err(AccountError::Transport(TransportError::Http {
        status: status.as_u16(),
        message: sanitize_body(body),
    }))
}

/// Maps reqwest errors into transport variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AccountError {
    let transport = if err.is_timeout() {
        TransportError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        TransportError::Serialization(format!("Failed to build request: {err}"))
    } else if err.is_decode() || err.is_body() {
        TransportError::Parse(format!("Failed to read response: {err}"))
    } else {
        TransportError::Network(format!("Unable to reach the server: {err}"))
    };

    AccountError::Transport(transport)
}

/// Trims and truncates error bodies before they reach the caller.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_without_double_slashes() {
        assert_eq!(
            build_url_with_base("http://localhost:8080/", "/api/user/register"),
            "http://localhost:8080/api/user/register"
        );
        assert_eq!(
            build_url_with_base("https://api.example.com/gateway", "api/user/reset-password"),
            "https://api.example.com/gateway/api/user/reset-password"
        );
        assert_eq!(build_url_with_base("  ", "/api"), "/api");
    }

    #[test]
    fn parse_base_url_rejects_bad_input() {
        assert!(parse_base_url("http://localhost:8080").is_ok());
        assert!(matches!(
            parse_base_url("localhost:8080"),
            Err(TransportError::Config(_))
        ));
        assert!(matches!(
            parse_base_url("ftp://files.example.com"),
            Err(TransportError::Config(_))
        ));
        assert!(matches!(parse_base_url(""), Err(TransportError::Config(_))));
    }

    #[test]
    fn interpret_success_reply() {
        let result = interpret_reply(
            StatusCode::OK,
            r#"{"success":true,"responseMessage":"Registered"}"#,
            false,
        );
        assert_eq!(result, Ok(Some("Registered".to_string())));
    }

    #[test]
    fn interpret_declined_reply() {
        let result = interpret_reply(
            StatusCode::OK,
            r#"{"success":false,"responseMessage":"Invalid OTP"}"#,
            false,
        );
        assert_eq!(
            result,
            Err(AccountError::Rejected(Some("Invalid OTP".to_string())))
        );
    }

    #[test]
    fn interpret_undecodable_success_body() {
        let result = interpret_reply(StatusCode::OK, "<html>", false);
        assert!(matches!(
            result,
            Err(AccountError::Transport(TransportError::Parse(_)))
        ));
    }

    #[test]
    fn interpret_error_status_is_transport_failure() {
        let body = r#"{"success":false,"responseMessage":"User not found"}"#;
        let result = interpret_reply(StatusCode::NOT_FOUND, body, false);
        assert_eq!(
            result,
            Err(AccountError::Transport(TransportError::Http {
                status: 404,
                message: body.to_string(),
            }))
        );
    }

    #[test]
    fn interpret_error_status_with_rejection_body() {
        let result = interpret_reply(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"responseMessage":"Email exists"}"#,
            true,
        );
        assert_eq!(
            result,
            Err(AccountError::Rejected(Some("Email exists".to_string())))
        );

        let result = interpret_reply(StatusCode::INTERNAL_SERVER_ERROR, "  ", true);
        assert_eq!(
            result,
            Err(AccountError::Transport(TransportError::Http {
                status: 500,
                message: "Request failed.".to_string(),
            }))
        );
    }

    #[test]
    fn sanitize_body_truncates() {
        let long = "x".repeat(MAX_ERROR_CHARS + 50);
        assert_eq!(sanitize_body(&long).chars().count(), MAX_ERROR_CHARS);
    }
}
