use crate::accounts::{CredentialRecovery, RecoveryError};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{instrument, warn};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
}

/// Handle the recover action
/// # Errors
/// Returns an error if no OTP could be issued or input ends before the
/// password was reset.
#[instrument(skip(args))]
pub async fn handle(args: Args) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    recover(&args, &mut lines).await
}

async fn recover<R: AsyncBufRead + Unpin>(args: &Args, lines: &mut Lines<R>) -> Result<()> {
    let recovery = CredentialRecovery::new(args.globals.account_service()?);

    let issued = recovery.request_otp(&args.email).await?;
    println!("{}", issued.notice);
    tokio::time::sleep(issued.redirect.after).await;

    // The user stays on the reset step until it succeeds or input ends.
    loop {
        let Some(otp) = prompt(lines, "Enter OTP: ").await? else {
            break;
        };
        let Some(new_password) = prompt(lines, "Enter New Password: ").await? else {
            break;
        };

        match recovery.redeem(&issued.session, &otp, &new_password).await {
            Ok(redeemed) => {
                println!("{}", redeemed.notice);
                tokio::time::sleep(redeemed.redirect.after).await;
                println!("Continue at {}", redeemed.redirect.to);
                return Ok(());
            }
            Err(err @ (RecoveryError::MissingField(_)
            | RecoveryError::Rejected(_)
            | RecoveryError::Transport { .. })) => {
                warn!("reset attempt failed: {:?}", err);
                eprintln!("{err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    recovery.abandon();
    Err(anyhow!("password reset abandoned"))
}

/// Reads one line as a secret. `None` means input ended.
async fn prompt<R: AsyncBufRead + Unpin>(
    lines: &mut Lines<R>,
    label: &str,
) -> Result<Option<SecretString>> {
    print!("{label}");
    std::io::stdout().flush()?;

    let line = lines.next_line().await?;
    Ok(line.map(|value| SecretString::from(value.trim_end_matches('\r').to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    async fn account_service() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/user/forgot-password"))
            .and(body_json(json!({"email": "user@x.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/user/reset-password"))
            .and(body_json(json!({
                "email": "user@x.com",
                "otp": "000000",
                "newPassword": "pw"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "responseMessage": "Invalid OTP"
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/user/reset-password"))
            .and(body_json(json!({
                "email": "user@x.com",
                "otp": "424242",
                "newPassword": "pw"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        server
    }

    fn args(server: &MockServer) -> Args {
        Args {
            globals: GlobalArgs::new(server.uri()),
            email: "user@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn prompt_reads_lines_until_eof() -> Result<()> {
        let mut lines = BufReader::new(&b"123456\r\nnew-password\n"[..]).lines();

        let otp = prompt(&mut lines, "Enter OTP: ").await?;
        assert_eq!(otp.as_ref().map(|s| s.expose_secret()), Some("123456"));

        let password = prompt(&mut lines, "Enter New Password: ").await?;
        assert_eq!(
            password.as_ref().map(|s| s.expose_secret()),
            Some("new-password")
        );

        assert!(prompt(&mut lines, "Enter OTP: ").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn recover_fails_fast_on_empty_email() {
        let args = Args {
            globals: GlobalArgs::new("http://127.0.0.1:9".to_string()),
            email: String::new(),
        };
        let mut lines = BufReader::new(&b""[..]).lines();

        let err = recover(&args, &mut lines).await.unwrap_err();
        assert_eq!(err.to_string(), "email is required!");
    }

    #[tokio::test]
    async fn recover_retries_after_rejected_otp() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = account_service().await;
        let mut lines = BufReader::new(&b"000000\npw\n424242\npw\n"[..]).lines();

        recover(&args(&server), &mut lines).await?;

        let requests = server.received_requests().await.unwrap_or_default();
        let resets = requests
            .iter()
            .filter(|request| request.url.path() == "/api/user/reset-password")
            .count();
        assert_eq!(resets, 2);
        Ok(())
    }

    #[tokio::test]
    async fn recover_is_abandoned_when_input_ends() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = account_service().await;
        let mut lines = BufReader::new(&b"000000\npw\n424242\n"[..]).lines();

        let err = recover(&args(&server), &mut lines).await.unwrap_err();

        assert_eq!(err.to_string(), "password reset abandoned");
        Ok(())
    }
}
