use crate::accounts::{Outcome, RegistrationRecord, RegistrationSubmitter};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Result};
use tracing::instrument;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub record: RegistrationRecord,
}

/// Handle the register action
/// # Errors
/// Returns an error if the registration is not accepted.
#[instrument(skip(args))]
pub async fn handle(args: Args) -> Result<()> {
    let submitter = RegistrationSubmitter::new(args.globals.account_service()?);

    let outcome = submitter.submit(args.record).await;

    match outcome {
        Outcome::Accepted { message, redirect } => {
            println!("{message}");
            tokio::time::sleep(redirect.after).await;
            println!("Continue at {}", redirect.to);
            Ok(())
        }
        Outcome::Rejected(ref errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            Err(anyhow!("{}", outcome.message()))
        }
        Outcome::TransportFailed { message, cause } => Err(anyhow!(cause).context(message)),
        Outcome::ServiceRejected(_) | Outcome::InFlight => Err(anyhow!("{}", outcome.message())),
    }
}
