use crate::accounts::{Field, RegistrationRecord};
use crate::cli::{
    actions::{recover, register, Action},
    globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};

/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api_url = matches
        .get_one::<String>("api-url")
        .cloned()
        .context("missing required argument: --api-url")?;
    let globals = GlobalArgs::new(api_url);

    match matches.subcommand() {
        Some(("register", sub_m)) => {
            let mut record = RegistrationRecord::new();
            for field in Field::ALL {
                if let Some(value) = sub_m.get_one::<String>(field.as_str()) {
                    record.set(field, value.clone());
                }
            }

            Ok(Action::Register(register::Args { globals, record }))
        }
        Some(("recover", sub_m)) => Ok(Action::Recover(recover::Args {
            globals,
            email: sub_m.get_one::<String>("email").cloned().unwrap_or_default(),
        })),
        Some((name, _)) => Err(anyhow!("unknown subcommand: {name}")),
        None => Err(anyhow!("missing subcommand")),
    }
}
