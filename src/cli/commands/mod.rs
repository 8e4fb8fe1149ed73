use crate::accounts::{Field, DEFAULT_API_URL};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn field_help(field: Field) -> &'static str {
    match field {
        Field::Name => "Passenger name",
        Field::Email => "Email address",
        Field::Password => "Account password (at least 6 characters)",
        Field::Gender => "Gender: Male or Female",
        Field::Contact => "Contact number, exactly 10 digits",
        Field::Age => "Age in years (1 - 100)",
        Field::Street => "Street address",
        Field::City => "City",
        Field::Pincode => "Pincode, exactly 6 digits",
    }
}

// Fields default to empty so the registration rules report what is missing.
fn register_command() -> Command {
    Field::ALL.into_iter().fold(
        Command::new("register").about("Register a new passenger account"),
        |command, field| {
            let arg = Arg::new(field.as_str())
                .long(field.as_str())
                .help(field_help(field))
                .default_value("");

            let arg = if field == Field::Password {
                arg.env("AIRLINE_ACCOUNTS_PASSWORD").hide_env_values(true)
            } else {
                arg
            };

            command.arg(arg)
        },
    )
}

fn recover_command() -> Command {
    Command::new("recover")
        .about("Reset a forgotten password with a one-time password sent by email")
        .long_about(
            "Requests an OTP for the given email, then reads the OTP and the new \
             password from standard input, one per line.",
        )
        .arg(
            Arg::new("email")
                .long("email")
                .help("Registered email address")
                .default_value(""),
        )
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("airline-accounts")
        .about("Airline passenger accounts")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .short('u')
                .long("api-url")
                .help("Account Service base URL")
                .default_value(DEFAULT_API_URL)
                .env("AIRLINE_ACCOUNTS_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("AIRLINE_ACCOUNTS_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(register_command())
        .subcommand(recover_command())
}
