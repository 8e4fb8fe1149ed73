use airline_accounts::cli::{start, telemetry};
use anyhow::Result;

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    let result = action.execute().await;

    telemetry::shutdown_tracer();

    result
}
