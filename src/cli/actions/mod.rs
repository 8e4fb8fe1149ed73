pub mod recover;
pub mod register;

// Internal "interpreter" for `Action`, kept apart so this module stays small.
mod run;

#[derive(Debug)]
pub enum Action {
    Register(register::Args),
    Recover(recover::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
