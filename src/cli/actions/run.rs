use super::{recover, register, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Register(args) => register::handle(args).await,
        Action::Recover(args) => recover::handle(args).await,
    }
}
