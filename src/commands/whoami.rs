use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;

pub struct WhoamiCommand;

impl Command for WhoamiCommand {
    fn execute(&self, _args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        Ok(ctx.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::ctx;

    #[test]
    fn test_whoami() {
        let mut ctx = ctx();
        assert_eq!(WhoamiCommand.execute(&[], &mut ctx).unwrap(), "vault-user");
    }
}
