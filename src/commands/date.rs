use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use chrono::Utc;

/// Wall-clock time. The only command whose output is not a function of the
/// history; it never changes the vault.
pub struct DateCommand;

impl Command for DateCommand {
    fn execute(&self, _args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
        Ok(Utc::now().format("%a %b %e %H:%M:%S UTC %Y").to_string())
    }
}
