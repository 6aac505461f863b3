use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;

/// pwd [OPTION]...
/// Print the full filename of the current working directory.
pub struct PwdCommand;

const PWD_HELP: &str = "Usage: pwd [OPTION]...\nPrint the full filename of the current working directory.\n\n      --help      display this help and exit";

impl Command for PwdCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.iter().any(|a| a == "--help") {
            return Ok(PWD_HELP.to_string());
        }
        // no symlinks in the vault, so -L and -P agree
        Ok(ctx.cwd.clone())
    }
}
