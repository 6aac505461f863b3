use crate::command::{Command, CommandResult, Sentinel};
use crate::context::TerminalContext;

pub struct ClearCommand;

impl Command for ClearCommand {
    fn execute(&self, _args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
        Ok(String::new())
    }

    fn sentinel(&self) -> Option<Sentinel> {
        Some(Sentinel::ClearScreen)
    }
}

pub struct ExitCommand;

impl Command for ExitCommand {
    fn execute(&self, _args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
        Ok(String::new())
    }

    fn sentinel(&self) -> Option<Sentinel> {
        Some(Sentinel::ExitSession)
    }
}
