use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};
use crate::vfs::VfsNode;

pub struct CdCommand;

impl Command for CdCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        let target_dir = match args {
            // cd with no args goes home, which is the vault root
            [] => "~".to_string(),
            [target] => target.clone(),
            _ => return Err(ShellError::usage("cd: too many arguments")),
        };

        // cd - swaps to previous directory and prints it
        let (new_path, show_path) = if target_dir == "-" {
            match &ctx.oldpwd {
                Some(oldpwd) => (oldpwd.clone(), true),
                None => return Err(ShellError::usage("cd: OLDPWD not set")),
            }
        } else {
            (ctx.resolve(&target_dir), false)
        };

        // cwd only ever moves onto an existing directory
        match ctx.vfs.resolve_path(&new_path) {
            Some(VfsNode::Directory { .. }) => {
                ctx.oldpwd = Some(std::mem::replace(&mut ctx.cwd, new_path.clone()));
                if show_path {
                    Ok(new_path)
                } else {
                    Ok(String::new())
                }
            }
            Some(VfsNode::File { .. }) => Err(ShellError::fs(format!("cd: {}", target_dir), FsError::NotADirectory)),
            None => Err(ShellError::fs(format!("cd: {}", target_dir), FsError::NotFound)),
        }
    }
}
