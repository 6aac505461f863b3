use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::ShellError;
use crate::vfs::{self, split_path};

/// touch [OPTION]... FILE...
/// Update modification times, creating missing files with placeholder content.
pub struct TouchCommand;

const TOUCH_HELP: &str = "Usage: touch [OPTION]... FILE...\nUpdate the modification time of each FILE to the current time.\nA FILE argument that does not exist is created.\n\n  -c, --no-create    do not create any files\n      --help         display this help and exit";

impl Command for TouchCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        let mut no_create = false;
        let mut files = vec![];
        for arg in args {
            match arg.as_str() {
                "-c" | "--no-create" => no_create = true,
                "--help" => return Ok(TOUCH_HELP.to_string()),
                s if s.starts_with('-') && s.len() > 1 => {}
                _ => files.push(arg),
            }
        }
        if files.is_empty() {
            return Err(ShellError::usage("touch: missing file operand"));
        }

        let at = ctx.clock;
        let mut results = Vec::new();
        for file in files {
            let abs = ctx.resolve(file);
            if let Some(node) = ctx.vfs.resolve_path_mut(&abs) {
                node.touch(at);
                continue;
            }
            if no_create {
                continue;
            }
            let name = match split_path(&abs) {
                Ok((_, name)) => name,
                Err(e) => {
                    results.push(format!("touch: cannot touch '{}': {}", file, e));
                    continue;
                }
            };
            if let Err(e) = ctx.vfs.create_file(&abs, vfs::placeholder_content(&name), at) {
                results.push(format!("touch: cannot touch '{}': {}", file, e));
            }
        }
        Ok(results.join("\n"))
    }
}
