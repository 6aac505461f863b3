use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};

pub struct MkdirCommand;

const HELP: &str = "Usage: mkdir [OPTION]... DIRECTORY...
Create the DIRECTORY(ies), if they do not already exist.

  -p, --parents     make parent directories as needed
  -v, --verbose     print a message for each created directory
      --help        display this help and exit";

impl Command for MkdirCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        let mut paths = vec![];
        let mut parents = false;
        let mut verbose = false;
        for arg in args {
            match arg.as_str() {
                "-p" | "--parents" => parents = true,
                "-v" | "--verbose" => verbose = true,
                "--help" => return Ok(HELP.to_string()),
                s if s.starts_with('-') && s.len() > 1 => {
                    return Err(ShellError::usage(format!(
                        "mkdir: unrecognized option '{}'. Try --help for more info.",
                        s
                    )));
                }
                _ => paths.push(arg),
            }
        }
        if paths.is_empty() {
            return Err(ShellError::usage("mkdir: missing operand"));
        }

        let mut results = Vec::new();
        for path in paths {
            let res = if parents {
                mkdir_parents(ctx, path)
            } else {
                mkdir_single(ctx, path)
            };
            match res {
                Ok(created) => {
                    if verbose {
                        results.extend(created.into_iter().map(|p| format!("mkdir: created directory '{}'", p)));
                    }
                }
                Err(e) => results.push(format!("mkdir: cannot create directory '{}': {}", path, e)),
            }
        }
        Ok(results.join("\n"))
    }
}

/// Create one directory. An existing path is left as it is.
fn mkdir_single(ctx: &mut TerminalContext, path: &str) -> Result<Vec<String>, FsError> {
    let abs = ctx.resolve(path);
    if ctx.vfs.exists(&abs) {
        return Ok(vec![]);
    }
    let at = ctx.clock;
    ctx.vfs.create_dir(&abs, at)?;
    Ok(vec![abs])
}

fn mkdir_parents(ctx: &mut TerminalContext, path: &str) -> Result<Vec<String>, FsError> {
    let abs = ctx.resolve(path);
    let at = ctx.clock;
    let mut created = Vec::new();
    let mut current_path = String::new();

    // walk down the path, creating whatever is missing
    for comp in abs.split('/').filter(|c| !c.is_empty()) {
        current_path = format!("{}/{}", current_path, comp);
        match ctx.vfs.resolve_path(&current_path) {
            Some(node) if node.is_dir() => {}
            Some(_) => return Err(FsError::NotADirectory),
            None => {
                ctx.vfs.create_dir(&current_path, at)?;
                created.push(current_path.clone());
            }
        }
    }
    Ok(created)
}
