use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};
use crate::vfs::{self, VfsNode};

/// rm [OPTION]... [FILE]...
/// Remove files or directories. Missing operands are ignored.
pub struct RmCommand;

const RM_HELP: &str = "Usage: rm [OPTION]... [FILE]...\nRemove (unlink) the FILE(s).\n\n  -f, --force           ignore nonexistent files and arguments, never prompt\n  -r, -R, --recursive   remove directories and their contents recursively\n  -d, --dir             remove empty directories\n  -v, --verbose         explain what is being done\n      --help            display this help and exit";

impl Command for RmCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.iter().any(|a| a == "--help") {
            return Ok(RM_HELP.to_string());
        }
        let mut recursive = false;
        let mut verbose = false;
        let mut dir_mode = false;
        let mut files = vec![];
        for arg in args {
            match arg.as_str() {
                "--force" => {}
                "--recursive" => recursive = true,
                "--dir" => dir_mode = true,
                "--verbose" => verbose = true,
                s if s.starts_with('-') && s.len() > 1 && !s.starts_with("--") => {
                    // short flags may be combined, as in -rf
                    for c in s.chars().skip(1) {
                        match c {
                            'r' | 'R' => recursive = true,
                            'd' => dir_mode = true,
                            'v' => verbose = true,
                            _ => {} // -f, -i and friends change nothing here
                        }
                    }
                }
                s if s.starts_with("--") => {}
                _ => files.push(arg),
            }
        }
        if files.is_empty() {
            return Err(ShellError::usage("rm: missing operand"));
        }

        let mut results = Vec::new();
        for file in files {
            match remove_one(ctx, file, recursive, dir_mode) {
                Ok(true) => {
                    if verbose {
                        results.push(format!("removed '{}'", file));
                    }
                }
                // nothing there, nothing to do
                Ok(false) => {}
                Err(e) => results.push(e.to_string()),
            }
        }
        Ok(results.join("\n"))
    }
}

fn remove_one(ctx: &mut TerminalContext, file: &str, recursive: bool, dir_mode: bool) -> Result<bool, ShellError> {
    let abs = ctx.resolve(file);
    let context = || format!("rm: cannot remove '{}'", file);
    match ctx.vfs.resolve_path(&abs) {
        None => return Ok(false),
        Some(VfsNode::Directory { children, .. }) => {
            if !recursive && !(dir_mode && children.is_empty()) {
                return Err(ShellError::fs(context(), FsError::IsADirectory));
            }
            // the working directory has to survive
            if vfs::is_within(&ctx.cwd, &abs) {
                return Err(ShellError::fs(context(), FsError::Busy));
            }
        }
        Some(VfsNode::File { .. }) => {}
    }
    ctx.vfs.remove(&abs).map_err(|e| ShellError::fs(context(), e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{args, ctx};

    #[test]
    fn test_rm_file() {
        let mut ctx = ctx();
        assert_eq!(RmCommand.execute(&args(&["readme.txt"]), &mut ctx).unwrap(), "");
        assert!(!ctx.vfs.exists("/readme.txt"));
    }

    #[test]
    fn test_rm_nonexistent_is_noop() {
        let mut ctx = ctx();
        let before = ctx.vfs.clone();
        assert_eq!(RmCommand.execute(&args(&["nonexistent"]), &mut ctx).unwrap(), "");
        assert_eq!(ctx.vfs, before);
    }

    #[test]
    fn test_rm_directory_needs_recursive() {
        let mut ctx = ctx();
        let out = RmCommand.execute(&args(&["vault"]), &mut ctx).unwrap();
        assert_eq!(out, "rm: cannot remove 'vault': Is a directory");
        assert!(ctx.vfs.is_dir("/vault"));
        assert_eq!(RmCommand.execute(&args(&["-rf", "vault"]), &mut ctx).unwrap(), "");
        assert!(!ctx.vfs.exists("/vault"));
    }

    #[test]
    fn test_rm_dir_flag_on_empty_directory() {
        let mut ctx = ctx();
        let at = ctx.clock;
        ctx.vfs.create_dir("/empty", at).unwrap();
        RmCommand.execute(&args(&["-d", "empty"]), &mut ctx).unwrap();
        assert!(!ctx.vfs.exists("/empty"));
    }

    #[test]
    fn test_rm_refuses_working_directory() {
        let mut ctx = ctx();
        ctx.cwd = "/vault".to_string();
        let out = RmCommand.execute(&args(&["-r", "/vault"]), &mut ctx).unwrap();
        assert_eq!(out, "rm: cannot remove '/vault': Device or resource busy");
        assert!(ctx.vfs.is_dir("/vault"));
    }

    #[test]
    fn test_rm_verbose() {
        let mut ctx = ctx();
        let out = RmCommand.execute(&args(&["-v", "readme.txt", "ghost"]), &mut ctx).unwrap();
        assert_eq!(out, "removed 'readme.txt'");
    }

    #[test]
    fn test_rm_missing_operand() {
        let mut ctx = ctx();
        assert_eq!(
            RmCommand.execute(&args(&["-f"]), &mut ctx),
            Err(ShellError::usage("rm: missing operand"))
        );
    }
}
