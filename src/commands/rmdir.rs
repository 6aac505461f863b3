use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};
use crate::vfs::{self, VfsNode};

/// rmdir [OPTION]... DIRECTORY...
/// Remove the DIRECTORY(ies), if they are empty. Missing ones are ignored.
pub struct RmdirCommand;

const RMDIR_HELP: &str = "Usage: rmdir [OPTION]... DIRECTORY...\nRemove the DIRECTORY(ies), if they are empty.\n\n      --ignore-fail-on-non-empty  ignore each failure to remove a non-empty directory\n  -p, --parents                   remove DIRECTORY and its ancestors\n  -v, --verbose                   output a diagnostic for every directory processed\n      --help                      display this help and exit";

impl Command for RmdirCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.iter().any(|a| a == "--help") {
            return Ok(RMDIR_HELP.to_string());
        }

        let mut ignore_fail_on_non_empty = false;
        let mut parents = false;
        let mut verbose = false;
        let mut dirs = vec![];
        for arg in args {
            match arg.as_str() {
                "--ignore-fail-on-non-empty" => ignore_fail_on_non_empty = true,
                "-p" | "--parents" => parents = true,
                "-v" | "--verbose" => verbose = true,
                s if s.starts_with('-') && s.len() > 1 => {
                    return Err(ShellError::usage(format!(
                        "rmdir: unrecognized option '{}'. Try --help for more info.",
                        s
                    )));
                }
                _ => dirs.push(arg),
            }
        }
        if dirs.is_empty() {
            return Err(ShellError::usage("rmdir: missing operand"));
        }

        let mut results = Vec::new();
        for dir in dirs {
            let mut current = ctx.resolve(dir);
            let mut shown = dir.to_string();
            loop {
                match try_remove_dir(ctx, &current) {
                    Ok(true) => {
                        if verbose {
                            results.push(format!("rmdir: removing directory, '{}'", shown));
                        }
                        if !parents {
                            break;
                        }
                        // -p walks up through the ancestors named by the operand
                        match shown.trim_end_matches('/').rsplit_once('/') {
                            Some((parent, _)) if !parent.is_empty() => {
                                shown = parent.to_string();
                                current = ctx.resolve(&shown);
                            }
                            _ => break,
                        }
                    }
                    Ok(false) => break,
                    Err(FsError::NotEmpty) if ignore_fail_on_non_empty => break,
                    Err(e) => {
                        results.push(format!("rmdir: failed to remove '{}': {}", shown, e));
                        break;
                    }
                }
            }
        }
        Ok(results.join("\n"))
    }
}

/// Remove `path` if it is an empty directory. `Ok(false)` when absent.
fn try_remove_dir(ctx: &mut TerminalContext, path: &str) -> Result<bool, FsError> {
    match ctx.vfs.resolve_path(path) {
        None => Ok(false),
        Some(VfsNode::File { .. }) => Err(FsError::NotADirectory),
        Some(VfsNode::Directory { children, .. }) if !children.is_empty() => Err(FsError::NotEmpty),
        Some(VfsNode::Directory { .. }) => {
            if vfs::is_within(&ctx.cwd, path) {
                return Err(FsError::Busy);
            }
            ctx.vfs.remove(path)?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{args, ctx};

    #[test]
    fn test_rmdir_empty() {
        let mut ctx = ctx();
        let at = ctx.clock;
        ctx.vfs.create_dir("/empty", at).unwrap();
        assert_eq!(RmdirCommand.execute(&args(&["empty"]), &mut ctx).unwrap(), "");
        assert!(!ctx.vfs.exists("/empty"));
    }

    #[test]
    fn test_rmdir_nonexistent_is_noop() {
        let mut ctx = ctx();
        let before = ctx.vfs.clone();
        assert_eq!(RmdirCommand.execute(&args(&["ghost"]), &mut ctx).unwrap(), "");
        assert_eq!(ctx.vfs, before);
    }

    #[test]
    fn test_rmdir_non_empty() {
        let mut ctx = ctx();
        let out = RmdirCommand.execute(&args(&["vault"]), &mut ctx).unwrap();
        assert_eq!(out, "rmdir: failed to remove 'vault': Directory not empty");
        let out = RmdirCommand
            .execute(&args(&["--ignore-fail-on-non-empty", "vault"]), &mut ctx)
            .unwrap();
        assert_eq!(out, "");
        assert!(ctx.vfs.is_dir("/vault"));
    }

    #[test]
    fn test_rmdir_file() {
        let mut ctx = ctx();
        let out = RmdirCommand.execute(&args(&["readme.txt"]), &mut ctx).unwrap();
        assert_eq!(out, "rmdir: failed to remove 'readme.txt': Not a directory");
    }

    #[test]
    fn test_rmdir_parents() {
        let mut ctx = ctx();
        let at = ctx.clock;
        ctx.vfs.create_dir("/a", at).unwrap();
        ctx.vfs.create_dir("/a/b", at).unwrap();
        RmdirCommand.execute(&args(&["-p", "a/b"]), &mut ctx).unwrap();
        assert!(!ctx.vfs.exists("/a"));
    }

    #[test]
    fn test_rmdir_parents_trailing_slash() {
        let mut ctx = ctx();
        let at = ctx.clock;
        ctx.vfs.create_dir("/a", at).unwrap();
        ctx.vfs.create_dir("/a/b", at).unwrap();
        assert_eq!(RmdirCommand.execute(&args(&["-p", "a/b/"]), &mut ctx).unwrap(), "");
        assert!(!ctx.vfs.exists("/a"));
    }

    #[test]
    fn test_rmdir_working_directory() {
        let mut ctx = ctx();
        let at = ctx.clock;
        ctx.vfs.create_dir("/empty", at).unwrap();
        ctx.cwd = "/empty".to_string();
        let out = RmdirCommand.execute(&args(&["/empty"]), &mut ctx).unwrap();
        assert_eq!(out, "rmdir: failed to remove '/empty': Device or resource busy");
    }
}
