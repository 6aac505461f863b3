use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};
use crate::vfs::{self, split_path};

/// mv [OPTION]... SOURCE... DEST
/// Rename SOURCE to DEST, or move SOURCE(s) to DIRECTORY.
pub struct MvCommand;

const MV_HELP: &str = "Usage: mv [OPTION]... SOURCE DEST\n       mv [OPTION]... SOURCE... DIRECTORY\nRename SOURCE to DEST, or move SOURCE(s) to DIRECTORY.\n\n  -v, --verbose         explain what is being done\n      --help            display this help and exit";

impl Command for MvCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.iter().any(|a| a == "--help") {
            return Ok(MV_HELP.to_string());
        }
        let mut verbose = false;
        let mut operands = vec![];
        for arg in args {
            match arg.as_str() {
                "-v" | "--verbose" => verbose = true,
                "-f" | "--force" => {}
                s if s.starts_with('-') && s.len() > 1 => {
                    return Err(ShellError::usage(format!(
                        "mv: unrecognized option '{}'. Try --help for more info.",
                        s
                    )));
                }
                _ => operands.push(arg.as_str()),
            }
        }

        let (srcs, dst) = match operands.split_last() {
            Some((dst, srcs)) if !srcs.is_empty() => (srcs, *dst),
            _ => return Err(ShellError::usage("mv: missing file operand")),
        };
        if srcs.len() > 1 && !ctx.vfs.is_dir(&ctx.resolve(dst)) {
            return Err(ShellError::fs(format!("mv: target '{}'", dst), FsError::NotADirectory));
        }

        let mut results = Vec::new();
        for src in srcs {
            match mv_one(ctx, src, dst) {
                Ok(target) => {
                    if verbose {
                        results.push(format!("renamed '{}' -> '{}'", src, target));
                    }
                }
                Err(e) => results.push(e.to_string()),
            }
        }
        Ok(results.join("\n"))
    }
}

fn mv_one(ctx: &mut TerminalContext, src: &str, dst: &str) -> Result<String, ShellError> {
    let src_abs = ctx.resolve(src);
    let src_is_dir = match ctx.vfs.resolve_path(&src_abs) {
        Some(node) => node.is_dir(),
        None => return Err(ShellError::fs(format!("mv: cannot stat '{}'", src), FsError::NotFound)),
    };
    // neither the root nor anything holding the working directory may move
    if vfs::is_within(&ctx.cwd, &src_abs) {
        return Err(ShellError::fs(format!("mv: cannot move '{}'", src), FsError::Busy));
    }

    let mut target = ctx.resolve(dst);
    if ctx.vfs.is_dir(&target) {
        let (_, name) = split_path(&src_abs).map_err(|e| ShellError::fs(format!("mv: cannot move '{}'", src), e))?;
        target = vfs::join_path(&target, &name);
    }
    if target == src_abs {
        return Ok(target);
    }
    if src_is_dir && vfs::is_within(&target, &src_abs) {
        return Err(ShellError::usage(format!(
            "mv: cannot move '{}' to a subdirectory of itself, '{}'",
            src, dst
        )));
    }
    if let Some(existing) = ctx.vfs.resolve_path(&target) {
        if existing.is_dir() || src_is_dir {
            return Err(ShellError::fs(format!("mv: cannot overwrite '{}'", target), FsError::AlreadyExists));
        }
    }

    // the destination parent must exist before anything is detached
    let (parent, _) = split_path(&target).map_err(|e| ShellError::fs(format!("mv: cannot move '{}'", src), e))?;
    if !ctx.vfs.is_dir(&parent) {
        return Err(ShellError::fs(
            format!("mv: cannot move '{}' to '{}'", src, dst),
            FsError::NotFound,
        ));
    }

    let mut node = ctx
        .vfs
        .remove(&src_abs)
        .map_err(|e| ShellError::fs(format!("mv: cannot move '{}'", src), e))?;
    node.touch(ctx.clock);
    ctx.vfs
        .insert(&target, node)
        .map_err(|e| ShellError::fs(format!("mv: cannot move '{}' to '{}'", src, dst), e))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{args, ctx};

    #[test]
    fn test_mv_rename() {
        let mut ctx = ctx();
        let content = ctx.vfs.read_file("/readme.txt").unwrap().to_string();
        assert_eq!(MvCommand.execute(&args(&["readme.txt", "notes.txt"]), &mut ctx).unwrap(), "");
        assert!(!ctx.vfs.exists("/readme.txt"));
        assert_eq!(ctx.vfs.read_file("/notes.txt").unwrap(), content);
    }

    #[test]
    fn test_mv_into_directory() {
        let mut ctx = ctx();
        let out = MvCommand.execute(&args(&["-v", "readme.txt", "vault"]), &mut ctx).unwrap();
        assert_eq!(out, "renamed 'readme.txt' -> '/vault/readme.txt'");
        assert!(ctx.vfs.exists("/vault/readme.txt"));
    }

    #[test]
    fn test_mv_missing_source() {
        let mut ctx = ctx();
        let before = ctx.vfs.clone();
        let out = MvCommand.execute(&args(&["ghost", "x"]), &mut ctx).unwrap();
        assert_eq!(out, "mv: cannot stat 'ghost': No such file or directory");
        assert_eq!(ctx.vfs, before);
    }

    #[test]
    fn test_mv_directory_into_itself() {
        let mut ctx = ctx();
        let at = ctx.clock;
        ctx.vfs.create_dir("/vault/inner", at).unwrap();
        let out = MvCommand.execute(&args(&["vault", "vault/inner"]), &mut ctx).unwrap();
        assert_eq!(out, "mv: cannot move 'vault' to a subdirectory of itself, 'vault/inner'");
        assert!(ctx.vfs.is_dir("/vault/inner"));
    }

    #[test]
    fn test_mv_keeps_working_directory() {
        let mut ctx = ctx();
        ctx.cwd = "/vault".to_string();
        let out = MvCommand.execute(&args(&["/vault", "/moved"]), &mut ctx).unwrap();
        assert_eq!(out, "mv: cannot move '/vault': Device or resource busy");
        assert!(ctx.vfs.is_dir("/vault"));
    }

    #[test]
    fn test_mv_missing_destination_parent_keeps_source() {
        let mut ctx = ctx();
        let out = MvCommand.execute(&args(&["readme.txt", "nope/x.txt"]), &mut ctx).unwrap();
        assert_eq!(out, "mv: cannot move 'readme.txt' to 'nope/x.txt': No such file or directory");
        assert!(ctx.vfs.exists("/readme.txt"));
    }

    #[test]
    fn test_mv_missing_operand() {
        let mut ctx = ctx();
        assert!(MvCommand.execute(&args(&["readme.txt"]), &mut ctx).is_err());
    }
}
