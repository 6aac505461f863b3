use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};
use crate::vfs::{self, split_path};

pub struct CpCommand;

const CP_HELP: &str = "Usage: cp [OPTION]... SOURCE DEST\n       cp [OPTION]... SOURCE... DIRECTORY\nCopy SOURCE to DEST, or multiple SOURCE(s) to DIRECTORY.\n\n  -R, -r, --recursive   copy directories recursively\n  -v, --verbose         explain what is being done\n      --help            display this help and exit";

impl Command for CpCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.iter().any(|a| a == "--help") {
            return Ok(CP_HELP.to_string());
        }

        let mut recursive = false;
        let mut verbose = false;
        let mut operands = vec![];
        for arg in args {
            match arg.as_str() {
                "-r" | "-R" | "--recursive" => recursive = true,
                "-v" | "--verbose" => verbose = true,
                "-f" | "--force" => {}
                s if s.starts_with('-') && s.len() > 1 => {
                    return Err(ShellError::usage(format!(
                        "cp: unrecognized option '{}'. Try --help for more info.",
                        s
                    )));
                }
                _ => operands.push(arg.as_str()),
            }
        }

        let (srcs, dst) = match operands.split_last() {
            Some((dst, srcs)) if !srcs.is_empty() => (srcs, *dst),
            _ => return Err(ShellError::usage("cp: missing file operand")),
        };
        let dst_abs = ctx.resolve(dst);
        if srcs.len() > 1 && !ctx.vfs.is_dir(&dst_abs) {
            return Err(ShellError::fs(format!("cp: target '{}'", dst), FsError::NotADirectory));
        }

        let mut results = Vec::new();
        for src in srcs {
            match cp_one(ctx, src, dst, recursive) {
                Ok(target) => {
                    if verbose {
                        results.push(format!("'{}' -> '{}'", src, target));
                    }
                }
                Err(e) => results.push(e.to_string()),
            }
        }
        Ok(results.join("\n"))
    }
}

/// Copy `src` to `dst` (or into `dst` when it is a directory). Returns the
/// absolute path written.
fn cp_one(ctx: &mut TerminalContext, src: &str, dst: &str, recursive: bool) -> Result<String, ShellError> {
    let src_abs = ctx.resolve(src);
    let node = ctx
        .vfs
        .resolve_path(&src_abs)
        .ok_or_else(|| ShellError::fs(format!("cp: cannot stat '{}'", src), FsError::NotFound))?;
    if node.is_dir() && !recursive {
        return Err(ShellError::usage(format!("cp: -r not specified; omitting directory '{}'", src)));
    }

    let mut target = ctx.resolve(dst);
    if ctx.vfs.is_dir(&target) {
        let (_, name) = split_path(&src_abs).map_err(|e| ShellError::fs(format!("cp: cannot copy '{}'", src), e))?;
        target = vfs::join_path(&target, &name);
    }

    if target == src_abs {
        return Err(ShellError::usage(format!("cp: '{}' and '{}' are the same file", src, dst)));
    }
    if node.is_dir() && vfs::is_within(&target, &src_abs) {
        return Err(ShellError::usage(format!(
            "cp: cannot copy a directory, '{}', into itself, '{}'",
            src, dst
        )));
    }
    if let Some(existing) = ctx.vfs.resolve_path(&target) {
        if existing.is_dir() && !node.is_dir() {
            return Err(ShellError::usage(format!(
                "cp: cannot overwrite directory '{}' with non-directory",
                target
            )));
        }
    }

    let mut copy = node.clone();
    copy.touch(ctx.clock);
    ctx.vfs
        .insert(&target, copy)
        .map_err(|e| ShellError::fs(format!("cp: cannot create '{}'", dst), e))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{args, ctx};

    #[test]
    fn test_cp_file() {
        let mut ctx = ctx();
        assert_eq!(CpCommand.execute(&args(&["readme.txt", "copy.txt"]), &mut ctx).unwrap(), "");
        assert_eq!(
            ctx.vfs.read_file("/copy.txt").unwrap(),
            ctx.vfs.read_file("/readme.txt").unwrap()
        );
        assert_eq!(ctx.vfs.resolve_path("/copy.txt").unwrap().name(), "copy.txt");
    }

    #[test]
    fn test_cp_into_directory() {
        let mut ctx = ctx();
        let out = CpCommand.execute(&args(&["-v", "readme.txt", "vault"]), &mut ctx).unwrap();
        assert_eq!(out, "'readme.txt' -> '/vault/readme.txt'");
        assert!(ctx.vfs.exists("/vault/readme.txt"));
        assert!(ctx.vfs.exists("/readme.txt"));
    }

    #[test]
    fn test_cp_missing_source() {
        let mut ctx = ctx();
        let before = ctx.vfs.clone();
        let out = CpCommand.execute(&args(&["ghost.txt", "x.txt"]), &mut ctx).unwrap();
        assert_eq!(out, "cp: cannot stat 'ghost.txt': No such file or directory");
        assert_eq!(ctx.vfs, before);
    }

    #[test]
    fn test_cp_directory_requires_recursive() {
        let mut ctx = ctx();
        let out = CpCommand.execute(&args(&["vault", "backup"]), &mut ctx).unwrap();
        assert_eq!(out, "cp: -r not specified; omitting directory 'vault'");
        CpCommand.execute(&args(&["-r", "vault", "backup"]), &mut ctx).unwrap();
        assert!(ctx.vfs.exists("/backup/contacts.json"));
    }

    #[test]
    fn test_cp_directory_into_itself() {
        let mut ctx = ctx();
        let out = CpCommand.execute(&args(&["-r", "vault", "vault"]), &mut ctx).unwrap();
        assert_eq!(out, "cp: cannot copy a directory, 'vault', into itself, 'vault'");
    }

    #[test]
    fn test_cp_missing_operand() {
        let mut ctx = ctx();
        let err = CpCommand.execute(&args(&["readme.txt"]), &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "cp: missing file operand");
    }

    #[test]
    fn test_cp_missing_destination_parent() {
        let mut ctx = ctx();
        let out = CpCommand.execute(&args(&["readme.txt", "nope/x.txt"]), &mut ctx).unwrap();
        assert_eq!(out, "cp: cannot create 'nope/x.txt': No such file or directory");
    }
}
