use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::{FsError, ShellError};
use crate::vfs::{self, VfsNode};
use chrono::{DateTime, Utc};

pub struct LsCommand;

const LS_HELP: &str = "Usage: ls [OPTION]... [FILE]...\nList information about the FILEs (the current directory by default).\n\n  -a             do not ignore entries starting with .\n  -l             use a long listing format\n  -1             list one file per line\n      --help     display this help and exit";

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn mode_string(node: &VfsNode) -> String {
    let kind = if node.is_dir() { 'd' } else { '-' };
    format!("{}{}", kind, node.permissions().rwx())
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%b %e %H:%M").to_string()
}

impl Command for LsCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.iter().any(|a| a == "--help") {
            return Ok(LS_HELP.to_string());
        }

        let mut show_all = false;
        let mut long = false;
        let mut one_per_line = false;
        let mut paths = vec![];

        for arg in args {
            if arg.starts_with('-') && arg.len() > 1 {
                // combined short flags like -la
                for c in arg.chars().skip(1) {
                    match c {
                        'a' => show_all = true,
                        'l' => long = true,
                        '1' => one_per_line = true,
                        _ => {}
                    }
                }
            } else {
                paths.push(arg.as_str());
            }
        }

        let target = paths.first().copied().unwrap_or(".");
        let path = ctx.resolve(target);
        let node = ctx
            .vfs
            .resolve_path(&path)
            .ok_or_else(|| ShellError::fs(format!("ls: cannot access '{}'", target), FsError::NotFound))?;

        let mut entries: Vec<(String, &VfsNode)> = vec![];
        match node {
            VfsNode::Directory { children, .. } => {
                if show_all {
                    entries.push((".".to_string(), node));
                    let parent = vfs::absolute_path(&path, "..");
                    entries.push(("..".to_string(), ctx.vfs.resolve_path(&parent).unwrap_or(node)));
                }
                // BTreeMap keeps children sorted by name
                for (name, child) in children {
                    if !show_all && is_hidden(name) {
                        continue;
                    }
                    entries.push((name.clone(), child));
                }
            }
            VfsNode::File { .. } => entries.push((target.to_string(), node)),
        }

        let lines: Vec<String> = if long {
            entries
                .iter()
                .map(|(name, node)| {
                    format!(
                        "{} {:>2} {:<8} {:<8} {:>5} {} {}",
                        mode_string(node),
                        1,
                        ctx.identity,
                        "vault",
                        node.size(),
                        format_time(&node.mtime()),
                        name
                    )
                })
                .collect()
        } else {
            entries.iter().map(|(name, _)| name.clone()).collect()
        };

        let separator = if long || one_per_line { "\n" } else { "  " };
        Ok(lines.join(separator))
    }
}
