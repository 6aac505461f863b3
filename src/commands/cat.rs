use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::ShellError;

/// `cat` and `less`. There is no pager, so `less` prints like `cat`.
pub struct CatCommand {
    pub name: &'static str,
}

impl Command for CatCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        let mut number_lines = false;
        let mut files = Vec::new();
        for arg in args {
            match arg.as_str() {
                "-n" | "--number" => number_lines = true,
                s if s.starts_with('-') && s.len() > 1 => {}
                _ => files.push(arg),
            }
        }

        if files.is_empty() {
            return Err(ShellError::usage(format!("Usage: {} <filename>", self.name)));
        }

        let mut sections = Vec::new();
        for file in files {
            let path = ctx.resolve(file);
            match ctx.vfs.read_file(&path) {
                Ok(content) => sections.push(content.trim_end_matches('\n').to_string()),
                Err(e) => sections.push(format!("{}: {}: {}", self.name, file, e)),
            }
        }

        let output = sections.join("\n");
        if number_lines {
            Ok(output
                .lines()
                .enumerate()
                .map(|(i, line)| format!("{:>6}\t{}", i + 1, line))
                .collect::<Vec<_>>()
                .join("\n"))
        } else {
            Ok(output)
        }
    }
}
