use crate::command::{Command, CommandResult};
use crate::context::TerminalContext;
use crate::error::ShellError;

const DEFAULT_LINES: usize = 10;

/// `head` and `tail`: the first or last lines of a file.
pub struct HeadCommand {
    name: &'static str,
    from_end: bool,
}

impl HeadCommand {
    pub fn head() -> Self {
        Self { name: "head", from_end: false }
    }

    pub fn tail() -> Self {
        Self { name: "tail", from_end: true }
    }

    fn parse_count(&self, raw: &str) -> Result<usize, ShellError> {
        raw.parse::<usize>()
            .map_err(|_| ShellError::usage(format!("{}: invalid number of lines: '{}'", self.name, raw)))
    }
}

impl Command for HeadCommand {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        let mut count = DEFAULT_LINES;
        let mut files = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-n" | "--lines" => match iter.next() {
                    Some(raw) => count = self.parse_count(raw)?,
                    None => {
                        return Err(ShellError::usage(format!(
                            "{}: option requires an argument -- 'n'",
                            self.name
                        )))
                    }
                },
                s if s.starts_with("-n") => count = self.parse_count(&s[2..])?,
                s if s.starts_with("--lines=") => count = self.parse_count(&s[8..])?,
                // -5 is shorthand for -n 5
                s if s.len() > 1 && s.starts_with('-') && s[1..].chars().all(|c| c.is_ascii_digit()) => {
                    count = self.parse_count(&s[1..])?
                }
                s if s.starts_with('-') && s.len() > 1 => {}
                _ => files.push(arg),
            }
        }

        if files.is_empty() {
            return Err(ShellError::usage(format!("Usage: {} <filename>", self.name)));
        }

        let show_headers = files.len() > 1;
        let mut sections = Vec::new();
        for file in files {
            let path = ctx.resolve(file);
            let content = match ctx.vfs.read_file(&path) {
                Ok(content) => content,
                Err(e) => {
                    sections.push(format!("{}: cannot open '{}' for reading: {}", self.name, file, e));
                    continue;
                }
            };
            let lines: Vec<&str> = content.lines().collect();
            let selected = if self.from_end {
                &lines[lines.len().saturating_sub(count)..]
            } else {
                &lines[..count.min(lines.len())]
            };
            let body = selected.join("\n");
            if show_headers {
                sections.push(format!("==> {} <==\n{}", file, body));
            } else {
                sections.push(body);
            }
        }
        Ok(sections.join("\n"))
    }
}
