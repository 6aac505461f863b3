use crate::commands;
use crate::context::TerminalContext;
use crate::error::ShellError;
use log::debug;
use std::collections::{BTreeSet, HashMap};

pub type CommandResult = Result<String, ShellError>;

/// Reserved outcomes that the session layer interprets instead of printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    ClearScreen,
    ExitSession,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::ClearScreen => "CLEAR_SCREEN",
            Sentinel::ExitSession => "EXIT_SESSION",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "CLEAR_SCREEN" => Some(Sentinel::ClearScreen),
            "EXIT_SESSION" => Some(Sentinel::ExitSession),
            _ => None,
        }
    }

    /// `clear` / `exit` typed by the user, in any case.
    pub fn from_command(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("clear") {
            Some(Sentinel::ClearScreen)
        } else if line.eq_ignore_ascii_case("exit") {
            Some(Sentinel::ExitSession)
        } else {
            None
        }
    }
}

/// What running one command line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Sentinel(Sentinel),
}

pub trait Command {
    fn execute(&self, args: &[String], ctx: &mut TerminalContext) -> CommandResult;

    /// Session-level commands short-circuit here and never touch the VFS.
    fn sentinel(&self) -> Option<Sentinel> {
        None
    }
}

/// A tokenized command line. Flags stay in `args`; each simulator decides
/// what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub raw: String,
    pub name: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split on runs of whitespace. Blank input has no command.
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        let mut parts = raw.split_whitespace();
        let name = parts.next()?.to_string();
        let args = parts.map(|s| s.to_string()).collect();
        Some(Self {
            raw: raw.to_string(),
            name,
            args,
        })
    }

    pub fn flags(&self) -> BTreeSet<&str> {
        self.args
            .iter()
            .filter(|a| a.starts_with('-') && a.len() > 1)
            .map(String::as_str)
            .collect()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command + Send + Sync>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: HashMap::new() }
    }
    pub fn register_command(&mut self, name: &str, cmd: Box<dyn Command + Send + Sync>) {
        self.commands.insert(name.to_string(), cmd);
    }
    pub fn get(&self, name: &str) -> Option<&(dyn Command + Send + Sync)> {
        self.commands.get(name).map(|c| c.as_ref())
    }
    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }
    pub fn default_commands() -> Self {
        let mut reg = Self::new();
        reg.register_command("ls", Box::new(commands::ls::LsCommand));
        reg.register_command("cd", Box::new(commands::cd::CdCommand));
        reg.register_command("pwd", Box::new(commands::pwd::PwdCommand));
        reg.register_command("mkdir", Box::new(commands::mkdir::MkdirCommand));
        reg.register_command("touch", Box::new(commands::touch::TouchCommand));
        reg.register_command("rm", Box::new(commands::rm::RmCommand));
        reg.register_command("rmdir", Box::new(commands::rmdir::RmdirCommand));
        reg.register_command("cp", Box::new(commands::cp::CpCommand));
        reg.register_command("mv", Box::new(commands::mv::MvCommand));
        reg.register_command("cat", Box::new(commands::cat::CatCommand { name: "cat" }));
        reg.register_command("less", Box::new(commands::cat::CatCommand { name: "less" }));
        reg.register_command("head", Box::new(commands::head::HeadCommand::head()));
        reg.register_command("tail", Box::new(commands::head::HeadCommand::tail()));
        reg.register_command("whoami", Box::new(commands::whoami::WhoamiCommand));
        reg.register_command("date", Box::new(commands::date::DateCommand));
        reg.register_command("clear", Box::new(commands::clear::ClearCommand));
        reg.register_command("exit", Box::new(commands::clear::ExitCommand));
        reg
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::default_commands()
    }
}

/// Run one command line against `ctx`, mutating it in place. Errors become
/// output text; nothing here fails the turn.
pub fn run_command(input: &str, ctx: &mut TerminalContext, registry: &CommandRegistry) -> Outcome {
    let line = match CommandLine::parse(input) {
        Some(line) => line,
        None => return Outcome::Output(String::new()), // empty input = no-op
    };

    let command = match registry.get(&line.name) {
        Some(command) => command,
        None => {
            debug!("unrecognized command '{}'", line.name);
            return Outcome::Output(ShellError::Unrecognized { raw: line.raw }.to_string());
        }
    };

    if let Some(sentinel) = command.sentinel() {
        return Outcome::Sentinel(sentinel);
    }

    ctx.tick();
    match command.execute(&line.args, ctx) {
        Ok(output) => Outcome::Output(output),
        Err(e) => {
            debug!("{} failed: {}", line.name, e);
            Outcome::Output(e.to_string())
        }
    }
}

/// Pure form of `run_command`: the input snapshot is left untouched and the
/// successor snapshot is returned alongside the outcome.
pub fn execute(
    snapshot: &TerminalContext,
    input: &str,
    registry: &CommandRegistry,
) -> (TerminalContext, Outcome) {
    let mut next = snapshot.clone();
    let outcome = run_command(input, &mut next, registry);
    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;

    fn ctx() -> TerminalContext {
        TerminalContext::new(&RouterConfig::default())
    }

    #[test]
    fn test_parse_splits_whitespace_runs() {
        let line = CommandLine::parse("  ls   -l\t-a  docs ").unwrap();
        assert_eq!(line.name, "ls");
        assert_eq!(line.args, vec!["-l", "-a", "docs"]);
        assert_eq!(line.raw, "ls   -l\t-a  docs");
        assert!(line.has_flag("-l"));
        assert_eq!(line.flags().into_iter().collect::<Vec<_>>(), vec!["-a", "-l"]);
    }

    #[test]
    fn test_parse_blank() {
        assert!(CommandLine::parse("   ").is_none());
        assert!(CommandLine::parse("").is_none());
    }

    #[test]
    fn test_empty_input_is_noop() {
        let registry = CommandRegistry::default_commands();
        let start = ctx();
        let (next, outcome) = execute(&start, "   ", &registry);
        assert_eq!(outcome, Outcome::Output(String::new()));
        assert_eq!(next, start);
    }

    #[test]
    fn test_unrecognized_command() {
        let registry = CommandRegistry::default_commands();
        let (next, outcome) = execute(&ctx(), "sudo rm -rf /", &registry);
        assert_eq!(
            outcome,
            Outcome::Output("Simulated execution of 'sudo rm -rf /'. Unrecognized command.".to_string())
        );
        assert_eq!(next, ctx());
    }

    #[test]
    fn test_sentinels_do_not_touch_state() {
        let registry = CommandRegistry::default_commands();
        let start = ctx();
        let (next, outcome) = execute(&start, "clear", &registry);
        assert_eq!(outcome, Outcome::Sentinel(Sentinel::ClearScreen));
        assert_eq!(next, start);
        let (next, outcome) = execute(&start, "exit", &registry);
        assert_eq!(outcome, Outcome::Sentinel(Sentinel::ExitSession));
        assert_eq!(next, start);
    }

    #[test]
    fn test_execute_leaves_input_snapshot_alone() {
        let registry = CommandRegistry::default_commands();
        let start = ctx();
        let (next, outcome) = execute(&start, "mkdir docs", &registry);
        assert_eq!(outcome, Outcome::Output(String::new()));
        assert!(next.vfs.is_dir("/docs"));
        assert!(!start.vfs.exists("/docs"));
    }

    #[test]
    fn test_errors_become_output() {
        let registry = CommandRegistry::default_commands();
        let (next, outcome) = execute(&ctx(), "cd nowhere", &registry);
        assert_eq!(
            outcome,
            Outcome::Output("cd: nowhere: No such file or directory".to_string())
        );
        assert_eq!(next.cwd, "/");
    }

    #[test]
    fn test_sentinel_tokens() {
        assert_eq!(Sentinel::from_command(" CLEAR "), Some(Sentinel::ClearScreen));
        assert_eq!(Sentinel::from_command("Exit"), Some(Sentinel::ExitSession));
        assert_eq!(Sentinel::from_command("exit now"), None);
        assert_eq!(Sentinel::from_token("EXIT_SESSION"), Some(Sentinel::ExitSession));
        assert_eq!(Sentinel::ClearScreen.as_str(), "CLEAR_SCREEN");
    }

    #[test]
    fn test_registry_covers_command_table() {
        let names = CommandRegistry::default_commands().get_command_names();
        for name in [
            "ls", "cd", "pwd", "mkdir", "touch", "rm", "rmdir", "cp", "mv", "cat", "head", "tail", "less",
            "whoami", "date", "clear", "exit",
        ] {
            assert!(names.iter().any(|n| n == name), "missing {}", name);
        }
    }
}
