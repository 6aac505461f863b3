// decides command (private) vs chat (public) for one utterance
// a sentence that only starts with a command word stays chat

use crate::command::Sentinel;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Command names that may open a Private Mode utterance.
pub const RECOGNIZED_COMMANDS: &[&str] = &[
    "ls", "cd", "pwd", "mkdir", "rmdir", "touch", "cp", "mv", "rm", "cat", "less", "head", "tail", "whoami", "date",
];

/// Commands that never take operands; an operand means prose.
const NO_OPERAND_COMMANDS: &[&str] = &["pwd", "whoami", "date"];

/// Words that read as English when they show up as operands.
const PROSE_WORDS: &[&str] = &[
    "the", "an", "is", "are", "was", "were", "am", "be", "been", "to", "of", "for", "with", "about", "my", "your",
    "our", "their", "me", "you", "we", "they", "it", "this", "that", "these", "those", "what", "how", "why", "when",
    "where", "who", "please", "can", "could", "would", "should", "will", "and", "or", "but", "do", "does", "did",
    "not", "some", "any", "like", "on", "in", "at", "from", "into", "if", "so", "than", "then", "just", "really",
];

static PROSE_WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| PROSE_WORDS.iter().copied().collect());

/// Sentence punctuation: a trailing `?`/`!`, a word ending in a full stop, or
/// a comma/semicolon followed by a space.
static PROSE_PUNCTUATION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?:[?!]\s*$)|(?:[A-Za-z]\.\s*$)|(?:[,;]\s)").ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// General chat, answered by the language model without vault access.
    Public,
    /// A terminal command line to run against the session's vault.
    Private { command: String },
}

impl Mode {
    pub fn is_private(&self) -> bool {
        matches!(self, Mode::Private { .. })
    }

    /// `clear` / `exit`, which the session layer handles itself.
    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            Mode::Private { command } => Sentinel::from_command(command),
            Mode::Public => None,
        }
    }
}

/// Classify one utterance. Total and deterministic.
pub fn classify(utterance: &str) -> Mode {
    let trimmed = utterance.trim();

    if let Some(sentinel) = Sentinel::from_command(trimmed) {
        let command = match sentinel {
            Sentinel::ClearScreen => "clear",
            Sentinel::ExitSession => "exit",
        };
        return Mode::Private {
            command: command.to_string(),
        };
    }

    let mut tokens = trimmed.split_whitespace();
    let first = match tokens.next() {
        Some(first) => first,
        None => return Mode::Public,
    };
    if !RECOGNIZED_COMMANDS.contains(&first) {
        return Mode::Public;
    }

    let operands: Vec<&str> = tokens.filter(|t| !(t.starts_with('-') && t.len() > 1)).collect();
    if let Some(reason) = prose_signal(first, &operands, trimmed) {
        debug!("'{}' reads as prose ({}), staying in public mode", first, reason);
        return Mode::Public;
    }

    Mode::Private {
        command: trimmed.to_string(),
    }
}

/// Convenience for surfaces that only need the yes/no answer.
pub fn is_command(utterance: &str) -> bool {
    classify(utterance).is_private()
}

fn prose_signal(first: &str, operands: &[&str], line: &str) -> Option<&'static str> {
    if NO_OPERAND_COMMANDS.contains(&first) && !operands.is_empty() {
        return Some("operand on a no-operand command");
    }
    if (*PROSE_PUNCTUATION).as_ref().map_or(false, |re| re.is_match(line)) {
        return Some("sentence punctuation");
    }
    if operands
        .iter()
        .any(|op| PROSE_WORD_SET.contains(op.to_ascii_lowercase().as_str()))
    {
        return Some("english function word");
    }
    None
}
