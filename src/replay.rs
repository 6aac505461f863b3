// rebuilds the vault by replaying user commands from history
// bot turns are effects, not causes - never replayed

use crate::classifier::{classify, Mode};
use crate::command::{run_command, CommandRegistry};
use crate::config::RouterConfig;
use crate::context::TerminalContext;
use crate::session::{Sender, Turn};
use log::debug;

/// Command lines worth replaying, oldest first. `clear`/`exit` never touch
/// the vault and are left out.
pub fn replayable_commands(history: &[Turn]) -> Vec<String> {
    history
        .iter()
        .filter(|turn| turn.sender == Sender::User)
        .map(|turn| classify(&turn.text))
        .filter(|mode| mode.sentinel().is_none())
        .filter_map(|mode| match mode {
            Mode::Private { command } => Some(command),
            Mode::Public => None,
        })
        .collect()
}

fn replay_onto(ctx: &mut TerminalContext, commands: &[String], registry: &CommandRegistry) {
    for command in commands {
        // output was already shown when the command first ran
        let _ = run_command(command, ctx, registry);
    }
}

/// Full replay of `history` from the seed.
pub fn reconstruct(history: &[Turn], config: &RouterConfig, registry: &CommandRegistry) -> TerminalContext {
    let mut ctx = TerminalContext::new(config);
    replay_onto(&mut ctx, &replayable_commands(history), registry);
    ctx
}

/// Remembers the last replay so a growing session only replays the new
/// suffix. Any history that does not extend the cached one triggers a full
/// replay, so the result always equals `reconstruct`.
#[derive(Debug, Default)]
pub struct ReplayCache {
    commands: Vec<String>,
    context: Option<TerminalContext>,
}

impl ReplayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_for(
        &mut self,
        history: &[Turn],
        config: &RouterConfig,
        registry: &CommandRegistry,
    ) -> TerminalContext {
        let commands = replayable_commands(history);
        let ctx = match self.context.take() {
            Some(ctx) if commands.starts_with(&self.commands) => {
                debug!(
                    "replaying {} new command(s) on top of {} cached",
                    commands.len() - self.commands.len(),
                    self.commands.len()
                );
                replay_onto_from(ctx, &commands[self.commands.len()..], registry)
            }
            _ => {
                debug!("full replay of {} command(s)", commands.len());
                let mut ctx = TerminalContext::new(config);
                replay_onto(&mut ctx, &commands, registry);
                ctx
            }
        };
        self.commands = commands;
        self.context = Some(ctx.clone());
        ctx
    }

    pub fn reset(&mut self) {
        self.commands.clear();
        self.context = None;
    }
}

fn replay_onto_from(mut ctx: TerminalContext, commands: &[String], registry: &CommandRegistry) -> TerminalContext {
    replay_onto(&mut ctx, commands, registry);
    ctx
}
