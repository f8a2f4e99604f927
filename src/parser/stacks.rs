//! Per-channel command stacks
//!
//! Only the top command of each channel builds a glyph. Commands are tracked
//! by id so a command can finish (or be undone) while the parser is walking
//! the stacks; removal happens after the build call returns.

use crate::core::{Color, ColoredGlyph, Mirror};

use super::commands::{BuildContext, CommandKind, CommandStatus, MirrorCommand, ParseCommand, Recolor};

/// Identity of a pushed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

#[derive(Debug)]
struct Entry {
    id: CommandId,
    command: Box<dyn ParseCommand>,
}

/// Active commands, one stack per channel plus the overall push order
#[derive(Debug, Default)]
pub struct CommandStacks {
    foreground: Vec<Entry>,
    background: Vec<Entry>,
    glyph: Vec<Entry>,
    mirror: Vec<Entry>,
    effect: Vec<Entry>,
    /// Push order across every channel, for untyped undo
    all: Vec<(CommandId, CommandKind)>,
    next_id: u64,
    /// Set once any effect command is pushed; the parsed string then
    /// carries its effects
    pub turn_on_effects: bool,
}

impl CommandStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stacks pre-loaded with persistent commands forcing the given channels
    pub fn with_forced(foreground: Option<Color>, background: Option<Color>, mirror: Option<Mirror>) -> Self {
        let mut stacks = Self::new();
        if let Some(color) = foreground {
            stacks.push(Box::new(Recolor::forced(CommandKind::Foreground, color)));
        }
        if let Some(color) = background {
            stacks.push(Box::new(Recolor::forced(CommandKind::Background, color)));
        }
        if let Some(mirror) = mirror {
            stacks.push(Box::new(MirrorCommand::forced(mirror)));
        }
        stacks
    }

    fn stack(&self, kind: CommandKind) -> &Vec<Entry> {
        match kind {
            CommandKind::Foreground => &self.foreground,
            CommandKind::Background => &self.background,
            CommandKind::Glyph => &self.glyph,
            CommandKind::Mirror => &self.mirror,
            CommandKind::Effect => &self.effect,
        }
    }

    fn stack_mut(&mut self, kind: CommandKind) -> &mut Vec<Entry> {
        match kind {
            CommandKind::Foreground => &mut self.foreground,
            CommandKind::Background => &mut self.background,
            CommandKind::Glyph => &mut self.glyph,
            CommandKind::Mirror => &mut self.mirror,
            CommandKind::Effect => &mut self.effect,
        }
    }

    pub fn push(&mut self, command: Box<dyn ParseCommand>) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;
        let kind = command.kind();
        if kind == CommandKind::Effect {
            self.turn_on_effects = true;
        }
        self.stack_mut(kind).push(Entry { id, command });
        self.all.push((id, kind));
        id
    }

    /// Remove a command wherever it sits; false if it is already gone
    pub fn remove(&mut self, id: CommandId) -> bool {
        let Some(position) = self.all.iter().position(|(entry, _)| *entry == id) else {
            return false;
        };
        let (_, kind) = self.all.remove(position);
        let stack = self.stack_mut(kind);
        if let Some(index) = stack.iter().position(|entry| entry.id == id) {
            stack.remove(index);
        }
        true
    }

    /// Pop up to `times` commands, from one channel or in overall push
    /// order; returns how many were removed
    pub fn undo(&mut self, times: usize, kind: Option<CommandKind>) -> usize {
        let mut removed = 0;
        for _ in 0..times {
            let top = match kind {
                Some(kind) => self.stack(kind).last().map(|entry| entry.id),
                None => self.all.last().map(|(id, _)| *id),
            };
            match top {
                Some(id) if self.remove(id) => removed += 1,
                _ => break,
            }
        }
        removed
    }

    pub fn len(&self, kind: CommandKind) -> usize {
        self.stack(kind).len()
    }

    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Let the top command of `kind` build the glyph, dropping it if spent
    pub fn build(&mut self, kind: CommandKind, glyph: &mut ColoredGlyph, context: &BuildContext<'_>) {
        let finished = match self.stack_mut(kind).last_mut() {
            Some(entry) => (entry.command.build(glyph, context) == CommandStatus::Finished).then_some(entry.id),
            None => None,
        };
        if let Some(id) = finished {
            self.remove(id);
        }
    }

    /// Build every channel in order
    pub fn build_all(&mut self, glyph: &mut ColoredGlyph, context: &BuildContext<'_>) {
        for kind in CommandKind::ALL {
            self.build(kind, glyph, context);
        }
    }
}
