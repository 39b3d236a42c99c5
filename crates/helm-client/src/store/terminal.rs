//! Terminal output viewer store.
//!
//! Purely local: commands are recorded by whatever ran them and never
//! fetched from the backend. Newest first, like a scrollback.

use helm_core::types::TerminalCommand;

/// Locally recorded command history.
#[derive(Debug, Default)]
pub struct TerminalStore {
    commands: Vec<TerminalCommand>,
}

impl TerminalStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands, newest first.
    #[must_use]
    pub fn commands(&self) -> &[TerminalCommand] {
        &self.commands
    }

    /// Record a command at the front.
    pub fn add(&mut self, command: TerminalCommand) {
        self.commands.insert(0, command);
    }

    /// Drop the history.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
