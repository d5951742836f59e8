//! Subscription registry.
//!
//! An append-only, ordered list of subscribe commands. The registry is
//! replayed in full, in registration order, after every successful
//! (re)connection; duplicates are not collapsed because the venue treats
//! repeated subscribes idempotently.

use crate::message::Command;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    commands: RwLock<Vec<Command>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
        }
    }

    /// Append a subscribe command and return it for immediate sending.
    pub fn add(&self, topic: &str) -> Command {
        let cmd = Command::subscribe(topic);
        self.commands.write().push(cmd.clone());
        cmd
    }

    /// Snapshot of every registered command, in registration order.
    /// The replay path iterates this copy so callers can keep appending.
    pub fn commands(&self) -> Vec<Command> {
        self.commands.read().clone()
    }

    /// Registered topic strings, in registration order.
    pub fn topics(&self) -> Vec<String> {
        self.commands
            .read()
            .iter()
            .filter_map(|cmd| cmd.topic().map(str::to_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}
