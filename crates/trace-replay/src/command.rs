//! Trace commands and the batches they are grouped into

use std::fmt;

/// One priority-queue operation from a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Insert `key`, remembering the new element under `id`
    Insert { id: u32, key: i32 },
    DeleteMin,
    /// Lower the key of the element inserted as `id`
    DecreaseKey { id: u32, key: i32 },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Insert { id, key } => write!(f, "INS {} {}", id, key),
            Command::DeleteMin => f.write_str("DEL"),
            Command::DecreaseKey { id, key } => write!(f, "DEC {} {}", id, key),
        }
    }
}

/// A run of commands replayed against one fresh queue
///
/// `ids` is the size of the insert-id table announced by the batch header;
/// every id in the batch is below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    ids: usize,
    commands: Vec<Command>,
}

impl Batch {
    pub fn new(ids: usize) -> Self {
        Batch {
            ids,
            commands: Vec::new(),
        }
    }

    pub fn ids(&self) -> usize {
        self.ids
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for Batch {
    /// Collects commands, sizing the id table to fit every id seen
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let commands: Vec<Command> = iter.into_iter().collect();
        let ids = commands
            .iter()
            .filter_map(|c| match c {
                Command::Insert { id, .. } | Command::DecreaseKey { id, .. } => Some(*id as usize + 1),
                Command::DeleteMin => None,
            })
            .max()
            .unwrap_or(0);
        Batch { ids, commands }
    }
}
