//! Command table: normalized command name to handler descriptor.

use crate::error::ConfigurationError;
use crate::handler::{CommandSet, HandlerDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

/// Matching key for a command name: lower-cased, separators removed.
///
/// `reserve-game`, `ReserveGame` and `reservegame` all become `reservegame`.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

struct Entry<R> {
    origin: String,
    descriptor: Arc<HandlerDescriptor<R>>,
}

/// Immutable lookup table built from every registered [`CommandSet`].
pub struct CommandTable<R> {
    commands: HashMap<String, Entry<R>>,
}

impl<R: 'static> CommandTable<R> {
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Build a table, failing on names that cannot be told apart.
    pub fn build<'a, I>(sets: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = &'a CommandSet<R>>,
    {
        let mut commands: HashMap<String, Entry<R>> = HashMap::new();

        for set in sets {
            for descriptor in set.handlers() {
                let key = normalize(descriptor.name());
                if key.is_empty() {
                    return Err(ConfigurationError::InvalidCommandName {
                        name: descriptor.name().to_string(),
                    });
                }
                descriptor.check_capture()?;

                let origin = format!("{}/{}", set.name(), descriptor.name());
                if let Some(existing) = commands.get(&key) {
                    return Err(ConfigurationError::DuplicateCommand {
                        key,
                        first: existing.origin.clone(),
                        second: origin,
                    });
                }
                commands.insert(
                    key,
                    Entry {
                        origin,
                        descriptor: Arc::clone(descriptor),
                    },
                );
            }
        }

        Ok(Self { commands })
    }

    /// Look up a command by any spelling of its name.
    pub fn get(&self, name: &str) -> Option<&Arc<HandlerDescriptor<R>>> {
        self.commands.get(&normalize(name)).map(|entry| &entry.descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered command names as spelled at registration, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .values()
            .map(|entry| entry.descriptor.name().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<HandlerDescriptor<R>>> + '_ {
        self.commands.values().map(|entry| &entry.descriptor)
    }
}

impl<R: 'static> Default for CommandTable<R> {
    fn default() -> Self {
        Self::empty()
    }
}
