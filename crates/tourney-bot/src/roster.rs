//! In-memory roster of players and teams.
//!
//! The directories double as name lookups for command arguments, so any
//! registered handle can be passed where a `Player` or `Team` is expected.

use crate::config::RosterConfig;
use std::fmt;
use std::sync::Arc;
use tell_dispatch::{ConversionError, NameDirectory};
use tracing::info;

/// Whoever sent a tell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    handle: String,
}

impl User {
    /// Accept any handle that is non-empty and has no whitespace.
    pub fn parse(handle: &str) -> Result<Self, ConversionError> {
        if handle.is_empty() || handle.contains(char::is_whitespace) {
            return Err(ConversionError::invalid("user", handle));
        }
        Ok(Self {
            handle: handle.to_string(),
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    handle: String,
}

impl Player {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Team {
    name: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Players and teams known to the bot, looked up case-insensitively.
#[derive(Default)]
pub struct Roster {
    players: Arc<NameDirectory<Player>>,
    teams: Arc<NameDirectory<Team>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RosterConfig) -> Self {
        let roster = Self::new();
        for handle in config.players.iter().filter(|h| !h.trim().is_empty()) {
            roster.add_player(handle.trim());
        }
        for name in config.teams.iter().filter(|n| !n.trim().is_empty()) {
            roster.add_team(name.trim());
        }
        info!(
            players = roster.players.len(),
            teams = roster.teams.len(),
            "Roster loaded"
        );
        roster
    }

    pub fn add_player(&self, handle: &str) -> Player {
        let player = Player::new(handle);
        self.players.insert(handle, player.clone());
        player
    }

    pub fn add_team(&self, name: &str) -> Team {
        let team = Team::new(name);
        self.teams.insert(name, team.clone());
        team
    }

    pub fn players(&self) -> &Arc<NameDirectory<Player>> {
        &self.players
    }

    pub fn teams(&self) -> &Arc<NameDirectory<Team>> {
        &self.teams
    }
}
