//! Bot command handlers.

mod games;
mod general;
mod teams;

use crate::roster::{Player, Roster, Team, User};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tell_dispatch::{
    CommandSet, ConfigurationError, Dispatcher, FnConverter, IntegerConverter, NameConverter,
    RegistryKind,
};
use tracing::info;

pub use games::{Pairing, Reservation};

/// Name of the command set every tournament command is registered in.
pub const COMMAND_SET: &str = "tourney";

/// Usage line for each command, in the order `help` lists them.
pub const USAGE: &[(&str, &str)] = &[
    ("help", "help - list commands"),
    ("basic-teller", "basic-teller - check that the bot hears you"),
    ("reserve-game", "reserve-game <player> <board> - hold a board for a player"),
    ("schedule", "schedule <board> <white> <black> - pair two players on a board"),
    ("set-board", "set-board <board> <note...> - attach a note to a board"),
    ("join-team", "join-team <player> <team> - put a player on a team"),
    ("players", "players - list known players"),
    ("teams", "teams - list known teams"),
    ("announce", "announce <text...> - broadcast a message"),
];

/// Tournament state the commands read and change.
pub struct Tourney {
    roster: Arc<Roster>,
    reservations: Mutex<BTreeMap<i32, Reservation>>,
    pairings: Mutex<Vec<Pairing>>,
    notes: Mutex<BTreeMap<i32, String>>,
    memberships: Mutex<HashMap<String, String>>,
    announcements: Mutex<Vec<String>>,
}

impl Tourney {
    pub fn new(roster: Arc<Roster>) -> Self {
        Self {
            roster,
            reservations: Mutex::new(BTreeMap::new()),
            pairings: Mutex::new(Vec::new()),
            notes: Mutex::new(BTreeMap::new()),
            memberships: Mutex::new(HashMap::new()),
            announcements: Mutex::new(Vec::new()),
        }
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    /// Every tournament command, bound to this state.
    pub fn command_set(self: &Arc<Self>) -> CommandSet<String> {
        let set = CommandSet::new(COMMAND_SET);
        let set = general::register(set, self);
        let set = games::register(set, self);
        teams::register(set, self)
    }
}

/// Build a dispatcher with the bot's converters and commands.
///
/// Fails if two commands clash or a parameter type has no converter.
pub fn dispatcher(tourney: &Arc<Tourney>) -> Result<Dispatcher<String>, ConfigurationError> {
    let dispatcher = Dispatcher::new();
    let roster = tourney.roster();

    dispatcher.register_converter(RegistryKind::Identity, FnConverter::new(User::parse));

    dispatcher.register_converter(RegistryKind::Argument, IntegerConverter::new());
    dispatcher.register_converter(
        RegistryKind::Argument,
        NameConverter::<Player, _>::new(Arc::clone(roster.players())),
    );
    dispatcher.register_converter(
        RegistryKind::Argument,
        NameConverter::<Team, _>::new(Arc::clone(roster.teams())),
    );

    dispatcher.register(tourney.command_set())?;
    dispatcher.validate()?;

    info!(
        commands = dispatcher.command_names().len(),
        "Command dispatcher ready"
    );
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tell_dispatch::normalize;

    #[test]
    fn test_every_command_has_usage() {
        let tourney = Arc::new(Tourney::new(Arc::new(Roster::new())));
        let dispatcher = dispatcher(&tourney).unwrap();

        let mut documented: Vec<String> = USAGE.iter().map(|(name, _)| normalize(name)).collect();
        documented.sort();
        let mut registered: Vec<String> = dispatcher
            .command_names()
            .iter()
            .map(|name| normalize(name))
            .collect();
        registered.sort();

        assert_eq!(documented, registered);
    }

    #[test]
    fn test_every_argument_converter_is_used() {
        let tourney = Arc::new(Tourney::new(Arc::new(Roster::new())));

        let wired = dispatcher(&tourney).unwrap();
        assert!(wired.unregister_converter::<i32>(RegistryKind::Argument));
        assert!(wired.validate().is_err());

        let wired = dispatcher(&tourney).unwrap();
        assert!(wired.unregister_converter::<Player>(RegistryKind::Argument));
        assert!(wired.validate().is_err());

        let wired = dispatcher(&tourney).unwrap();
        assert!(wired.unregister_converter::<Team>(RegistryKind::Argument));
        assert!(wired.validate().is_err());
    }
}
