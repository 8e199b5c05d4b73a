//! help, basic-teller, players, teams, announce.

use super::{Tourney, USAGE};
use crate::error::reject;
use crate::roster::User;
use anyhow::Result;
use std::sync::Arc;
use tell_dispatch::{CommandSet, Rest};
use tracing::info;

pub(super) fn register(set: CommandSet<String>, tourney: &Arc<Tourney>) -> CommandSet<String> {
    let (players, teams, announce) = (
        Arc::clone(tourney),
        Arc::clone(tourney),
        Arc::clone(tourney),
    );
    set.command("help", |_teller: User| Ok(help()))
        .command("basic-teller", |teller: User| Ok(format!("Hello, {teller}.")))
        .command("players", move |_teller: User| Ok(players.list_players()))
        .command("teams", move |_teller: User| Ok(teams.list_teams()))
        .command("announce", move |teller: User, text: Rest| {
            announce.announce(&teller, &text)
        })
}

fn help() -> String {
    let mut reply = String::from("Commands:");
    for (_, usage) in USAGE {
        reply.push_str("\n  ");
        reply.push_str(usage);
    }
    reply
}

impl Tourney {
    fn list_players(&self) -> String {
        let names = self.roster.players().names();
        if names.is_empty() {
            "No players registered.".into()
        } else {
            format!("Players: {}", names.join(", "))
        }
    }

    fn list_teams(&self) -> String {
        let names = self.roster.teams().names();
        if names.is_empty() {
            "No teams registered.".into()
        } else {
            format!("Teams: {}", names.join(", "))
        }
    }

    fn announce(&self, teller: &User, text: &str) -> Result<String> {
        if text.is_empty() {
            return reject("Nothing to announce.");
        }
        let message = format!("Announcement from {teller}: {text}");
        info!(from = %teller, "Announcement");
        self.announcements.lock().push(message.clone());
        Ok(message)
    }

    /// Announcements made so far, oldest first.
    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejected;
    use crate::roster::Roster;

    fn tourney() -> Tourney {
        let roster = Roster::new();
        roster.add_player("TestPlayer-XYZ");
        Tourney::new(Arc::new(roster))
    }

    #[test]
    fn test_help_lists_every_usage() {
        let reply = help();
        assert!(reply.starts_with("Commands:"));
        assert_eq!(reply.lines().count(), USAGE.len() + 1);
    }

    #[test]
    fn test_list_players_and_teams() {
        let tourney = tourney();
        assert_eq!(tourney.list_players(), "Players: TestPlayer-XYZ");
        assert_eq!(tourney.list_teams(), "No teams registered.");
    }

    #[test]
    fn test_announce() {
        let tourney = tourney();
        let teller = User::parse("TestUser").unwrap();

        let reply = tourney.announce(&teller, "Round 2  starts now").unwrap();
        assert_eq!(reply, "Announcement from TestUser: Round 2  starts now");
        assert_eq!(tourney.announcements(), vec![reply]);

        let err = tourney.announce(&teller, "").unwrap_err();
        assert_eq!(
            err.downcast_ref::<Rejected>(),
            Some(&Rejected("Nothing to announce.".into()))
        );
    }
}
