use super::Tourney;
use crate::error::reject;
use crate::roster::{Player, Team, User};
use anyhow::Result;
use std::sync::Arc;
use tell_dispatch::CommandSet;
use tracing::info;

pub(super) fn register(set: CommandSet<String>, tourney: &Arc<Tourney>) -> CommandSet<String> {
    let tourney = Arc::clone(tourney);
    set.command(
        "join-team",
        move |teller: User, player: Player, team: Team| tourney.join_team(&teller, &player, &team),
    )
}

impl Tourney {
    fn join_team(&self, teller: &User, player: &Player, team: &Team) -> Result<String> {
        let mut memberships = self.memberships.lock();
        let key = player.handle().to_lowercase();

        match memberships.get(&key) {
            Some(current) if current == team.name() => {
                reject(format!("{player} is already on {team}."))
            }
            _ => {
                if let Some(previous) = memberships.insert(key, team.name().to_string()) {
                    info!(player = %player, from = %previous, to = %team, by = %teller, "Team changed");
                    Ok(format!("{player} left {previous} and joined {team}."))
                } else {
                    info!(player = %player, team = %team, by = %teller, "Team joined");
                    Ok(format!("{player} joined {team}."))
                }
            }
        }
    }

    /// Team the player is on, if any.
    pub fn team_of(&self, player: &Player) -> Option<String> {
        self.memberships
            .lock()
            .get(&player.handle().to_lowercase())
            .cloned()
    }
}
