//! Board reservations, pairings and board notes.

use super::Tourney;
use crate::error::reject;
use crate::roster::{Player, User};
use anyhow::Result;
use std::sync::Arc;
use tell_dispatch::{CommandSet, Rest};
use tracing::info;

/// A board held for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub board: i32,
    pub player: Player,
    pub reserved_by: User,
}

/// Two players scheduled on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub board: i32,
    pub white: Player,
    pub black: Player,
}

pub(super) fn register(set: CommandSet<String>, tourney: &Arc<Tourney>) -> CommandSet<String> {
    let (reserve, schedule, note) = (
        Arc::clone(tourney),
        Arc::clone(tourney),
        Arc::clone(tourney),
    );
    set.command(
        "reserve-game",
        move |teller: User, player: Player, board: i32| reserve.reserve_game(teller, player, board),
    )
    .command(
        "schedule",
        move |teller: User, board: i32, white: Player, black: Player| {
            schedule.schedule(&teller, board, white, black)
        },
    )
    .command("set-board", move |teller: User, board: i32, text: Rest| {
        note.set_board(&teller, board, text.into_inner())
    })
}

fn check_board(board: i32) -> Result<()> {
    if board < 1 {
        return reject(format!("There is no board {board}; boards start at 1."));
    }
    Ok(())
}

impl Tourney {
    fn reserve_game(&self, teller: User, player: Player, board: i32) -> Result<String> {
        check_board(board)?;

        let mut reservations = self.reservations.lock();
        if let Some(existing) = reservations.get(&board) {
            if existing.player != player {
                return reject(format!(
                    "Board {board} is already reserved for {}.",
                    existing.player
                ));
            }
        }

        info!(board, player = %player, by = %teller, "Board reserved");
        let reply = format!("Board {board} reserved for {player}.");
        reservations.insert(
            board,
            Reservation {
                board,
                player,
                reserved_by: teller,
            },
        );
        Ok(reply)
    }

    fn schedule(&self, teller: &User, board: i32, white: Player, black: Player) -> Result<String> {
        check_board(board)?;
        if white == black {
            return reject(format!("{white} cannot play against themselves."));
        }

        if let Some(reservation) = self.reservations.lock().get(&board) {
            if reservation.player != white && reservation.player != black {
                return reject(format!(
                    "Board {board} is reserved for {}.",
                    reservation.player
                ));
            }
        }

        let mut pairings = self.pairings.lock();
        if pairings.iter().any(|p| p.board == board) {
            return reject(format!("Board {board} already has a game scheduled."));
        }

        info!(board, white = %white, black = %black, by = %teller, "Game scheduled");
        let reply = format!("Board {board}: {white} (white) vs {black} (black).");
        pairings.push(Pairing {
            board,
            white,
            black,
        });
        Ok(reply)
    }

    fn set_board(&self, teller: &User, board: i32, note: String) -> Result<String> {
        check_board(board)?;

        let mut notes = self.notes.lock();
        if note.is_empty() {
            notes.remove(&board);
            return Ok(format!("Note for board {board} cleared."));
        }
        info!(board, by = %teller, "Board note set");
        let reply = format!("Board {board}: {note}");
        notes.insert(board, note);
        Ok(reply)
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.reservations.lock().values().cloned().collect()
    }

    pub fn pairings(&self) -> Vec<Pairing> {
        self.pairings.lock().clone()
    }

    pub fn board_note(&self, board: i32) -> Option<String> {
        self.notes.lock().get(&board).cloned()
    }
}
