use rand::RngCore;

use crate::game::{Game, PlayerIndex};
use crate::regret::FrozenTable;

/// Something that can act in a game, given only the public interface a game
/// exposes to its players: whose turn it is, the information-set string,
/// and the legal actions.
pub trait Player<G: Game>: Send + Sync {
    fn get_move(
        &self,
        player_index: PlayerIndex,
        infoset: &str,
        actions: &[G::Action],
        rng: &mut dyn RngCore,
    ) -> G::Action;
}

/// A uniform-random player, used as the dominance baseline in evaluation.
pub struct RandomPlayer;

impl<G: Game> Player<G> for RandomPlayer {
    fn get_move(
        &self,
        _player_index: PlayerIndex,
        _infoset: &str,
        actions: &[G::Action],
        rng: &mut dyn RngCore,
    ) -> G::Action {
        let idx = (rng.next_u32() as usize) % actions.len();
        actions[idx]
    }
}

/// A player that acts according to a frozen regret-matching snapshot.
pub struct FrozenPlayer {
    table: FrozenTable,
}

impl FrozenPlayer {
    pub fn new(table: FrozenTable) -> Self {
        Self { table }
    }
}

impl<G: Game> Player<G> for FrozenPlayer {
    fn get_move(
        &self,
        _player_index: PlayerIndex,
        infoset: &str,
        actions: &[G::Action],
        rng: &mut dyn RngCore,
    ) -> G::Action {
        self.table.get_move(infoset, actions, rng)
    }
}
