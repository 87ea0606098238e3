use rand::thread_rng;

use crate::game::Game;
use crate::player::Player;

/// Average payout for seat 0 over `hands` independently dealt playouts
/// between `seat0` and `seat1`.
pub fn average_payoff<G: Game>(
    prototype: &G,
    seat0: &dyn Player<G>,
    seat1: &dyn Player<G>,
    hands: usize,
) -> f64 {
    let mut rng = thread_rng();
    let mut total = 0.0;
    for _ in 0..hands {
        let mut game = prototype.deep_copy();
        game.begin_game();
        while !game.is_terminal() {
            let actions = game.actions();
            let infoset = game.information_set();
            let player_index = game.player_to_act();
            let player: &dyn Player<G> = if player_index == 0 { seat0 } else { seat1 };
            let a = player.get_move(player_index, &infoset, &actions, &mut rng);
            game.make_move(a);
        }
        total += game.payout()[0];
    }
    total / hands as f64
}
