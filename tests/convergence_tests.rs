//! Slow convergence properties. Marked `#[ignore]` since they run millions
//! of CFR iterations; invoke explicitly with `cargo test -- --ignored`.

use approx::assert_abs_diff_eq;
use cfr_engine::games::Kuhn13State;
use cfr_engine::player::{FrozenPlayer, Player, RandomPlayer};
use cfr_engine::{evaluator::average_payoff, Learner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
#[ignore]
fn self_play_near_zero_on_kuhn13() {
    let learner = Learner::new(Kuhn13State::new());
    learner.train(1_000_000);
    let frozen = FrozenPlayer::new(learner.regrets().freeze());

    let payoff = average_payoff(&Kuhn13State::new(), &frozen, &frozen, 10_000);
    assert_abs_diff_eq!(payoff, 0.0, epsilon = 0.05);
}

#[test]
#[ignore]
fn dominates_random_in_both_seats_on_kuhn13() {
    let learner = Learner::new(Kuhn13State::new());
    learner.train(1_000_000);
    let frozen = FrozenPlayer::new(learner.regrets().freeze());
    let random = RandomPlayer;

    let as_p0 = average_payoff(&Kuhn13State::new(), &frozen, &random, 10_000);
    let as_p1 = -average_payoff(&Kuhn13State::new(), &random, &frozen, 10_000);

    assert!(as_p0 > 0.2, "expected P0 dominance > 0.2, got {as_p0}");
    assert!(as_p1 > 0.2, "expected P1 dominance > 0.2, got {as_p1}");
}

#[test]
fn random_player_is_deterministic_under_a_seeded_rng() {
    // A seeded RNG should drive the same sequence of legal moves.
    let mut game = Kuhn13State::new();
    game.begin_game();
    let actions = game.actions();
    let player = RandomPlayer;

    let mut a: StdRng = SeedableRng::seed_from_u64(7);
    let mut b: StdRng = SeedableRng::seed_from_u64(7);
    let chosen_a = Player::<Kuhn13State>::get_move(&player, 0, "ignored", &actions, &mut a);
    let chosen_b = Player::<Kuhn13State>::get_move(&player, 0, "ignored", &actions, &mut b);
    assert_eq!(chosen_a, chosen_b);

    let mut c: StdRng = SeedableRng::seed_from_u64(7);
    assert_eq!(c.gen::<u32>(), StdRng::seed_from_u64(7).gen::<u32>());
}
