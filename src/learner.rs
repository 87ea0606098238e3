use std::sync::Arc;

use rand::{thread_rng, Rng};
use rayon::prelude::*;

use crate::game::Game;
use crate::regret::RegretTable;

/// Default exploration rate for the non-training player's action sampling.
pub const DEFAULT_EPSILON: f64 = 0.05;
/// Default bound on concurrent training workers.
pub const DEFAULT_MAX_PARALLELISM: usize = 32;

fn build_pool(max_parallelism: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(max_parallelism)
        .build()
        .expect("failed to build CFR worker pool")
}

/// Parallel external-sampling CFR learner over a single [`Game`] type.
///
/// Holds a read-only game prototype (deep-copied by every worker at the
/// start of every iteration), a regret table shared across all workers, and
/// a worker pool built once and reused across every `train()` call rather
/// than spun up and torn down per call.
pub struct Learner<G: Game> {
    prototype: G,
    regrets: Arc<RegretTable>,
    epsilon: f64,
    max_parallelism: usize,
    pool: rayon::ThreadPool,
}

impl<G: Game> Learner<G> {
    pub fn new(prototype: G) -> Self {
        Self {
            prototype,
            regrets: Arc::new(RegretTable::new()),
            epsilon: DEFAULT_EPSILON,
            max_parallelism: DEFAULT_MAX_PARALLELISM,
            pool: build_pool(DEFAULT_MAX_PARALLELISM),
        }
    }

    pub fn from_table(prototype: G, regrets: Arc<RegretTable>) -> Self {
        Self {
            prototype,
            regrets,
            epsilon: DEFAULT_EPSILON,
            max_parallelism: DEFAULT_MAX_PARALLELISM,
            pool: build_pool(DEFAULT_MAX_PARALLELISM),
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism;
        self.pool = build_pool(max_parallelism);
        self
    }

    pub fn regrets(&self) -> &Arc<RegretTable> {
        &self.regrets
    }

    pub fn prototype(&self) -> &G {
        &self.prototype
    }

    /// Runs `k` independent external-sampling CFR iterations at a bounded
    /// degree of parallelism. Each iteration deep-copies the prototype,
    /// deals a fresh game via `begin_game()`, and traverses it once for a
    /// training player `t = i mod num_players()`.
    pub fn train(&self, k: usize) {
        log::debug!(
            "starting {} CFR iterations across up to {} workers",
            k,
            self.max_parallelism
        );
        self.pool.install(|| {
            (0..k).into_par_iter().for_each(|i| {
                let mut game = self.prototype.deep_copy();
                game.begin_game();
                let t = i % game.num_players();
                let mut reach = vec![1.0; game.num_players()];
                self.traverse(&mut game, &mut reach, t);
            });
        });
    }

    /// External-sampling CFR traversal. Only reaches the full-enumeration
    /// regret update below when `p == t`, because both the opponent-sampling
    /// branch and the single-action branch return first via a tail call.
    fn traverse(&self, game: &mut G, reach: &mut [f64], t: usize) -> Vec<f64> {
        if game.is_terminal() {
            return game.payout();
        }

        let p = game.player_to_act();
        let actions = game.actions();
        let infoset = game.information_set();

        if p != t {
            let a = if thread_rng().gen::<f64>() < self.epsilon {
                actions[thread_rng().gen_range(0..actions.len())]
            } else {
                self.regrets.get_move(&infoset, &actions, &mut thread_rng())
            };
            game.make_move(a);
            return self.traverse(game, reach, t);
        }

        if actions.len() == 1 {
            game.make_move(actions[0]);
            return self.traverse(game, reach, t);
        }

        let strategy = self.regrets.get_strategy(&infoset, actions.len());
        let num_players = game.num_players();
        let mut node_utility = vec![0.0; num_players];
        let mut child_utilities = Vec::with_capacity(actions.len());

        for (i, &a) in actions.iter().enumerate() {
            let mut child = game.deep_copy();
            child.make_move(a);
            let mut child_reach = reach.to_vec();
            child_reach[p] *= strategy[i];
            let utility = self.traverse(&mut child, &mut child_reach, t);
            for (player, u) in node_utility.iter_mut().enumerate() {
                *u += strategy[i] * utility[player];
            }
            child_utilities.push(utility);
        }

        let weight: f64 = (0..num_players)
            .filter(|&i| i != p)
            .map(|i| reach[i])
            .product();
        for (i, utility) in child_utilities.iter().enumerate() {
            let regret = utility[p] - node_utility[p];
            self.regrets
                .update_regret(&infoset, actions.len(), i, weight * regret);
        }

        node_utility
    }
}
