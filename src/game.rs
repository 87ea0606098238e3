use std::fmt::{Debug, Display};

/// A move available to a player at some decision point.
///
/// Actions are opaque to the solver: it only ever needs to compare them for
/// equality and print them for logs and tests.
pub trait Action: Copy + Eq + Debug + Display + Send + Sync + 'static {}

impl<T> Action for T where T: Copy + Eq + Debug + Display + Send + Sync + 'static {}

pub type PlayerIndex = usize;

/// The contract every two-player extensive-form game must satisfy for the
/// learner to traverse it.
///
/// Dealing is folded into [`Game::begin_game`]: there is no separate chance
/// node in the action sequence `actions()` exposes.
pub trait Game: Clone + Send + Sync {
    type Action: Action;

    /// Deals private information and resets history and turn. Called once
    /// before the first `actions()`/`make_move()` of a playout.
    fn begin_game(&mut self);

    fn num_players(&self) -> usize {
        2
    }

    /// Player to act next. Meaningless once `is_terminal()` is true.
    fn player_to_act(&self) -> PlayerIndex;

    /// Legal actions in the current state, in a fixed deterministic order.
    /// Empty if and only if the state is terminal.
    fn actions(&self) -> Vec<Self::Action>;

    /// Applies `a`. Panics if the state is terminal or `a` is not legal.
    fn make_move(&mut self, a: Self::Action);

    fn is_terminal(&self) -> bool;

    /// Zero-sum payout, one entry per player. Panics if not terminal.
    fn payout(&self) -> Vec<f64>;

    /// A total function of everything the acting player knows. Two states
    /// indistinguishable to the acting player must produce the same string.
    /// Must not contain a tab or newline.
    fn information_set(&self) -> String;

    fn deep_copy(&self) -> Self
    where
        Self: Sized,
    {
        self.clone()
    }
}
