use dashmap::DashMap;
use rand::{Rng, RngCore};
use rustc_hash::FxHashMap;

/// Optimistic initial regret for every action the first time its infoset is
/// observed.
pub const INITIAL_REGRET: f64 = 10.0;

/// Concurrent mapping from information-set id to a vector of per-action
/// cumulative positive regrets, plus (optionally) an average-strategy
/// accumulator.
///
/// Shared by every training worker; per-infoset inserts and per-action
/// regret updates are made atomic by holding the shard lock `DashMap::entry`
/// returns for the duration of the read-modify-write.
pub struct RegretTable {
    table: DashMap<String, Vec<f64>>,
    strategy_sum: Option<DashMap<String, Vec<f64>>>,
}

impl RegretTable {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
            strategy_sum: None,
        }
    }

    /// Enables the optional average-strategy accumulator. Off by default;
    /// turning it on only adds work to `get_strategy`, it does not change
    /// what `get_strategy`/`get_move` return.
    pub fn with_average_accumulation(mut self) -> Self {
        self.strategy_sum = Some(DashMap::new());
        self
    }

    /// Regret-matching strategy at `infoset`, creating a fresh optimistic
    /// entry (all [`INITIAL_REGRET`]) the first time this infoset is seen.
    pub fn get_strategy(&self, infoset: &str, num_actions: usize) -> Vec<f64> {
        let entry = self
            .table
            .entry(infoset.to_string())
            .or_insert_with(|| vec![INITIAL_REGRET; num_actions]);
        let strategy = strategy_from_regrets(&entry, num_actions);
        drop(entry);
        if let Some(sums) = &self.strategy_sum {
            let mut sum = sums
                .entry(infoset.to_string())
                .or_insert_with(|| vec![0.0; num_actions]);
            for (s, p) in sum.iter_mut().zip(strategy.iter()) {
                *s += p;
            }
        }
        strategy
    }

    /// Samples one action according to the current regret-matching
    /// strategy, with cumulative mass falling through to the last action to
    /// absorb floating-point rounding.
    ///
    /// Takes `rng` as a trait object (rather than a generic `impl Rng`) so
    /// that callers holding a `&mut dyn RngCore` — as every [`Player`] impl
    /// does — can pass it straight through without an intermediate concrete
    /// RNG type; `Rng` is blanket-implemented for `?Sized` `RngCore`s, so
    /// `rng.gen()` below works unchanged on the trait object.
    ///
    /// [`Player`]: crate::player::Player
    pub fn get_move<A: Copy>(&self, infoset: &str, actions: &[A], rng: &mut dyn RngCore) -> A {
        let strategy = self.get_strategy(infoset, actions.len());
        sample_action(&strategy, actions, rng)
    }

    /// `M[infoset][action_idx] <- max(0, M[infoset][action_idx] + delta)`.
    pub fn update_regret(&self, infoset: &str, num_actions: usize, action_idx: usize, delta: f64) {
        let mut entry = self
            .table
            .entry(infoset.to_string())
            .or_insert_with(|| vec![INITIAL_REGRET; num_actions]);
        let updated = entry[action_idx] + delta;
        assert!(
            updated.is_finite(),
            "regret for {infoset:?}[{action_idx}] became non-finite ({updated})"
        );
        entry[action_idx] = updated.max(0.0);
    }

    /// The time-averaged strategy at `infoset`, if average-strategy
    /// accumulation was enabled and this infoset has been observed.
    pub fn average_strategy(&self, infoset: &str, num_actions: usize) -> Option<Vec<f64>> {
        let sums = self.strategy_sum.as_ref()?;
        let sum = sums.get(infoset)?;
        let total: f64 = sum.iter().sum();
        if total > 0.0 {
            Some(sum.iter().map(|s| s / total).collect())
        } else {
            Some(vec![1.0 / num_actions as f64; num_actions])
        }
    }

    /// An independent deep copy of the table; mutations to `self` after this
    /// call do not affect the returned snapshot.
    pub fn freeze(&self) -> FrozenTable {
        FrozenTable(
            self.table
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        )
    }

    /// All entries sorted lexicographically by infoset, for checkpointing.
    pub fn snapshot_sorted(&self) -> Vec<(String, Vec<f64>)> {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Inserts a regret vector verbatim, bypassing the optimistic-init path.
    /// Used by the checkpoint loader to repopulate a freshly loaded table.
    pub fn insert_raw(&self, infoset: String, regrets: Vec<f64>) {
        self.table.insert(infoset, regrets);
    }
}

impl Default for RegretTable {
    fn default() -> Self {
        Self::new()
    }
}

fn strategy_from_regrets(regrets: &[f64], num_actions: usize) -> Vec<f64> {
    let positive: Vec<f64> = regrets.iter().map(|&r| r.max(0.0)).collect();
    let sum: f64 = positive.iter().sum();
    if sum > 0.0 {
        positive.iter().map(|p| p / sum).collect()
    } else {
        vec![1.0 / num_actions as f64; num_actions]
    }
}

fn sample_action<A: Copy>(strategy: &[f64], actions: &[A], rng: &mut dyn RngCore) -> A {
    let u: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (i, &p) in strategy.iter().enumerate() {
        cumulative += p;
        if cumulative >= u {
            return actions[i];
        }
    }
    actions[actions.len() - 1]
}

/// An immutable, point-in-time copy of a [`RegretTable`] suitable for play.
///
/// Backed by `FxHashMap` rather than the stdlib hasher: evaluation hammers
/// this table with string lookups on a hot loop and never needs
/// DoS-resistant hashing for what is, by construction, a read-only snapshot.
#[derive(Clone)]
pub struct FrozenTable(FxHashMap<String, Vec<f64>>);

impl FrozenTable {
    pub fn get_strategy(&self, infoset: &str, num_actions: usize) -> Vec<f64> {
        match self.0.get(infoset) {
            Some(regrets) => strategy_from_regrets(regrets, num_actions),
            None => vec![1.0 / num_actions as f64; num_actions],
        }
    }

    pub fn get_move<A: Copy>(&self, infoset: &str, actions: &[A], rng: &mut dyn RngCore) -> A {
        let strategy = self.get_strategy(infoset, actions.len());
        sample_action(&strategy, actions, rng)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn fresh_infoset_gets_optimistic_uniform_strategy() {
        let table = RegretTable::new();
        let strategy = table.get_strategy("root", 3);
        for p in &strategy {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn strategy_is_a_probability_distribution_after_updates() {
        let table = RegretTable::new();
        table.update_regret("s", 3, 0, 5.0);
        table.update_regret("s", 3, 1, -3.0);
        let strategy = table.get_strategy("s", 3);
        assert_eq!(strategy.len(), 3);
        let sum: f64 = strategy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for p in strategy {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn regrets_never_go_negative() {
        let table = RegretTable::new();
        table.update_regret("s", 2, 0, -1000.0);
        let strategy = table.get_strategy("s", 2);
        // both entries clamp to >=0; with both at 0 the fallback is uniform.
        assert!((strategy[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn get_move_only_returns_provided_actions() {
        let table = RegretTable::new();
        let actions = ["a", "b", "c"];
        let mut rng = thread_rng();
        for _ in 0..100 {
            let chosen = table.get_move("s", &actions, &mut rng);
            assert!(actions.contains(&chosen));
        }
    }

    #[test]
    fn freeze_is_independent_of_later_mutation() {
        let table = RegretTable::new();
        table.update_regret("s", 2, 0, 5.0);
        let frozen = table.freeze();
        table.update_regret("s", 2, 0, 1000.0);
        let frozen_strategy = frozen.get_strategy("s", 2);
        // frozen snapshot should still reflect the pre-mutation regret of 15.
        assert!((frozen_strategy[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn average_accumulation_is_off_by_default() {
        let table = RegretTable::new();
        table.get_strategy("s", 2);
        assert!(table.average_strategy("s", 2).is_none());
    }

    #[test]
    fn average_accumulation_tracks_mean_strategy_when_enabled() {
        let table = RegretTable::new().with_average_accumulation();
        table.get_strategy("s", 2);
        table.get_strategy("s", 2);
        let avg = table.average_strategy("s", 2).expect("accumulation enabled");
        let sum: f64 = avg.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
