use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::checkpoint;
use crate::evaluator::average_payoff;
use crate::game::Game;
use crate::learner::Learner;
use crate::player::{FrozenPlayer, RandomPlayer};
use crate::regret::FrozenTable;

/// Average payoff for player 0 in each evaluation matchup (current vs
/// random in both seats, current vs itself, current vs the previous
/// snapshot in both seats), plus the derived improvement-over-previous
/// figure.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub vs_random_as_p0: f64,
    pub vs_random_as_p1: f64,
    pub self_play: f64,
    pub vs_previous_as_p0: f64,
    pub vs_previous_as_p1: f64,
    pub improvement: f64,
}

/// Drives load -> (train, save, freeze, evaluate)* for one (game, learner)
/// pair.
pub struct Trainer<G: Game> {
    learner: Learner<G>,
    checkpoint_path: PathBuf,
    iterations_per_save: usize,
    iterations_per_progress: usize,
    max_iterations: usize,
    eval_hands: usize,
}

impl<G: Game> Trainer<G> {
    pub fn new(prototype: G, checkpoint_dir: &Path) -> Self {
        let path = checkpoint_dir.join(derive_filename::<G>());
        let regrets = Arc::new(checkpoint::load_or_empty(&path));
        let learner = Learner::from_table(prototype, regrets);
        Self {
            learner,
            checkpoint_path: path,
            iterations_per_save: 10_000,
            iterations_per_progress: 10_000,
            max_iterations: 1_000_000,
            eval_hands: 10_000,
        }
    }

    pub fn with_checkpoint_path(mut self, path: PathBuf) -> Self {
        self.checkpoint_path = path;
        self
    }

    pub fn with_iterations_per_save(mut self, n: usize) -> Self {
        self.iterations_per_save = n;
        self
    }

    pub fn with_iterations_per_progress(mut self, n: usize) -> Self {
        self.iterations_per_progress = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_eval_hands(mut self, n: usize) -> Self {
        self.eval_hands = n;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.learner = self.learner.with_epsilon(epsilon);
        self
    }

    pub fn learner(&self) -> &Learner<G> {
        &self.learner
    }

    /// Runs the full training loop to `max_iterations`, returning one
    /// [`StepReport`] per completed step.
    pub fn run(&mut self) -> Vec<StepReport> {
        let mut reports = Vec::new();
        let mut baseline = self.learner.regrets().freeze();
        let pb = ProgressBar::new(self.max_iterations as u64);
        pb.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} iterations")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let step_size = self.iterations_per_save.min(self.max_iterations).max(1);
        let mut done = 0usize;
        while done < self.max_iterations {
            let step = step_size.min(self.max_iterations - done);
            self.learner.train(step);
            done += step;
            pb.inc(step as u64);

            checkpoint::save(self.learner.regrets(), &self.checkpoint_path)
                .expect("failed to save checkpoint");

            let current = self.learner.regrets().freeze();
            let report = self.evaluate(&current, &baseline);

            if done % self.iterations_per_progress == 0 || done >= self.max_iterations {
                log::info!(
                    "iteration:\t{}\tinfosets:\t{}\tvs_random_p0:\t{:.4}\tvs_random_p1:\t{:.4}\tself_play:\t{:.4}\timprovement:\t{:.4}",
                    done,
                    self.learner.regrets().len(),
                    report.vs_random_as_p0,
                    report.vs_random_as_p1,
                    report.self_play,
                    report.improvement,
                );
            }

            reports.push(report);
            baseline = current;
        }
        pb.finish_and_clear();
        reports
    }

    fn evaluate(&self, current: &FrozenTable, previous: &FrozenTable) -> StepReport {
        let current_player = FrozenPlayer::new(current.clone());
        let previous_player = FrozenPlayer::new(previous.clone());
        let random_player = RandomPlayer;
        let prototype = self.learner.prototype();

        let vs_random_as_p0 = average_payoff(prototype, &current_player, &random_player, self.eval_hands);
        let vs_random_as_p1 =
            -average_payoff(prototype, &random_player, &current_player, self.eval_hands);
        let self_play = average_payoff(prototype, &current_player, &current_player, self.eval_hands);
        let vs_previous_as_p0 =
            average_payoff(prototype, &current_player, &previous_player, self.eval_hands);
        let vs_previous_as_p1 =
            -average_payoff(prototype, &previous_player, &current_player, self.eval_hands);

        StepReport {
            vs_random_as_p0,
            vs_random_as_p1,
            self_play,
            vs_previous_as_p0,
            vs_previous_as_p1,
            improvement: vs_previous_as_p0 - vs_previous_as_p1,
        }
    }
}

fn derive_filename<G: Game>() -> String {
    let raw = std::any::type_name::<G>();
    let short = raw.rsplit("::").next().unwrap_or(raw).to_lowercase();
    format!("{short}_learner.ckpt")
}
