pub mod checkpoint;
pub mod evaluator;
pub mod game;
pub mod games;
pub mod learner;
pub mod player;
pub mod regret;
pub mod trainer;

pub use game::{Game, PlayerIndex};
pub use learner::Learner;
pub use player::{FrozenPlayer, Player, RandomPlayer};
pub use regret::{FrozenTable, RegretTable};
pub use trainer::{StepReport, Trainer};
