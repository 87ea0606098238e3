pub mod kuhn13;
pub mod liars_dice;

pub use kuhn13::Kuhn13State;
pub use liars_dice::LiarsDiceState;
