//! Level table and the pure arithmetic that moves a user between levels.

mod progress;
mod table;

pub use progress::{LevelProgress, apply_level_up, progress_within};
pub use table::{cumulative_exp, required_exp};

pub type Level = i32;
pub type Exp = i64;
