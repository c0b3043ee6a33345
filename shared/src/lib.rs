use serde::{Deserialize, Serialize};

mod category;
mod leaderboard;
mod rarity;
mod records;
mod score;

pub use category::*;
pub use leaderboard::*;
pub use rarity::*;
pub use records::*;
pub use score::*;
