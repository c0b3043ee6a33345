use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::*;

pub use strum::IntoEnumIterator;

pub type Points = i64;

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Default for Rarity {
    fn default() -> Self {
        Self::Common
    }
}

impl Rarity {
    pub fn points(&self) -> Points {
        match self {
            Rarity::Common => 10,
            Rarity::Rare => 25,
            Rarity::Epic => 50,
            Rarity::Legendary => 100,
        }
    }

    /// Rare tiers are everything above common.
    pub fn is_rare(&self) -> bool {
        *self > Rarity::Common
    }

    pub fn rare_tiers() -> Vec<Rarity> {
        Rarity::iter().filter(Rarity::is_rare).collect()
    }
}

/// Point value of a stored rarity tag. Tags outside the table are worth nothing.
pub fn rarity_points(tag: &str) -> Points {
    Rarity::from_str(tag.trim())
        .map(|rarity| rarity.points())
        .unwrap_or_default()
}
