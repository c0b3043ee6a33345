use strum::{AsRefStr, EnumIter, EnumString};

use super::*;

/// Standing office competitions that can be joined by category slug.
#[derive(
    Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    CodeQuality,
    Learning,
    Fitness,
    Sustainability,
    Creativity,
    TeamBuilding,
}

impl Category {
    pub fn title(&self) -> &'static str {
        match self {
            Category::CodeQuality => "Code Quality Challenge",
            Category::Learning => "Learning Challenge",
            Category::Fitness => "Office Fitness Challenge",
            Category::Sustainability => "Green Office Challenge",
            Category::Creativity => "Creativity Challenge",
            Category::TeamBuilding => "Team Building Activity",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::CodeQuality => "Improve code readability and maintainability",
            Category::Learning => "Upskill and share knowledge",
            Category::Fitness => "Stay active at work",
            Category::Sustainability => "Promote eco-friendly practices",
            Category::Creativity => "Express and innovate",
            Category::TeamBuilding => "Strengthen collaboration",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn slugs_round_trip() {
        assert_eq!(
            Category::from_str("team-building").unwrap(),
            Category::TeamBuilding
        );
        assert_eq!(Category::CodeQuality.as_ref(), "code-quality");
        assert!(Category::from_str("chess").is_err());
    }

    #[test]
    fn titles_are_unique() {
        let titles: std::collections::HashSet<_> = Category::iter().map(|c| c.title()).collect();
        assert_eq!(titles.len(), 6);
    }
}
