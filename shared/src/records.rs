use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::*;

pub type UserKey = String;
pub type AchievementId = i32;

/// Board whose manual entries count toward the homepage total.
pub const GLOBAL_BOARD: &str = "global";

/// Identity used when a request carries no session.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user: UserKey,
    pub competition: String,
    /// Raw value as submitted by the client.
    pub progress: Option<String>,
}

impl ProgressRecord {
    /// Integer progress, or zero when the stored value is missing or not an integer.
    pub fn points(&self) -> Points {
        self.progress
            .as_deref()
            .map(str::trim)
            .and_then(|value| value.parse::<Points>().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub user: UserKey,
    pub competition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    pub user: UserKey,
    pub achievement_id: AchievementId,
    pub unlocked_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementInfo {
    pub name: String,
    pub rarity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub user: UserKey,
    pub board: String,
    pub points: Points,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub user: UserKey,
    pub points: Points,
}

/// Every record set the score summaries are derived from, read in one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRecords {
    pub progress: Vec<ProgressRecord>,
    pub memberships: Vec<MembershipRecord>,
    pub unlocks: Vec<UnlockRecord>,
    pub achievements: HashMap<AchievementId, AchievementInfo>,
    pub manual_entries: Vec<ManualEntry>,
    pub redemptions: Vec<RedemptionRecord>,
}

impl ScoreRecords {
    pub fn achievement_rarity(&self, id: AchievementId) -> Option<&str> {
        self.achievements.get(&id).map(|a| a.rarity.as_str())
    }

    pub fn manual_points(&self, user: &str, board: &str) -> Option<Points> {
        self.manual_entries
            .iter()
            .find(|entry| entry.user == user && entry.board == board)
            .map(|entry| entry.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(value: Option<&str>) -> ProgressRecord {
        ProgressRecord {
            user: "alice".to_string(),
            competition: "Fitness".to_string(),
            progress: value.map(ToString::to_string),
        }
    }

    #[test]
    fn progress_parsing() {
        assert_eq!(progress(Some("30")).points(), 30);
        assert_eq!(progress(Some(" 7 ")).points(), 7);
        assert_eq!(progress(Some("-4")).points(), -4);
        assert_eq!(progress(Some("lots")).points(), 0);
        assert_eq!(progress(Some("2.5")).points(), 0);
        assert_eq!(progress(None).points(), 0);
    }
}
