use async_trait::async_trait;
use shared::{AchievementId, Points, ScoreRecords};

use crate::db::types::{
    Achievement, Activity, Challenge, Competition, Game, NewAchievement, NewCompetition,
    Prediction, Reward, RewardSuggestion, Team,
};

/// Every read and write the HTTP layer performs. Implemented by the Postgres
/// pool and by [`crate::memory::MemoryStore`].
#[async_trait]
pub trait Store: Send + Sync {
    /// All record sets the player summaries are computed from.
    async fn score_records(&self) -> anyhow::Result<ScoreRecords>;

    async fn competitions(&self, active_only: bool) -> anyhow::Result<Vec<Competition>>;
    async fn competition(&self, id: i32) -> anyhow::Result<Option<Competition>>;
    /// Returns the competition with this title, creating an active one if none exists.
    async fn ensure_competition(&self, new: NewCompetition) -> anyhow::Result<Competition>;
    /// `None` when a competition with this title already exists.
    async fn create_competition(&self, new: NewCompetition)
        -> anyhow::Result<Option<Competition>>;
    /// `false` when the user was already a member.
    async fn add_membership(&self, user: &str, competition_id: i32) -> anyhow::Result<bool>;
    /// `false` when the user already participates.
    async fn add_participation(&self, user: &str, competition_id: i32) -> anyhow::Result<bool>;
    /// `false` when the user does not participate in the competition.
    async fn update_progress(
        &self,
        user: &str,
        competition_id: i32,
        progress: &str,
    ) -> anyhow::Result<bool>;

    async fn games(&self) -> anyhow::Result<Vec<Game>>;
    async fn create_game(&self, name: &str, rules_json: &str) -> anyhow::Result<Game>;

    /// Achievements ordered by points descending, then name. An empty filter
    /// returns every achievement.
    async fn achievements(&self, rarities: &[String]) -> anyhow::Result<Vec<Achievement>>;
    async fn achievement(&self, id: AchievementId) -> anyhow::Result<Option<Achievement>>;
    async fn achievement_by_name(&self, name: &str) -> anyhow::Result<Option<Achievement>>;
    async fn create_achievement(&self, new: NewAchievement) -> anyhow::Result<Achievement>;
    async fn unlock_achievement(&self, user: &str, id: AchievementId) -> anyhow::Result<()>;
    async fn unlocked_achievement_ids(&self, user: &str) -> anyhow::Result<Vec<AchievementId>>;

    async fn rewards(&self, category: Option<&str>) -> anyhow::Result<Vec<Reward>>;
    async fn reward(&self, id: i32) -> anyhow::Result<Option<Reward>>;
    async fn create_reward(&self, name: &str, points: Points, category: &str)
        -> anyhow::Result<Reward>;
    async fn add_redemption(
        &self,
        user: &str,
        reward_id: Option<i32>,
        points: Points,
    ) -> anyhow::Result<()>;
    async fn suggest_reward(
        &self,
        user: &str,
        name: &str,
        points: Points,
    ) -> anyhow::Result<RewardSuggestion>;

    async fn set_manual_points(&self, user: &str, board: &str, points: Points)
        -> anyhow::Result<()>;
    /// Charges the donor and credits the recipient's global manual entry as
    /// one write. Nothing is stored when either part fails.
    async fn donate(
        &self,
        donor: &str,
        amount: Points,
        recipient: Option<&str>,
    ) -> anyhow::Result<()>;

    async fn create_team(
        &self,
        name: &str,
        owner: &str,
        members: &[String],
    ) -> anyhow::Result<Team>;
    /// Distinct members of every team the user belongs to, excluding the user.
    async fn teammates(&self, user: &str) -> anyhow::Result<Vec<String>>;
    async fn send_challenge(
        &self,
        sender: &str,
        recipient: &str,
        challenge: &str,
    ) -> anyhow::Result<Challenge>;
    async fn challenges(&self) -> anyhow::Result<Vec<Challenge>>;

    async fn record_activity(&self, user: &str, action: &str) -> anyhow::Result<()>;
    /// Newest first.
    async fn activity_feed(&self, limit: i64) -> anyhow::Result<Vec<Activity>>;

    async fn add_prediction(&self, user: &str, prediction: &str) -> anyhow::Result<Prediction>;
}

/// Owner first, then the invited members in order, without blanks or duplicates.
pub fn team_roster(owner: &str, members: &[String]) -> Vec<String> {
    let mut roster: Vec<String> = Vec::with_capacity(members.len() + 1);
    for member in std::iter::once(owner).chain(members.iter().map(String::as_str)) {
        let member = member.trim();
        if !member.is_empty() && !roster.iter().any(|m| m == member) {
            roster.push(member.to_string());
        }
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::team_roster;

    #[test]
    fn roster_keeps_owner_first_and_drops_duplicates() {
        let members = vec![
            "bob".to_string(),
            " ".to_string(),
            "alice".to_string(),
            "bob".to_string(),
        ];
        assert_eq!(team_roster("alice", &members), vec!["alice", "bob"]);
    }
}
