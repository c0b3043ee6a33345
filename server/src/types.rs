use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shared::{HallOfFameEntry, MonthlyLeader, PlayerSummary, Points, RankedPlayer};
use utoipa::ToSchema;

use crate::db::types::{
    Achievement, Activity, Challenge, Competition, Game, Reward, RewardSuggestion, Team,
};

#[derive(Clone, Debug, Serialize, Deserialize, Default, ToSchema)]
#[aliases(PaginatedPlayerResponse = PaginatedResponse<RankedPlayerResponse>)]
pub struct PaginatedResponse<T: Serialize> {
    pub records: Vec<T>,
    pub page: u64,
    pub total_pages: u64,
    pub limit: u64,
    pub total_records: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(records: Vec<T>, page: u64, limit: u64, total_records: u64) -> Self {
        Self {
            records,
            page,
            total_pages: shared::total_pages(total_records, limit),
            limit,
            total_records,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PlayerResponse {
    pub username: String,
    pub competitions: Vec<String>,
    pub total_progress: Points,
    pub achievement_points: Points,
    pub spent_points: Points,
    pub total_points: Points,
}

impl From<PlayerSummary> for PlayerResponse {
    fn from(summary: PlayerSummary) -> Self {
        Self {
            username: summary.username,
            competitions: summary.competitions,
            total_progress: summary.total_progress,
            achievement_points: summary.achievement_points,
            spent_points: summary.spent_points,
            total_points: summary.total_points,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RankedPlayerResponse {
    pub place: u64,
    pub username: String,
    pub competitions: Vec<String>,
    pub total_points: Points,
}

impl From<RankedPlayer> for RankedPlayerResponse {
    fn from(record: RankedPlayer) -> Self {
        Self {
            place: record.place,
            username: record.summary.username,
            competitions: record.summary.competitions,
            total_points: record.summary.total_points,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyLeaderResponse {
    pub month: String,
    pub top_user: String,
    pub points: Points,
}

impl From<MonthlyLeader> for MonthlyLeaderResponse {
    fn from(record: MonthlyLeader) -> Self {
        Self {
            month: record.month,
            top_user: record.top_user,
            points: record.points,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HallOfFameResponse {
    pub user: String,
    pub achievements: Vec<String>,
}

impl From<HallOfFameEntry> for HallOfFameResponse {
    fn from(record: HallOfFameEntry) -> Self {
        Self {
            user: record.user,
            achievements: record.achievements,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AchievementResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub rarity: String,
    pub points: Points,
}

impl From<Achievement> for AchievementResponse {
    fn from(record: Achievement) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            rarity: record.rarity,
            points: record.points,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

impl From<Competition> for CompetitionResponse {
    fn from(record: Competition) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            start_at: record.start_at,
            end_at: record.end_at,
            is_active: record.is_active,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GameResponse {
    pub id: i32,
    pub name: String,
    #[schema(value_type = Object)]
    pub rules: serde_json::Value,
}

impl From<Game> for GameResponse {
    fn from(record: Game) -> Self {
        // Rules are written by this server as JSON; anything unreadable is shown verbatim
        let rules = serde_json::from_str(&record.rules_json)
            .unwrap_or(serde_json::Value::String(record.rules_json));
        Self {
            id: record.id,
            name: record.name,
            rules,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RewardResponse {
    pub id: i32,
    pub name: String,
    pub points: Points,
}

impl From<Reward> for RewardResponse {
    fn from(record: Reward) -> Self {
        Self {
            id: record.id,
            name: record.name,
            points: record.points,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestionResponse {
    pub name: String,
    pub points: Points,
    pub suggested_by: String,
}

impl From<RewardSuggestion> for SuggestionResponse {
    fn from(record: RewardSuggestion) -> Self {
        Self {
            name: record.name,
            points: record.points,
            suggested_by: record.suggested_by,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub name: String,
    pub members: Vec<String>,
}

impl From<Team> for TeamResponse {
    fn from(record: Team) -> Self {
        Self {
            name: record.name,
            members: record.members,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub user: String,
    pub action: String,
    pub at: NaiveDateTime,
}

impl From<Activity> for ActivityResponse {
    fn from(record: Activity) -> Self {
        Self {
            user: record.user_id,
            action: record.action,
            at: record.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RivalryResponse {
    pub user1: String,
    pub user2: String,
    pub status: String,
}

impl From<Challenge> for RivalryResponse {
    fn from(record: Challenge) -> Self {
        Self {
            user1: record.sender,
            user2: record.recipient,
            status: record.challenge,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UnlockResponse {
    pub message: String,
    pub achievement: AchievementResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AchievementProgressResponse {
    pub user_id: String,
    pub unlocked: Vec<AchievementResponse>,
    pub locked: Vec<AchievementResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareResponse {
    pub message: String,
    pub achievement_id: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinResponse {
    pub message: String,
    pub competition: CompetitionResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub message: String,
    pub competition_id: i32,
    pub progress: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub status: String,
    pub rewards: Vec<RewardResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemResponse {
    pub status: String,
    pub reward: RewardResponse,
    pub redeemed_by: String,
    pub remaining_points: Points,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MyPointsResponse {
    pub status: String,
    pub user: String,
    pub points: Points,
    pub summary: PlayerResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DonationResponse {
    pub status: String,
    pub donated: Points,
    pub charity: Option<String>,
    pub recipient: Option<String>,
    pub donated_by: String,
    pub remaining_points: Points,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestResponse {
    pub status: String,
    pub suggested_reward: SuggestionResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamCreatedResponse {
    pub message: String,
    pub team: TeamResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FriendsResponse {
    pub friends: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChallengeResponse {
    pub message: String,
    pub from: String,
    pub to: String,
    pub challenge: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedResponse {
    pub feed: Vec<ActivityResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CelebrationResponse {
    pub message: String,
    pub achievement_id: i32,
    pub celebration: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RivalriesResponse {
    pub rivalries: Vec<RivalryResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamLeaderboardResponse {
    pub leaderboard: Vec<RankedPlayerResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyLeaderboardResponse {
    pub leaderboard: Vec<MonthlyLeaderResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HallOfFameListResponse {
    pub hall_of_fame: Vec<HallOfFameResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub message: String,
    pub prediction: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ManualEntryResponse {
    pub user: String,
    pub board: String,
    pub points: Points,
}

// Request bodies. Every field is optional so that missing values are reported
// with a descriptive 400 instead of a generic parse failure.

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AchievementRequest {
    pub achievement_id: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAchievementRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rarity: Option<String>,
    pub points: Option<Points>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinGameRequest {
    pub competition_id: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressUpdateRequest {
    pub competition_id: Option<i32>,
    /// Stored as given; only integer values count toward totals.
    #[schema(value_type = Option<Object>)]
    pub progress: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomGameRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub rules: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub reward_id: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DonateRequest {
    pub amount: Option<Points>,
    pub charity: Option<String>,
    pub recipient: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestRequest {
    pub name: Option<String>,
    pub points: Option<Points>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamRequest {
    pub team_name: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChallengeRequest {
    pub to: Option<String>,
    pub challenge: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CelebrationRequest {
    pub achievement_id: Option<i32>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictionRequest {
    pub prediction: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ManualEntryRequest {
    pub user: Option<String>,
    pub board: Option<String>,
    pub points: Option<Points>,
}

/// Trimmed, non-empty text or `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_counts_partial_pages() {
        let response = PaginatedResponse::new(vec![1, 2, 3], 1, 2, 5);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.limit, 2);
    }

    #[test]
    fn game_rules_fall_back_to_text() {
        let game = Game {
            id: 1,
            name: "Step race".to_string(),
            rules_json: "not json".to_string(),
        };
        let response = GameResponse::from(game);
        assert_eq!(response.rules, serde_json::json!("not json"));

        let game = Game {
            id: 2,
            name: "Quiz".to_string(),
            rules_json: r#"{"rounds":3}"#.to_string(),
        };
        assert_eq!(GameResponse::from(game).rules["rounds"], 3);
    }

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" bob ".to_string())), Some("bob".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
