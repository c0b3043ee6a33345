use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shared::Points;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Competition {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewCompetition {
    pub title: String,
    pub description: Option<String>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
}

impl NewCompetition {
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: i32,
    pub name: String,
    pub rules_json: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub rarity: String,
    pub points: Points,
}

#[derive(Debug, Clone)]
pub struct NewAchievement {
    pub name: String,
    pub description: Option<String>,
    pub rarity: String,
    pub points: Points,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Reward {
    pub id: i32,
    pub name: String,
    pub points: Points,
    pub category: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct RewardSuggestion {
    pub id: i32,
    pub name: String,
    pub points: Points,
    pub suggested_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub owner: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub id: i32,
    pub sender: String,
    pub recipient: String,
    pub challenge: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub user_id: String,
    pub action: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub id: i32,
    pub user_id: String,
    pub prediction: String,
    pub created_at: NaiveDateTime,
}

/// Reward categories shown by the catalog endpoints.
pub const PERK_CATEGORY: &str = "perk";
pub const STORE_CATEGORY: &str = "store";
