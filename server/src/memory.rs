use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rocket::tokio::sync::RwLock;
use shared::{
    AchievementId, AchievementInfo, ManualEntry, MembershipRecord, Points, ProgressRecord,
    RedemptionRecord, ScoreRecords, UnlockRecord, GLOBAL_BOARD,
};
use tracing::instrument;

use crate::db::types::{
    Achievement, Activity, Challenge, Competition, Game, NewAchievement, NewCompetition,
    Prediction, Reward, RewardSuggestion, Team,
};
use crate::store::{team_roster, Store};

#[derive(Debug, Clone)]
struct Participation {
    user: String,
    competition_id: i32,
    progress: Option<String>,
}

#[derive(Debug, Clone)]
struct Membership {
    user: String,
    competition_id: i32,
}

#[derive(Debug, Clone)]
struct Unlock {
    user: String,
    achievement_id: AchievementId,
    unlocked_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    competitions: Vec<Competition>,
    participations: Vec<Participation>,
    memberships: Vec<Membership>,
    games: Vec<Game>,
    achievements: Vec<Achievement>,
    unlocks: Vec<Unlock>,
    rewards: Vec<Reward>,
    redemptions: Vec<RedemptionRecord>,
    suggestions: Vec<RewardSuggestion>,
    manual_entries: HashMap<(String, String), Points>,
    teams: Vec<Team>,
    challenges: Vec<Challenge>,
    activities: Vec<Activity>,
    predictions: Vec<Prediction>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn competition_by_title(&self, title: &str) -> Option<&Competition> {
        self.competitions.iter().find(|c| c.title == title)
    }

    fn insert_competition(&mut self, new: NewCompetition) -> Competition {
        let competition = Competition {
            id: self.next_id(),
            title: new.title,
            description: new.description,
            start_at: new.start_at,
            end_at: new.end_at,
            is_active: true,
        };
        self.competitions.push(competition.clone());
        competition
    }

    fn competition_title(&self, id: i32) -> Option<&str> {
        self.competitions
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.title.as_str())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Store kept entirely in process memory. Owned by one server instance and
/// lost on shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    #[instrument(skip(self))]
    async fn score_records(&self) -> anyhow::Result<ScoreRecords> {
        let tables = self.tables.read().await;

        let progress = tables
            .participations
            .iter()
            .filter_map(|p| {
                Some(ProgressRecord {
                    user: p.user.clone(),
                    competition: tables.competition_title(p.competition_id)?.to_string(),
                    progress: p.progress.clone(),
                })
            })
            .collect();
        let memberships = tables
            .memberships
            .iter()
            .filter_map(|m| {
                Some(MembershipRecord {
                    user: m.user.clone(),
                    competition: tables.competition_title(m.competition_id)?.to_string(),
                })
            })
            .collect();
        let unlocks = tables
            .unlocks
            .iter()
            .map(|u| UnlockRecord {
                user: u.user.clone(),
                achievement_id: u.achievement_id,
                unlocked_at: u.unlocked_at,
            })
            .collect();
        let achievements = tables
            .achievements
            .iter()
            .map(|a| {
                (
                    a.id,
                    AchievementInfo {
                        name: a.name.clone(),
                        rarity: a.rarity.clone(),
                    },
                )
            })
            .collect();
        let manual_entries = tables
            .manual_entries
            .iter()
            .map(|((user, board), points)| ManualEntry {
                user: user.clone(),
                board: board.clone(),
                points: *points,
            })
            .collect();

        Ok(ScoreRecords {
            progress,
            memberships,
            unlocks,
            achievements,
            manual_entries,
            redemptions: tables.redemptions.clone(),
        })
    }

    async fn competitions(&self, active_only: bool) -> anyhow::Result<Vec<Competition>> {
        let tables = self.tables.read().await;
        Ok(tables
            .competitions
            .iter()
            .filter(|c| c.is_active || !active_only)
            .cloned()
            .collect())
    }

    async fn competition(&self, id: i32) -> anyhow::Result<Option<Competition>> {
        let tables = self.tables.read().await;
        Ok(tables.competitions.iter().find(|c| c.id == id).cloned())
    }

    #[instrument(skip(self))]
    async fn ensure_competition(&self, new: NewCompetition) -> anyhow::Result<Competition> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.competition_by_title(&new.title) {
            return Ok(existing.clone());
        }
        Ok(tables.insert_competition(new))
    }

    #[instrument(skip(self))]
    async fn create_competition(
        &self,
        new: NewCompetition,
    ) -> anyhow::Result<Option<Competition>> {
        let mut tables = self.tables.write().await;
        if tables.competition_by_title(&new.title).is_some() {
            return Ok(None);
        }
        Ok(Some(tables.insert_competition(new)))
    }

    async fn add_membership(&self, user: &str, competition_id: i32) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        if tables
            .memberships
            .iter()
            .any(|m| m.user == user && m.competition_id == competition_id)
        {
            return Ok(false);
        }
        tables.memberships.push(Membership {
            user: user.to_string(),
            competition_id,
        });
        Ok(true)
    }

    async fn add_participation(&self, user: &str, competition_id: i32) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        if tables
            .participations
            .iter()
            .any(|p| p.user == user && p.competition_id == competition_id)
        {
            return Ok(false);
        }
        tables.participations.push(Participation {
            user: user.to_string(),
            competition_id,
            progress: Some("0".to_string()),
        });
        Ok(true)
    }

    async fn update_progress(
        &self,
        user: &str,
        competition_id: i32,
        progress: &str,
    ) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let participation = tables
            .participations
            .iter_mut()
            .find(|p| p.user == user && p.competition_id == competition_id);
        match participation {
            Some(participation) => {
                participation.progress = Some(progress.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn games(&self) -> anyhow::Result<Vec<Game>> {
        Ok(self.tables.read().await.games.clone())
    }

    async fn create_game(&self, name: &str, rules_json: &str) -> anyhow::Result<Game> {
        let mut tables = self.tables.write().await;
        let game = Game {
            id: tables.next_id(),
            name: name.to_string(),
            rules_json: rules_json.to_string(),
        };
        tables.games.push(game.clone());
        Ok(game)
    }

    async fn achievements(&self, rarities: &[String]) -> anyhow::Result<Vec<Achievement>> {
        let tables = self.tables.read().await;
        let mut achievements: Vec<Achievement> = tables
            .achievements
            .iter()
            .filter(|a| {
                rarities.is_empty() || rarities.iter().any(|r| r.eq_ignore_ascii_case(&a.rarity))
            })
            .cloned()
            .collect();
        achievements.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        Ok(achievements)
    }

    async fn achievement(&self, id: AchievementId) -> anyhow::Result<Option<Achievement>> {
        let tables = self.tables.read().await;
        Ok(tables.achievements.iter().find(|a| a.id == id).cloned())
    }

    async fn achievement_by_name(&self, name: &str) -> anyhow::Result<Option<Achievement>> {
        let tables = self.tables.read().await;
        Ok(tables.achievements.iter().find(|a| a.name == name).cloned())
    }

    #[instrument(skip(self))]
    async fn create_achievement(&self, new: NewAchievement) -> anyhow::Result<Achievement> {
        let mut tables = self.tables.write().await;
        if tables.achievements.iter().any(|a| a.name == new.name) {
            anyhow::bail!("achievement {} already exists", new.name);
        }
        let achievement = Achievement {
            id: tables.next_id(),
            name: new.name,
            description: new.description,
            rarity: new.rarity,
            points: new.points,
        };
        tables.achievements.push(achievement.clone());
        Ok(achievement)
    }

    async fn unlock_achievement(&self, user: &str, id: AchievementId) -> anyhow::Result<()> {
        self.tables.write().await.unlocks.push(Unlock {
            user: user.to_string(),
            achievement_id: id,
            unlocked_at: now(),
        });
        Ok(())
    }

    async fn unlocked_achievement_ids(&self, user: &str) -> anyhow::Result<Vec<AchievementId>> {
        let tables = self.tables.read().await;
        let mut ids: Vec<AchievementId> = tables
            .unlocks
            .iter()
            .filter(|u| u.user == user)
            .map(|u| u.achievement_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn rewards(&self, category: Option<&str>) -> anyhow::Result<Vec<Reward>> {
        let tables = self.tables.read().await;
        let mut rewards: Vec<Reward> = tables
            .rewards
            .iter()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .cloned()
            .collect();
        rewards.sort_by_key(|r| (r.points, r.id));
        Ok(rewards)
    }

    async fn reward(&self, id: i32) -> anyhow::Result<Option<Reward>> {
        let tables = self.tables.read().await;
        Ok(tables.rewards.iter().find(|r| r.id == id).cloned())
    }

    async fn create_reward(
        &self,
        name: &str,
        points: Points,
        category: &str,
    ) -> anyhow::Result<Reward> {
        let mut tables = self.tables.write().await;
        let reward = Reward {
            id: tables.next_id(),
            name: name.to_string(),
            points,
            category: category.to_string(),
        };
        tables.rewards.push(reward.clone());
        Ok(reward)
    }

    async fn add_redemption(
        &self,
        user: &str,
        _reward_id: Option<i32>,
        points: Points,
    ) -> anyhow::Result<()> {
        self.tables.write().await.redemptions.push(RedemptionRecord {
            user: user.to_string(),
            points,
        });
        Ok(())
    }

    async fn suggest_reward(
        &self,
        user: &str,
        name: &str,
        points: Points,
    ) -> anyhow::Result<RewardSuggestion> {
        let mut tables = self.tables.write().await;
        let suggestion = RewardSuggestion {
            id: tables.next_id(),
            name: name.to_string(),
            points,
            suggested_by: user.to_string(),
        };
        tables.suggestions.push(suggestion.clone());
        Ok(suggestion)
    }

    async fn set_manual_points(
        &self,
        user: &str,
        board: &str,
        points: Points,
    ) -> anyhow::Result<()> {
        self.tables
            .write()
            .await
            .manual_entries
            .insert((user.to_string(), board.to_string()), points);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn donate(
        &self,
        donor: &str,
        amount: Points,
        recipient: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        let credit = match recipient {
            Some(recipient) => {
                let key = (recipient.to_string(), GLOBAL_BOARD.to_string());
                let current = tables.manual_entries.get(&key).copied().unwrap_or_default();
                let balance = current.checked_add(amount).ok_or_else(|| {
                    anyhow::anyhow!("manual balance of {recipient} would overflow")
                })?;
                Some((key, balance))
            }
            None => None,
        };

        tables.redemptions.push(RedemptionRecord {
            user: donor.to_string(),
            points: amount,
        });
        if let Some((key, balance)) = credit {
            tables.manual_entries.insert(key, balance);
        }
        Ok(())
    }

    async fn create_team(
        &self,
        name: &str,
        owner: &str,
        members: &[String],
    ) -> anyhow::Result<Team> {
        let mut tables = self.tables.write().await;
        let team = Team {
            id: tables.next_id(),
            name: name.to_string(),
            owner: owner.to_string(),
            members: team_roster(owner, members),
        };
        tables.teams.push(team.clone());
        Ok(team)
    }

    async fn teammates(&self, user: &str) -> anyhow::Result<Vec<String>> {
        let tables = self.tables.read().await;
        let mut teammates: Vec<String> = tables
            .teams
            .iter()
            .filter(|team| team.members.iter().any(|m| m == user))
            .flat_map(|team| team.members.iter())
            .filter(|member| member.as_str() != user)
            .cloned()
            .collect();
        teammates.sort();
        teammates.dedup();
        Ok(teammates)
    }

    async fn send_challenge(
        &self,
        sender: &str,
        recipient: &str,
        challenge: &str,
    ) -> anyhow::Result<Challenge> {
        let mut tables = self.tables.write().await;
        let challenge = Challenge {
            id: tables.next_id(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            challenge: challenge.to_string(),
            created_at: now(),
        };
        tables.challenges.push(challenge.clone());
        Ok(challenge)
    }

    async fn challenges(&self) -> anyhow::Result<Vec<Challenge>> {
        Ok(self.tables.read().await.challenges.clone())
    }

    async fn record_activity(&self, user: &str, action: &str) -> anyhow::Result<()> {
        self.tables.write().await.activities.push(Activity {
            user_id: user.to_string(),
            action: action.to_string(),
            created_at: now(),
        });
        Ok(())
    }

    async fn activity_feed(&self, limit: i64) -> anyhow::Result<Vec<Activity>> {
        let tables = self.tables.read().await;
        // Insertion order is chronological, so reversing gives newest first
        Ok(tables
            .activities
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn add_prediction(&self, user: &str, prediction: &str) -> anyhow::Result<Prediction> {
        let mut tables = self.tables.write().await;
        let prediction = Prediction {
            id: tables.next_id(),
            user_id: user.to_string(),
            prediction: prediction.to_string(),
            created_at: now(),
        };
        tables.predictions.push(prediction.clone());
        Ok(prediction)
    }
}
