use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rocket::{
    fairing::{self, AdHoc},
    Build, Rocket,
};
use rocket_db_pools::Database;
use shared::{
    AchievementId, AchievementInfo, ManualEntry, MembershipRecord, Points, ProgressRecord,
    RedemptionRecord, ScoreRecords, UnlockRecord, GLOBAL_BOARD,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::store::Store;

#[derive(Database, Clone, Debug)]
#[database("office-arena")]
pub struct DB(PgPool);

pub mod types;

use self::types::{
    Achievement, Activity, Challenge, Competition, Game, NewAchievement, NewCompetition,
    Prediction, Reward, RewardSuggestion, Team,
};

const COMPETITION_COLUMNS: &str = "id, title, description, start_at, end_at, is_active";

#[async_trait]
impl Store for DB {
    #[instrument(skip(self))]
    async fn score_records(&self) -> anyhow::Result<ScoreRecords> {
        let progress = sqlx::query_as::<_, (String, String, Option<String>)>(
            r#"
            SELECT p.user_id, c.title, p.progress
            FROM participations p
            JOIN competitions c ON c.id = p.competition_id
            "#,
        )
        .fetch_all(&self.0)
        .await?
        .into_iter()
        .map(|(user, competition, progress)| ProgressRecord {
            user,
            competition,
            progress,
        })
        .collect();

        let memberships = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT uc.user_id, c.title
            FROM user_competitions uc
            JOIN competitions c ON c.id = uc.competition_id
            "#,
        )
        .fetch_all(&self.0)
        .await?
        .into_iter()
        .map(|(user, competition)| MembershipRecord { user, competition })
        .collect();

        let unlocks = sqlx::query_as::<_, (String, i32, NaiveDateTime)>(
            "SELECT user_id, achievement_id, unlocked_at FROM user_achievements",
        )
        .fetch_all(&self.0)
        .await?
        .into_iter()
        .map(|(user, achievement_id, unlocked_at)| UnlockRecord {
            user,
            achievement_id,
            unlocked_at,
        })
        .collect();

        let achievements = sqlx::query_as::<_, (i32, String, String)>(
            "SELECT id, name, rarity FROM achievements",
        )
        .fetch_all(&self.0)
        .await?
        .into_iter()
        .map(|(id, name, rarity)| (id, AchievementInfo { name, rarity }))
        .collect();

        let manual_entries = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT user_id, board, points FROM manual_leaderboard_entries",
        )
        .fetch_all(&self.0)
        .await?
        .into_iter()
        .map(|(user, board, points)| ManualEntry {
            user,
            board,
            points,
        })
        .collect();

        let redemptions =
            sqlx::query_as::<_, (String, i64)>("SELECT user_id, points FROM redemptions")
                .fetch_all(&self.0)
                .await?
                .into_iter()
                .map(|(user, points)| RedemptionRecord { user, points })
                .collect();

        Ok(ScoreRecords {
            progress,
            memberships,
            unlocks,
            achievements,
            manual_entries,
            redemptions,
        })
    }

    #[instrument(skip(self))]
    async fn competitions(&self, active_only: bool) -> anyhow::Result<Vec<Competition>> {
        let records = sqlx::query_as::<_, Competition>(&format!(
            r#"
            SELECT {COMPETITION_COLUMNS}
            FROM competitions
            WHERE is_active OR NOT $1
            ORDER BY id
            "#
        ))
        .bind(active_only)
        .fetch_all(&self.0)
        .await?;
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn competition(&self, id: i32) -> anyhow::Result<Option<Competition>> {
        Ok(sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn ensure_competition(&self, new: NewCompetition) -> anyhow::Result<Competition> {
        Ok(sqlx::query_as::<_, Competition>(&format!(
            r#"
            INSERT INTO competitions (title, description, start_at, end_at, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (title) DO UPDATE SET title = EXCLUDED.title
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.start_at)
        .bind(new.end_at)
        .fetch_one(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn create_competition(
        &self,
        new: NewCompetition,
    ) -> anyhow::Result<Option<Competition>> {
        Ok(sqlx::query_as::<_, Competition>(&format!(
            r#"
            INSERT INTO competitions (title, description, start_at, end_at, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (title) DO NOTHING
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.start_at)
        .bind(new.end_at)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn add_membership(&self, user: &str, competition_id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_competitions (user_id, competition_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, competition_id) DO NOTHING
            "#,
        )
        .bind(user)
        .bind(competition_id)
        .execute(&self.0)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn add_participation(&self, user: &str, competition_id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO participations (user_id, competition_id, progress)
            VALUES ($1, $2, '0')
            ON CONFLICT (user_id, competition_id) DO NOTHING
            "#,
        )
        .bind(user)
        .bind(competition_id)
        .execute(&self.0)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_progress(
        &self,
        user: &str,
        competition_id: i32,
        progress: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE participations
            SET progress = $3
            WHERE user_id = $1 AND competition_id = $2
            "#,
        )
        .bind(user)
        .bind(competition_id)
        .bind(progress)
        .execute(&self.0)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn games(&self) -> anyhow::Result<Vec<Game>> {
        Ok(
            sqlx::query_as::<_, Game>("SELECT id, name, rules_json FROM games ORDER BY id")
                .fetch_all(&self.0)
                .await?,
        )
    }

    #[instrument(skip(self))]
    async fn create_game(&self, name: &str, rules_json: &str) -> anyhow::Result<Game> {
        Ok(sqlx::query_as::<_, Game>(
            r#"
            INSERT INTO games (name, rules_json)
            VALUES ($1, $2)
            RETURNING id, name, rules_json
            "#,
        )
        .bind(name)
        .bind(rules_json)
        .fetch_one(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn achievements(&self, rarities: &[String]) -> anyhow::Result<Vec<Achievement>> {
        let rarities: Vec<String> = rarities.iter().map(|r| r.to_lowercase()).collect();
        Ok(sqlx::query_as::<_, Achievement>(
            r#"
            SELECT id, name, description, rarity, points
            FROM achievements
            WHERE cardinality($1::text[]) = 0 OR lower(rarity) = ANY($1)
            ORDER BY points DESC, name ASC
            "#,
        )
        .bind(rarities)
        .fetch_all(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn achievement(&self, id: AchievementId) -> anyhow::Result<Option<Achievement>> {
        Ok(sqlx::query_as::<_, Achievement>(
            "SELECT id, name, description, rarity, points FROM achievements WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn achievement_by_name(&self, name: &str) -> anyhow::Result<Option<Achievement>> {
        Ok(sqlx::query_as::<_, Achievement>(
            "SELECT id, name, description, rarity, points FROM achievements WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn create_achievement(&self, new: NewAchievement) -> anyhow::Result<Achievement> {
        Ok(sqlx::query_as::<_, Achievement>(
            r#"
            INSERT INTO achievements (name, description, rarity, points)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, rarity, points
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.rarity)
        .bind(new.points)
        .fetch_one(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn unlock_achievement(&self, user: &str, id: AchievementId) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO user_achievements (user_id, achievement_id) VALUES ($1, $2)")
            .bind(user)
            .bind(id)
            .execute(&self.0)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn unlocked_achievement_ids(&self, user: &str) -> anyhow::Result<Vec<AchievementId>> {
        let rec = sqlx::query_as::<_, (i32,)>(
            "SELECT DISTINCT achievement_id FROM user_achievements WHERE user_id = $1",
        )
        .bind(user)
        .fetch_all(&self.0)
        .await?;
        Ok(rec.into_iter().map(|(id,)| id).collect())
    }

    #[instrument(skip(self))]
    async fn rewards(&self, category: Option<&str>) -> anyhow::Result<Vec<Reward>> {
        Ok(sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, name, points, category
            FROM rewards
            WHERE $1::text IS NULL OR category = $1
            ORDER BY points, id
            "#,
        )
        .bind(category)
        .fetch_all(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn reward(&self, id: i32) -> anyhow::Result<Option<Reward>> {
        Ok(sqlx::query_as::<_, Reward>(
            "SELECT id, name, points, category FROM rewards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn create_reward(
        &self,
        name: &str,
        points: Points,
        category: &str,
    ) -> anyhow::Result<Reward> {
        Ok(sqlx::query_as::<_, Reward>(
            r#"
            INSERT INTO rewards (name, points, category)
            VALUES ($1, $2, $3)
            RETURNING id, name, points, category
            "#,
        )
        .bind(name)
        .bind(points)
        .bind(category)
        .fetch_one(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn add_redemption(
        &self,
        user: &str,
        reward_id: Option<i32>,
        points: Points,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO redemptions (user_id, reward_id, points) VALUES ($1, $2, $3)")
            .bind(user)
            .bind(reward_id)
            .bind(points)
            .execute(&self.0)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn suggest_reward(
        &self,
        user: &str,
        name: &str,
        points: Points,
    ) -> anyhow::Result<RewardSuggestion> {
        Ok(sqlx::query_as::<_, RewardSuggestion>(
            r#"
            INSERT INTO reward_suggestions (name, points, suggested_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, points, suggested_by
            "#,
        )
        .bind(name)
        .bind(points)
        .bind(user)
        .fetch_one(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn set_manual_points(
        &self,
        user: &str,
        board: &str,
        points: Points,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO manual_leaderboard_entries (user_id, board, points)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, board) DO UPDATE
            SET points = EXCLUDED.points
            "#,
        )
        .bind(user)
        .bind(board)
        .bind(points)
        .execute(&self.0)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn donate(
        &self,
        donor: &str,
        amount: Points,
        recipient: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut tx = self.0.begin().await?;
        sqlx::query("INSERT INTO redemptions (user_id, reward_id, points) VALUES ($1, NULL, $2)")
            .bind(donor)
            .bind(amount)
            .execute(&mut *tx)
            .await?;

        if let Some(recipient) = recipient {
            sqlx::query(
                r#"
                INSERT INTO manual_leaderboard_entries (user_id, board, points)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, board) DO UPDATE
                SET points = manual_leaderboard_entries.points + EXCLUDED.points
                "#,
            )
            .bind(recipient)
            .bind(GLOBAL_BOARD)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_team(
        &self,
        name: &str,
        owner: &str,
        members: &[String],
    ) -> anyhow::Result<Team> {
        let mut tx = self.0.begin().await?;
        let (id,) = sqlx::query_as::<_, (i32,)>(
            "INSERT INTO teams (name, owner) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        let members = crate::store::team_roster(owner, members);
        for member in &members {
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (team_id, user_id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(member)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(Team {
            id,
            name: name.to_string(),
            owner: owner.to_string(),
            members,
        })
    }

    #[instrument(skip(self))]
    async fn teammates(&self, user: &str) -> anyhow::Result<Vec<String>> {
        let rec = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT DISTINCT m.user_id
            FROM team_members m
            JOIN team_members mine ON mine.team_id = m.team_id
            WHERE mine.user_id = $1 AND m.user_id <> $1
            ORDER BY m.user_id
            "#,
        )
        .bind(user)
        .fetch_all(&self.0)
        .await?;
        Ok(rec.into_iter().map(|(name,)| name).collect())
    }

    #[instrument(skip(self))]
    async fn send_challenge(
        &self,
        sender: &str,
        recipient: &str,
        challenge: &str,
    ) -> anyhow::Result<Challenge> {
        Ok(sqlx::query_as::<_, Challenge>(
            r#"
            INSERT INTO challenges (sender, recipient, challenge)
            VALUES ($1, $2, $3)
            RETURNING id, sender, recipient, challenge, created_at
            "#,
        )
        .bind(sender)
        .bind(recipient)
        .bind(challenge)
        .fetch_one(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn challenges(&self) -> anyhow::Result<Vec<Challenge>> {
        Ok(sqlx::query_as::<_, Challenge>(
            "SELECT id, sender, recipient, challenge, created_at FROM challenges ORDER BY id",
        )
        .fetch_all(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn record_activity(&self, user: &str, action: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO activities (user_id, action) VALUES ($1, $2)")
            .bind(user)
            .bind(action)
            .execute(&self.0)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn activity_feed(&self, limit: i64) -> anyhow::Result<Vec<Activity>> {
        Ok(sqlx::query_as::<_, Activity>(
            r#"
            SELECT user_id, action, created_at
            FROM activities
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn add_prediction(&self, user: &str, prediction: &str) -> anyhow::Result<Prediction> {
        Ok(sqlx::query_as::<_, Prediction>(
            r#"
            INSERT INTO predictions (user_id, prediction)
            VALUES ($1, $2)
            RETURNING id, user_id, prediction, created_at
            "#,
        )
        .bind(user)
        .bind(prediction)
        .fetch_one(&self.0)
        .await?)
    }
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => match sqlx::migrate!("./migrations").run(&**db).await {
            Ok(_) => Ok(rocket),
            Err(e) => {
                rocket::error!("Failed to initialize SQLx database: {}", e);
                Err(rocket)
            }
        },
        None => Err(rocket),
    }
}

async fn manage_store(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => {
            let store: Arc<dyn Store> = Arc::new(db.clone());
            Ok(rocket.manage(store))
        }
        None => Err(rocket),
    }
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket
            .attach(DB::init())
            .attach(AdHoc::try_on_ignite("SQLx Migrations", run_migrations))
            .attach(AdHoc::try_on_ignite("Postgres store", manage_store))
    })
}
