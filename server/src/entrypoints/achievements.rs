use std::{collections::HashSet, str::FromStr, sync::Arc};

use rocket::{http::Status, serde::json::Json, State};
use shared::{AchievementId, Rarity};

use crate::{
    db::types::{Achievement, NewAchievement},
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    store::Store,
    types::{
        non_blank, AchievementProgressResponse, AchievementRequest, AchievementResponse,
        CreateAchievementRequest, ShareResponse, UnlockResponse,
    },
};

const DEFAULT_CUSTOM_POINTS: i64 = 10;

async fn find_achievement(store: &dyn Store, id: Option<AchievementId>) -> ApiResult<Achievement> {
    let id = id.ok_or_else(|| ApiError::bad_request("achievement_id is required"))?;
    store
        .achievement(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("achievement {id} not found")))
}

#[utoipa::path(context_path = "/achievements", responses(
    (status = 200, description = "Achievements, optionally filtered by rarity", body = [AchievementResponse])
))]
#[get("/available?<rarity>")]
pub async fn available(
    store: &State<Arc<dyn Store>>,
    rarity: Option<String>,
) -> ApiResult<Json<Vec<AchievementResponse>>> {
    let filter: Vec<String> = non_blank(rarity)
        .map(|r| vec![r.to_lowercase()])
        .unwrap_or_default();
    let achievements = store.achievements(&filter).await?;
    Ok(Json(achievements.into_iter().map(Into::into).collect()))
}

#[utoipa::path(context_path = "/achievements", request_body = AchievementRequest, responses(
    (status = 200, description = "Unlock an achievement for the current player", body = UnlockResponse),
    (status = 400, description = "Missing achievement id", body = ErrorResponse),
    (status = 404, description = "Unknown achievement", body = ErrorResponse)
))]
#[post("/unlock", data = "<body>")]
pub async fn unlock(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<AchievementRequest>,
) -> ApiResult<Json<UnlockResponse>> {
    let achievement = find_achievement(store.inner().as_ref(), body.achievement_id).await?;
    store
        .unlock_achievement(player.name(), achievement.id)
        .await?;
    store
        .record_activity(
            player.name(),
            &format!("unlocked achievement {}", achievement.name),
        )
        .await?;
    tracing::info!("{} unlocked {}", player.name(), achievement.name);

    Ok(Json(UnlockResponse {
        message: "unlocked".to_string(),
        achievement: achievement.into(),
    }))
}

#[utoipa::path(context_path = "/achievements", responses(
    (status = 200, description = "Unlocked and locked achievements of the current player", body = AchievementProgressResponse)
))]
#[get("/my-progress")]
pub async fn my_progress(
    store: &State<Arc<dyn Store>>,
    player: Player,
) -> ApiResult<Json<AchievementProgressResponse>> {
    let unlocked_ids: HashSet<AchievementId> = store
        .unlocked_achievement_ids(player.name())
        .await?
        .into_iter()
        .collect();
    let (unlocked, locked): (Vec<Achievement>, Vec<Achievement>) = store
        .achievements(&[])
        .await?
        .into_iter()
        .partition(|a| unlocked_ids.contains(&a.id));

    Ok(Json(AchievementProgressResponse {
        user_id: player.0,
        unlocked: unlocked.into_iter().map(Into::into).collect(),
        locked: locked.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(context_path = "/achievements", request_body = CreateAchievementRequest, responses(
    (status = 201, description = "Create a custom achievement", body = AchievementResponse),
    (status = 400, description = "Missing or duplicate name, or unknown rarity", body = ErrorResponse)
))]
#[post("/create-custom", data = "<body>")]
pub async fn create_custom(
    store: &State<Arc<dyn Store>>,
    body: Json<CreateAchievementRequest>,
) -> ApiResult<(Status, Json<AchievementResponse>)> {
    let body = body.into_inner();
    let name = non_blank(body.name).ok_or_else(|| ApiError::bad_request("name is required"))?;
    let rarity = match non_blank(body.rarity) {
        Some(tag) => Rarity::from_str(&tag)
            .map_err(|_| ApiError::bad_request(format!("unknown rarity {tag}")))?,
        None => Rarity::Common,
    };
    if store.achievement_by_name(&name).await?.is_some() {
        return Err(ApiError::bad_request(format!(
            "achievement {name} already exists"
        )));
    }

    let achievement = store
        .create_achievement(NewAchievement {
            name,
            description: non_blank(body.description),
            rarity: rarity.to_string(),
            points: body.points.unwrap_or(DEFAULT_CUSTOM_POINTS),
        })
        .await?;
    Ok((Status::Created, Json(achievement.into())))
}

#[utoipa::path(context_path = "/achievements", responses(
    (status = 200, description = "Rare, epic and legendary achievements", body = [AchievementResponse])
))]
#[get("/rare")]
pub async fn rare(store: &State<Arc<dyn Store>>) -> ApiResult<Json<Vec<AchievementResponse>>> {
    let tiers: Vec<String> = Rarity::rare_tiers().iter().map(ToString::to_string).collect();
    let achievements = store.achievements(&tiers).await?;
    Ok(Json(achievements.into_iter().map(Into::into).collect()))
}

#[utoipa::path(context_path = "/achievements", request_body = AchievementRequest, responses(
    (status = 200, description = "Share an achievement to the activity feed", body = ShareResponse),
    (status = 400, description = "Missing achievement id", body = ErrorResponse),
    (status = 404, description = "Unknown achievement", body = ErrorResponse)
))]
#[post("/share", data = "<body>")]
pub async fn share(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<AchievementRequest>,
) -> ApiResult<Json<ShareResponse>> {
    let achievement = find_achievement(store.inner().as_ref(), body.achievement_id).await?;
    store
        .record_activity(
            player.name(),
            &format!("shared achievement {}", achievement.name),
        )
        .await?;

    Ok(Json(ShareResponse {
        message: "shared".to_string(),
        achievement_id: achievement.id,
    }))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing achievement entrypoints", |rocket| async {
        rocket.mount(
            "/achievements",
            rocket::routes![available, unlock, my_progress, create_custom, rare, share],
        )
    })
}
