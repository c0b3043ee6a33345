use std::sync::Arc;

use rocket::{http::Status, serde::json::Json, State};
use shared::{player_summary, PlayerSummary, Points};

use crate::{
    db::types::{PERK_CATEGORY, STORE_CATEGORY},
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    store::Store,
    types::{
        non_blank, CatalogResponse, DonateRequest, DonationResponse, MyPointsResponse,
        RedeemRequest, RedeemResponse, SuggestRequest, SuggestResponse,
    },
};

const SUCCESS: &str = "success";

async fn current_summary(store: &dyn Store, user: &str) -> ApiResult<PlayerSummary> {
    let records = store.score_records().await?;
    Ok(player_summary(&records, user))
}

/// Balance after spending `cost`, or a 400 when the player cannot afford it.
fn remaining_after(summary: &PlayerSummary, cost: Points) -> ApiResult<Points> {
    if summary.total_points < cost {
        return Err(ApiError::bad_request(format!(
            "insufficient points: {} available, {cost} required",
            summary.total_points
        )));
    }
    Ok(summary.total_points - cost)
}

async fn catalog(store: &dyn Store, category: &str) -> ApiResult<CatalogResponse> {
    let rewards = store.rewards(Some(category)).await?;
    Ok(CatalogResponse {
        status: SUCCESS.to_string(),
        rewards: rewards.into_iter().map(Into::into).collect(),
    })
}

#[utoipa::path(context_path = "/social", responses(
    (status = 200, description = "Perks that can be redeemed with points", body = CatalogResponse)
))]
#[get("/available")]
pub async fn available(store: &State<Arc<dyn Store>>) -> ApiResult<Json<CatalogResponse>> {
    Ok(Json(catalog(store.inner().as_ref(), PERK_CATEGORY).await?))
}

#[utoipa::path(context_path = "/social", responses(
    (status = 200, description = "Store items that can be bought with points", body = CatalogResponse)
))]
#[get("/store")]
pub async fn store_items(store: &State<Arc<dyn Store>>) -> ApiResult<Json<CatalogResponse>> {
    Ok(Json(catalog(store.inner().as_ref(), STORE_CATEGORY).await?))
}

#[utoipa::path(context_path = "/social", request_body = RedeemRequest, responses(
    (status = 200, description = "Spend points on a reward", body = RedeemResponse),
    (status = 400, description = "Missing reward id or not enough points", body = ErrorResponse),
    (status = 404, description = "Unknown reward", body = ErrorResponse)
))]
#[post("/redeem", data = "<body>")]
pub async fn redeem(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<RedeemRequest>,
) -> ApiResult<Json<RedeemResponse>> {
    let id = body
        .reward_id
        .ok_or_else(|| ApiError::bad_request("reward_id is required"))?;
    let reward = store
        .reward(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("reward {id} not found")))?;

    let summary = current_summary(store.inner().as_ref(), player.name()).await?;
    let remaining_points = remaining_after(&summary, reward.points)?;
    store
        .add_redemption(player.name(), Some(reward.id), reward.points)
        .await?;
    tracing::info!("{} redeemed {}", player.name(), reward.name);

    Ok(Json(RedeemResponse {
        status: SUCCESS.to_string(),
        reward: reward.into(),
        redeemed_by: player.0,
        remaining_points,
    }))
}

#[utoipa::path(context_path = "/social", responses(
    (status = 200, description = "Point balance of the current player", body = MyPointsResponse)
))]
#[get("/my-points")]
pub async fn my_points(
    store: &State<Arc<dyn Store>>,
    player: Player,
) -> ApiResult<Json<MyPointsResponse>> {
    let summary = current_summary(store.inner().as_ref(), player.name()).await?;
    Ok(Json(MyPointsResponse {
        status: SUCCESS.to_string(),
        user: player.0,
        points: summary.total_points,
        summary: summary.into(),
    }))
}

#[utoipa::path(context_path = "/social", request_body = DonateRequest, responses(
    (status = 200, description = "Donate points to a charity or a colleague", body = DonationResponse),
    (status = 400, description = "Invalid amount, no target or not enough points", body = ErrorResponse)
))]
#[post("/donate-points", data = "<body>")]
pub async fn donate_points(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<DonateRequest>,
) -> ApiResult<Json<DonationResponse>> {
    let body = body.into_inner();
    let amount = body
        .amount
        .filter(|amount| *amount > 0)
        .ok_or_else(|| ApiError::bad_request("amount must be a positive number"))?;
    let charity = non_blank(body.charity);
    let recipient = non_blank(body.recipient);
    if charity.is_none() && recipient.is_none() {
        return Err(ApiError::bad_request("charity or recipient is required"));
    }

    let summary = current_summary(store.inner().as_ref(), player.name()).await?;
    let remaining_points = remaining_after(&summary, amount)?;
    store
        .donate(player.name(), amount, recipient.as_deref())
        .await?;
    tracing::info!("{} donated {amount} points", player.name());

    Ok(Json(DonationResponse {
        status: SUCCESS.to_string(),
        donated: amount,
        charity,
        recipient,
        donated_by: player.0,
        remaining_points,
    }))
}

#[utoipa::path(context_path = "/social", request_body = SuggestRequest, responses(
    (status = 201, description = "Suggest a new reward for the catalog", body = SuggestResponse),
    (status = 400, description = "Missing name or points", body = ErrorResponse)
))]
#[post("/suggest", data = "<body>")]
pub async fn suggest(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<SuggestRequest>,
) -> ApiResult<(Status, Json<SuggestResponse>)> {
    let body = body.into_inner();
    let (Some(name), Some(points)) = (non_blank(body.name), body.points) else {
        return Err(ApiError::bad_request("name and points are required"));
    };
    let suggestion = store.suggest_reward(player.name(), &name, points).await?;

    Ok((
        Status::Created,
        Json(SuggestResponse {
            status: SUCCESS.to_string(),
            suggested_reward: suggestion.into(),
        }),
    ))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing points economy entrypoints", |rocket| async {
        rocket.mount(
            "/social",
            rocket::routes![available, store_items, redeem, my_points, donate_points, suggest],
        )
    })
}
