use std::sync::Arc;

use rocket::{serde::json::Json, State};
use shared::{
    aggregate_players, hall_of_fame, monthly_leaders, player_summary, rank_players, GLOBAL_BOARD,
};

use crate::{
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    store::Store,
    types::{
        non_blank, HallOfFameListResponse, ManualEntryRequest, ManualEntryResponse,
        MonthlyLeaderboardResponse, PaginatedResponse, PredictionRequest, PredictionResponse,
        RankedPlayerResponse, TeamLeaderboardResponse,
    },
};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 100;

#[utoipa::path(context_path = "/leaderboards", responses(
    (status = 200, description = "Every player ranked by total points", body = PaginatedPlayerResponse)
), params(
    ("page" = Option<u64>, Query, description = "Zero-based page"),
    ("limit" = Option<u64>, Query, description = "Page size, at most 100")
))]
#[get("/global?<page>&<limit>")]
pub async fn global(
    store: &State<Arc<dyn Store>>,
    page: Option<u64>,
    limit: Option<u64>,
) -> ApiResult<Json<PaginatedResponse<RankedPlayerResponse>>> {
    let page = page.unwrap_or(0);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let records = store.score_records().await?;
    let ranked = rank_players(aggregate_players(&records));
    let total = ranked.len() as u64;
    let page_records = ranked
        .into_iter()
        .skip(usize::try_from(page.saturating_mul(limit)).unwrap_or(usize::MAX))
        .take(limit as usize)
        .map(Into::into)
        .collect();

    Ok(Json(PaginatedResponse::new(
        page_records,
        page.saturating_add(1),
        limit,
        total,
    )))
}

#[utoipa::path(context_path = "/leaderboards", responses(
    (status = 200, description = "The current player ranked against their teammates", body = TeamLeaderboardResponse)
))]
#[get("/team")]
pub async fn team(
    store: &State<Arc<dyn Store>>,
    player: Player,
) -> ApiResult<Json<TeamLeaderboardResponse>> {
    let teammates = store.teammates(player.name()).await?;
    let records = store.score_records().await?;
    let summaries = std::iter::once(player.name())
        .chain(teammates.iter().map(String::as_str).filter(|m| *m != player.name()))
        .map(|member| player_summary(&records, member))
        .collect();

    Ok(Json(TeamLeaderboardResponse {
        leaderboard: rank_players(summaries).into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(context_path = "/leaderboards", responses(
    (status = 200, description = "Top achievement earner of every month", body = MonthlyLeaderboardResponse)
))]
#[get("/monthly")]
pub async fn monthly(store: &State<Arc<dyn Store>>) -> ApiResult<Json<MonthlyLeaderboardResponse>> {
    let records = store.score_records().await?;
    Ok(Json(MonthlyLeaderboardResponse {
        leaderboard: monthly_leaders(&records)
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}

#[utoipa::path(context_path = "/leaderboards", responses(
    (status = 200, description = "Players with rare or better achievements", body = HallOfFameListResponse)
))]
#[get("/hall-of-fame")]
pub async fn hall_of_fame_list(
    store: &State<Arc<dyn Store>>,
) -> ApiResult<Json<HallOfFameListResponse>> {
    let records = store.score_records().await?;
    Ok(Json(HallOfFameListResponse {
        hall_of_fame: hall_of_fame(&records).into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(context_path = "/leaderboards", request_body = PredictionRequest, responses(
    (status = 200, description = "Store a prediction about the standings", body = PredictionResponse),
    (status = 400, description = "Missing prediction", body = ErrorResponse)
))]
#[post("/predictions", data = "<body>")]
pub async fn predictions(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<PredictionRequest>,
) -> ApiResult<Json<PredictionResponse>> {
    let prediction = non_blank(body.into_inner().prediction)
        .ok_or_else(|| ApiError::bad_request("prediction is required"))?;
    let stored = store.add_prediction(player.name(), &prediction).await?;

    Ok(Json(PredictionResponse {
        message: "Prediction received".to_string(),
        prediction: stored.prediction,
    }))
}

#[utoipa::path(context_path = "/leaderboards", request_body = ManualEntryRequest, responses(
    (status = 200, description = "Set a manual leaderboard entry", body = ManualEntryResponse),
    (status = 400, description = "Missing user or points", body = ErrorResponse)
))]
#[put("/manual", data = "<body>")]
pub async fn manual_entry(
    store: &State<Arc<dyn Store>>,
    body: Json<ManualEntryRequest>,
) -> ApiResult<Json<ManualEntryResponse>> {
    let body = body.into_inner();
    let (Some(user), Some(points)) = (non_blank(body.user), body.points) else {
        return Err(ApiError::bad_request("user and points are required"));
    };
    let board = non_blank(body.board).unwrap_or_else(|| GLOBAL_BOARD.to_string());
    store.set_manual_points(&user, &board, points).await?;
    tracing::info!("Manual entry for {user} on {board} set to {points}");

    Ok(Json(ManualEntryResponse {
        user,
        board,
        points,
    }))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing leaderboard entrypoints", |rocket| async {
        rocket.mount(
            "/leaderboards",
            rocket::routes![
                global,
                team,
                monthly,
                hall_of_fame_list,
                predictions,
                manual_entry
            ],
        )
    })
}
