use std::sync::Arc;

use rocket::{http::Status, serde::json::Json, State};
use serde_json::Value;

use crate::{
    db::types::NewCompetition,
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    store::Store,
    types::{
        non_blank, CompetitionResponse, CreateGameRequest, CustomGameRequest, GameResponse,
        JoinGameRequest, JoinResponse, ProgressResponse, ProgressUpdateRequest,
    },
};

/// Progress is kept as text. Strings are stored without their JSON quotes so
/// that `"42"` and `42` count the same.
fn progress_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[utoipa::path(context_path = "/games", request_body = CreateGameRequest, responses(
    (status = 201, description = "Create a competition", body = CompetitionResponse),
    (status = 400, description = "Missing or already used title", body = ErrorResponse)
))]
#[post("/create", data = "<body>")]
pub async fn create(
    store: &State<Arc<dyn Store>>,
    body: Json<CreateGameRequest>,
) -> ApiResult<(Status, Json<CompetitionResponse>)> {
    let body = body.into_inner();
    let title = non_blank(body.title).ok_or_else(|| ApiError::bad_request("title is required"))?;
    let competition = store
        .create_competition(NewCompetition {
            title: title.clone(),
            description: non_blank(body.description),
            start_at: body.start_at,
            end_at: body.end_at,
        })
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("competition {title} already exists")))?;
    tracing::info!("Created competition {}", competition.title);
    Ok((Status::Created, Json(competition.into())))
}

#[utoipa::path(context_path = "/games", responses(
    (status = 200, description = "Active competitions", body = [CompetitionResponse])
))]
#[get("/active")]
pub async fn active(store: &State<Arc<dyn Store>>) -> ApiResult<Json<Vec<CompetitionResponse>>> {
    let competitions = store.competitions(true).await?;
    Ok(Json(competitions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(context_path = "/games", request_body = JoinGameRequest, responses(
    (status = 200, description = "Start tracking progress in a competition", body = JoinResponse),
    (status = 400, description = "Missing competition id", body = ErrorResponse),
    (status = 404, description = "Unknown competition", body = ErrorResponse)
))]
#[post("/join", data = "<body>")]
pub async fn join(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<JoinGameRequest>,
) -> ApiResult<Json<JoinResponse>> {
    let id = body
        .competition_id
        .ok_or_else(|| ApiError::bad_request("competition_id is required"))?;
    let competition = store
        .competition(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("competition {id} not found")))?;

    let joined = store.add_participation(player.name(), competition.id).await?;
    if joined {
        store
            .record_activity(player.name(), &format!("joined the {}", competition.title))
            .await?;
    }

    Ok(Json(JoinResponse {
        message: if joined { "joined" } else { "already joined" }.to_string(),
        competition: competition.into(),
    }))
}

#[utoipa::path(context_path = "/games", request_body = ProgressUpdateRequest, responses(
    (status = 200, description = "Record progress in a joined competition", body = ProgressResponse),
    (status = 400, description = "Missing competition id or progress", body = ErrorResponse),
    (status = 404, description = "The player has not joined the competition", body = ErrorResponse)
))]
#[put("/progress/update", data = "<body>")]
pub async fn update_progress(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<ProgressUpdateRequest>,
) -> ApiResult<Json<ProgressResponse>> {
    let body = body.into_inner();
    let competition_id = body
        .competition_id
        .ok_or_else(|| ApiError::bad_request("competition_id is required"))?;
    let progress = body
        .progress
        .filter(|value| !value.is_null())
        .map(progress_text)
        .ok_or_else(|| ApiError::bad_request("progress is required"))?;

    if !store
        .update_progress(player.name(), competition_id, &progress)
        .await?
    {
        return Err(ApiError::not_found(format!(
            "{} has not joined competition {competition_id}",
            player.name()
        )));
    }

    Ok(Json(ProgressResponse {
        message: "progress updated".to_string(),
        competition_id,
        progress,
    }))
}

#[utoipa::path(context_path = "/games", responses(
    (status = 200, description = "Games with their rules", body = [GameResponse])
))]
#[get("/rules")]
pub async fn rules(store: &State<Arc<dyn Store>>) -> ApiResult<Json<Vec<GameResponse>>> {
    let games = store.games().await?;
    Ok(Json(games.into_iter().map(Into::into).collect()))
}

#[utoipa::path(context_path = "/games", request_body = CustomGameRequest, responses(
    (status = 201, description = "Create a game with custom rules", body = GameResponse),
    (status = 400, description = "Missing name", body = ErrorResponse)
))]
#[post("/custom/create", data = "<body>")]
pub async fn create_custom(
    store: &State<Arc<dyn Store>>,
    body: Json<CustomGameRequest>,
) -> ApiResult<(Status, Json<GameResponse>)> {
    let body = body.into_inner();
    let name = non_blank(body.name).ok_or_else(|| ApiError::bad_request("name is required"))?;
    let rules = body
        .rules
        .unwrap_or_else(|| Value::Object(Default::default()));
    let game = store.create_game(&name, &rules.to_string()).await?;
    Ok((Status::Created, Json(game.into())))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing game entrypoints", |rocket| async {
        rocket.mount(
            "/games",
            rocket::routes![create, active, join, update_progress, rules, create_custom],
        )
    })
}
