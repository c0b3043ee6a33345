use std::sync::Arc;

use rocket::{http::Status, serde::json::Json, State};

use crate::{
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    store::Store,
    types::{
        non_blank, CelebrationRequest, CelebrationResponse, ChallengeRequest, ChallengeResponse,
        FeedResponse, FriendsResponse, RivalriesResponse, TeamCreatedResponse, TeamRequest,
    },
};

const FEED_LIMIT: i64 = 20;

#[utoipa::path(context_path = "/rewards", request_body = TeamRequest, responses(
    (status = 201, description = "Create a team led by the current player", body = TeamCreatedResponse),
    (status = 400, description = "Missing team name", body = ErrorResponse)
))]
#[post("/teams/create", data = "<body>")]
pub async fn create_team(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<TeamRequest>,
) -> ApiResult<(Status, Json<TeamCreatedResponse>)> {
    let body = body.into_inner();
    let name =
        non_blank(body.team_name).ok_or_else(|| ApiError::bad_request("team_name is required"))?;
    let team = store
        .create_team(&name, player.name(), &body.members)
        .await?;
    tracing::info!("{} created team {}", player.name(), team.name);

    Ok((
        Status::Created,
        Json(TeamCreatedResponse {
            message: "team created".to_string(),
            team: team.into(),
        }),
    ))
}

#[utoipa::path(context_path = "/rewards", responses(
    (status = 200, description = "Teammates of the current player", body = FriendsResponse)
))]
#[get("/friends")]
pub async fn friends(
    store: &State<Arc<dyn Store>>,
    player: Player,
) -> ApiResult<Json<FriendsResponse>> {
    let friends = store.teammates(player.name()).await?;
    Ok(Json(FriendsResponse { friends }))
}

#[utoipa::path(context_path = "/rewards", request_body = ChallengeRequest, responses(
    (status = 200, description = "Challenge a colleague", body = ChallengeResponse),
    (status = 400, description = "Missing recipient or challenge", body = ErrorResponse)
))]
#[post("/challenges/send", data = "<body>")]
pub async fn send_challenge(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<ChallengeRequest>,
) -> ApiResult<Json<ChallengeResponse>> {
    let body = body.into_inner();
    let (Some(to), Some(challenge)) = (non_blank(body.to), non_blank(body.challenge)) else {
        return Err(ApiError::bad_request("to and challenge are required"));
    };
    let challenge = store.send_challenge(player.name(), &to, &challenge).await?;

    Ok(Json(ChallengeResponse {
        message: "challenge sent".to_string(),
        from: challenge.sender,
        to: challenge.recipient,
        challenge: challenge.challenge,
    }))
}

#[utoipa::path(context_path = "/rewards", responses(
    (status = 200, description = "Latest activity, newest first", body = FeedResponse)
))]
#[get("/activity-feed")]
pub async fn activity_feed(store: &State<Arc<dyn Store>>) -> ApiResult<Json<FeedResponse>> {
    let feed = store.activity_feed(FEED_LIMIT).await?;
    Ok(Json(FeedResponse {
        feed: feed.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(context_path = "/rewards", request_body = CelebrationRequest, responses(
    (status = 201, description = "Celebrate an achievement in the activity feed", body = CelebrationResponse),
    (status = 400, description = "Missing achievement id", body = ErrorResponse),
    (status = 404, description = "Unknown achievement", body = ErrorResponse)
))]
#[post("/celebrations", data = "<body>")]
pub async fn celebrate(
    store: &State<Arc<dyn Store>>,
    player: Player,
    body: Json<CelebrationRequest>,
) -> ApiResult<(Status, Json<CelebrationResponse>)> {
    let body = body.into_inner();
    let id = body
        .achievement_id
        .ok_or_else(|| ApiError::bad_request("achievement_id is required"))?;
    let achievement = store
        .achievement(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("achievement {id} not found")))?;
    let celebration = non_blank(body.message).unwrap_or_else(|| "Congratulations!".to_string());

    store
        .record_activity(
            player.name(),
            &format!("celebrated {}: {celebration}", achievement.name),
        )
        .await?;

    Ok((
        Status::Created,
        Json(CelebrationResponse {
            message: "celebration posted".to_string(),
            achievement_id: achievement.id,
            celebration,
        }),
    ))
}

#[utoipa::path(context_path = "/rewards", responses(
    (status = 200, description = "Challenges between colleagues", body = RivalriesResponse)
))]
#[get("/rivalries")]
pub async fn rivalries(store: &State<Arc<dyn Store>>) -> ApiResult<Json<RivalriesResponse>> {
    let challenges = store.challenges().await?;
    Ok(Json(RivalriesResponse {
        rivalries: challenges.into_iter().map(Into::into).collect(),
    }))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing social entrypoints", |rocket| async {
        rocket.mount(
            "/rewards",
            rocket::routes![
                create_team,
                friends,
                send_challenge,
                activity_feed,
                celebrate,
                rivalries
            ],
        )
    })
}
