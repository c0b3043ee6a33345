use rocket::{http::CookieJar, serde::json::Json};

use crate::{
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    types::{non_blank, LoginRequest, SessionResponse},
};

#[utoipa::path(request_body = LoginRequest, responses(
    (status = 200, description = "Start a session for the given user", body = SessionResponse),
    (status = 400, description = "Missing username", body = ErrorResponse)
))]
#[post("/login", data = "<body>")]
pub async fn login(
    body: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
) -> ApiResult<Json<SessionResponse>> {
    let username = non_blank(body.into_inner().username)
        .ok_or_else(|| ApiError::bad_request("username is required"))?;
    Player::sign_in(cookies, &username);
    tracing::info!("Session started for {username}");

    Ok(Json(SessionResponse {
        message: "logged in".to_string(),
        username,
    }))
}

#[utoipa::path(responses(
    (status = 200, description = "End the current session", body = SessionResponse)
))]
#[post("/logout")]
pub async fn logout(player: Player, cookies: &CookieJar<'_>) -> Json<SessionResponse> {
    Player::sign_out(cookies);
    Json(SessionResponse {
        message: "logged out".to_string(),
        username: player.0,
    })
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing session entrypoints", |rocket| async {
        rocket.mount("/", rocket::routes![login, logout])
    })
}
