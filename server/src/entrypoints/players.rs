use std::sync::Arc;

use rocket::{response::content::RawHtml, serde::json::Json, State};
use shared::aggregate_players;

use crate::{
    error::ApiResult,
    homepage::render_homepage,
    store::Store,
    types::{CompetitionResponse, GameResponse, PlayerResponse},
};

async fn grouped_players(store: &dyn Store) -> ApiResult<Vec<PlayerResponse>> {
    let records = store.score_records().await?;
    Ok(aggregate_players(&records)
        .into_iter()
        .map(Into::into)
        .collect())
}

#[utoipa::path(responses(
    (status = 200, description = "Dashboard with every player's points", content_type = "text/html")
))]
#[get("/")]
pub async fn homepage(store: &State<Arc<dyn Store>>) -> ApiResult<RawHtml<String>> {
    let players = grouped_players(store.inner().as_ref()).await?;
    let competitions: Vec<CompetitionResponse> = store
        .competitions(false)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let games: Vec<GameResponse> = store.games().await?.into_iter().map(Into::into).collect();

    Ok(RawHtml(render_homepage(&players, &competitions, &games)))
}

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Per-user score summaries", body = [PlayerResponse])
))]
#[get("/players_grouped")]
pub async fn players_grouped(
    store: &State<Arc<dyn Store>>,
) -> ApiResult<Json<Vec<PlayerResponse>>> {
    Ok(Json(grouped_players(store.inner().as_ref()).await?))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing player entrypoints", |rocket| async {
        rocket
            .mount("/", rocket::routes![homepage])
            .mount("/api", rocket::routes![players_grouped])
    })
}
