use std::{str::FromStr, sync::Arc};

use rocket::{serde::json::Json, State};
use shared::Category;

use crate::{
    db::types::NewCompetition,
    error::{ApiError, ApiResult, ErrorResponse},
    session::Player,
    store::Store,
    types::JoinResponse,
};

#[utoipa::path(context_path = "/competitions", responses(
    (status = 200, description = "Join the competition of a category", body = JoinResponse),
    (status = 404, description = "Unknown category", body = ErrorResponse)
), params(
    ("category" = String, Path, description = "code-quality, learning, fitness, sustainability, creativity or team-building")
))]
#[post("/<category>")]
pub async fn join_category(
    store: &State<Arc<dyn Store>>,
    player: Player,
    category: &str,
) -> ApiResult<Json<JoinResponse>> {
    let category = Category::from_str(category)
        .map_err(|_| ApiError::not_found(format!("unknown category {category}")))?;
    let competition = store
        .ensure_competition(NewCompetition::new(
            category.title(),
            category.description(),
        ))
        .await?;

    let joined = store.add_membership(player.name(), competition.id).await?;
    let message = if joined {
        store
            .record_activity(player.name(), &format!("joined the {}", competition.title))
            .await?;
        tracing::info!("{} joined {}", player.name(), competition.title);
        "joined"
    } else {
        "already joined"
    };

    Ok(Json(JoinResponse {
        message: message.to_string(),
        competition: competition.into(),
    }))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing competition entrypoints", |rocket| async {
        rocket.mount("/competitions", rocket::routes![join_category])
    })
}
