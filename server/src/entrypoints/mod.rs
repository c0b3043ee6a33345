use rocket::fairing::AdHoc;
use utoipa::OpenApi;

use crate::{error::ErrorResponse, types::*};

pub mod achievements;
pub mod competitions;
pub mod games;
pub mod leaderboards;
pub mod players;
pub mod rewards;
pub mod session;
pub mod social;

#[derive(OpenApi)]
#[openapi(
    info(title = "Office Arena API"),
    paths(
        players::homepage,
        players::players_grouped,
        session::login,
        session::logout,
        achievements::available,
        achievements::unlock,
        achievements::my_progress,
        achievements::create_custom,
        achievements::rare,
        achievements::share,
        competitions::join_category,
        games::create,
        games::active,
        games::join,
        games::update_progress,
        games::rules,
        games::create_custom,
        social::available,
        social::store_items,
        social::redeem,
        social::my_points,
        social::donate_points,
        social::suggest,
        rewards::create_team,
        rewards::friends,
        rewards::send_challenge,
        rewards::activity_feed,
        rewards::celebrate,
        rewards::rivalries,
        leaderboards::global,
        leaderboards::team,
        leaderboards::monthly,
        leaderboards::hall_of_fame_list,
        leaderboards::predictions,
        leaderboards::manual_entry,
    ),
    components(schemas(
        ErrorResponse,
        PlayerResponse,
        PaginatedPlayerResponse,
        RankedPlayerResponse,
        MonthlyLeaderResponse,
        HallOfFameResponse,
        AchievementResponse,
        CompetitionResponse,
        GameResponse,
        RewardResponse,
        SuggestionResponse,
        TeamResponse,
        ActivityResponse,
        RivalryResponse,
        SessionResponse,
        UnlockResponse,
        AchievementProgressResponse,
        ShareResponse,
        JoinResponse,
        ProgressResponse,
        CatalogResponse,
        RedeemResponse,
        MyPointsResponse,
        DonationResponse,
        SuggestResponse,
        TeamCreatedResponse,
        FriendsResponse,
        ChallengeResponse,
        FeedResponse,
        CelebrationResponse,
        RivalriesResponse,
        TeamLeaderboardResponse,
        MonthlyLeaderboardResponse,
        HallOfFameListResponse,
        PredictionResponse,
        ManualEntryResponse,
        LoginRequest,
        AchievementRequest,
        CreateAchievementRequest,
        CreateGameRequest,
        JoinGameRequest,
        ProgressUpdateRequest,
        CustomGameRequest,
        RedeemRequest,
        DonateRequest,
        SuggestRequest,
        TeamRequest,
        ChallengeRequest,
        CelebrationRequest,
        PredictionRequest,
        ManualEntryRequest,
    ))
)]
pub struct ApiDoc;

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .attach(players::stage())
            .attach(session::stage())
            .attach(achievements::stage())
            .attach(competitions::stage())
            .attach(games::stage())
            .attach(social::stage())
            .attach(rewards::stage())
            .attach(leaderboards::stage())
    })
}
