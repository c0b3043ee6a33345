use office_arena_server::config::Env;
use rocket::{
    http::{ContentType, Status},
    local::asynchronous::Client,
};
use serde_json::{json, Value};

async fn client() -> Client {
    let rocket = office_arena_server::rocket(Env::memory()).expect("server builds");
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn get_json(client: &Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri.to_string()).dispatch().await;
    let status = response.status();
    (status, response.into_json().await.unwrap_or(Value::Null))
}

async fn send_json(client: &Client, method: &str, uri: &str, body: Value) -> (Status, Value) {
    let request = match method {
        "PUT" => client.put(uri.to_string()),
        _ => client.post(uri.to_string()),
    };
    let response = request
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.unwrap_or(Value::Null))
}

async fn login(client: &Client, username: &str) {
    let (status, body) = send_json(client, "POST", "/login", json!({ "username": username })).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["username"], username);
}

async fn reward_id(client: &Client, uri: &str, name: &str) -> i64 {
    let (_, catalog) = get_json(client, uri).await;
    catalog["rewards"]
        .as_array()
        .and_then(|rewards| rewards.iter().find(|r| r["name"] == name))
        .and_then(|r| r["id"].as_i64())
        .expect("seeded reward")
}

fn player<'a>(players: &'a Value, username: &str) -> &'a Value {
    players
        .as_array()
        .and_then(|players| players.iter().find(|p| p["username"] == username))
        .unwrap_or_else(|| panic!("{username} is missing from {players}"))
}

#[rocket::async_test]
async fn players_grouped_combines_every_source() {
    let client = client().await;
    login(&client, "alice").await;

    let (status, joined) = send_json(&client, "POST", "/competitions/fitness", json!({})).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(joined["message"], "joined");
    assert_eq!(joined["competition"]["title"], "Office Fitness Challenge");

    let (status, game) = send_json(
        &client,
        "POST",
        "/games/create",
        json!({ "title": "Step Race", "description": "Most steps wins" }),
    )
    .await;
    assert_eq!(status, Status::Created);
    let competition_id = game["id"].clone();

    let (status, _) = send_json(
        &client,
        "POST",
        "/games/join",
        json!({ "competition_id": competition_id }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    let (status, progress) = send_json(
        &client,
        "PUT",
        "/games/progress/update",
        json!({ "competition_id": competition_id, "progress": 1500 }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(progress["progress"], "1500");

    let (status, achievement) = send_json(
        &client,
        "POST",
        "/achievements/create-custom",
        json!({ "name": "Marathon", "rarity": "Epic", "points": 75 }),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(achievement["rarity"], "epic");
    let (status, _) = send_json(
        &client,
        "POST",
        "/achievements/unlock",
        json!({ "achievement_id": achievement["id"] }),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let (status, _) = send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "alice", "points": 20 }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "bob", "board": "weekly", "points": 999 }),
    )
    .await;

    let (status, players) = get_json(&client, "/api/players_grouped").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(players.as_array().map(Vec::len), Some(2));

    let alice = player(&players, "alice");
    assert_eq!(
        alice["competitions"],
        json!(["Office Fitness Challenge", "Step Race"])
    );
    assert_eq!(alice["total_progress"], 1500);
    // Points come from the rarity tier, not the stored achievement points
    assert_eq!(alice["achievement_points"], 50);
    assert_eq!(alice["spent_points"], 0);
    assert_eq!(alice["total_points"], 1570);

    let bob = player(&players, "bob");
    assert_eq!(bob["total_points"], 0);
    assert_eq!(players[0]["username"], "alice");
}

#[rocket::async_test]
async fn requests_without_a_session_act_as_anonymous() {
    let client = client().await;

    let (_, joined) = send_json(&client, "POST", "/competitions/learning", json!({})).await;
    assert_eq!(joined["message"], "joined");
    let (_, again) = send_json(&client, "POST", "/competitions/learning", json!({})).await;
    assert_eq!(again["message"], "already joined");

    let (_, players) = get_json(&client, "/api/players_grouped").await;
    assert_eq!(
        player(&players, "anonymous")["competitions"],
        json!(["Learning Challenge"])
    );

    login(&client, "carol").await;
    let (_, points) = get_json(&client, "/social/my-points").await;
    assert_eq!(points["user"], "carol");
    assert_eq!(points["points"], 0);

    let response = client.post("/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let (_, points) = get_json(&client, "/social/my-points").await;
    assert_eq!(points["user"], "anonymous");
}

#[rocket::async_test]
async fn redemptions_are_limited_by_the_balance() {
    let client = client().await;
    login(&client, "dave").await;
    let coffee = reward_id(&client, "/social/available", "Coffee Voucher").await;
    let lunch = reward_id(&client, "/social/store", "Team Lunch").await;

    let (status, error) = send_json(
        &client,
        "POST",
        "/social/redeem",
        json!({ "reward_id": coffee }),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(error["status"], "error");

    send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "dave", "points": 120 }),
    )
    .await;
    let (status, redeemed) = send_json(
        &client,
        "POST",
        "/social/redeem",
        json!({ "reward_id": coffee }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(redeemed["remaining_points"], 70);

    let (status, _) = send_json(
        &client,
        "POST",
        "/social/redeem",
        json!({ "reward_id": lunch }),
    )
    .await;
    assert_eq!(status, Status::BadRequest);

    let (status, _) = send_json(&client, "POST", "/social/redeem", json!({ "reward_id": 9999 })).await;
    assert_eq!(status, Status::NotFound);

    let (_, players) = get_json(&client, "/api/players_grouped").await;
    let dave = player(&players, "dave");
    assert_eq!(dave["spent_points"], 50);
    assert_eq!(dave["total_points"], 70);
}

#[rocket::async_test]
async fn donations_move_points_to_the_recipient() {
    let client = client().await;
    send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "erin", "points": 100 }),
    )
    .await;
    login(&client, "erin").await;

    let (status, _) = send_json(
        &client,
        "POST",
        "/social/donate-points",
        json!({ "amount": 30 }),
    )
    .await;
    assert_eq!(status, Status::BadRequest);

    let (status, donation) = send_json(
        &client,
        "POST",
        "/social/donate-points",
        json!({ "amount": 30, "recipient": "frank" }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(donation["remaining_points"], 70);

    let (_, players) = get_json(&client, "/api/players_grouped").await;
    assert_eq!(player(&players, "erin")["total_points"], 70);
    assert_eq!(player(&players, "frank")["total_points"], 30);
}

#[rocket::async_test]
async fn failed_donation_does_not_charge_the_donor() {
    let client = client().await;
    for (user, points) in [("gwen", 100), ("hugo", i64::MAX)] {
        send_json(
            &client,
            "PUT",
            "/leaderboards/manual",
            json!({ "user": user, "points": points }),
        )
        .await;
    }
    login(&client, "gwen").await;

    let (status, _) = send_json(
        &client,
        "POST",
        "/social/donate-points",
        json!({ "amount": 30, "recipient": "hugo" }),
    )
    .await;
    assert_eq!(status, Status::InternalServerError);

    let (_, players) = get_json(&client, "/api/players_grouped").await;
    assert_eq!(player(&players, "gwen")["total_points"], 100);
    assert_eq!(player(&players, "hugo")["total_points"], i64::MAX);
}

#[rocket::async_test]
async fn invalid_requests_are_reported_as_json_errors() {
    let client = client().await;

    let (status, error) = send_json(&client, "POST", "/competitions/knitting", json!({})).await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(error["message"], "unknown category knitting");

    let (status, error) = send_json(&client, "POST", "/achievements/unlock", json!({})).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(error["message"], "achievement_id is required");

    let (status, _) = send_json(
        &client,
        "POST",
        "/achievements/unlock",
        json!({ "achievement_id": 404 }),
    )
    .await;
    assert_eq!(status, Status::NotFound);

    let (status, _) = send_json(
        &client,
        "PUT",
        "/games/progress/update",
        json!({ "competition_id": 1, "progress": 5 }),
    )
    .await;
    assert_eq!(status, Status::NotFound);

    let (status, _) = send_json(&client, "POST", "/login", json!({ "username": "  " })).await;
    assert_eq!(status, Status::BadRequest);

    let (status, error) = get_json(&client, "/no/such/route").await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(error["status"], "error");
}

#[rocket::async_test]
async fn global_leaderboard_is_ranked_and_paginated() {
    let client = client().await;
    for (user, points) in [("gina", 10), ("hank", 30), ("ivan", 30)] {
        send_json(
            &client,
            "PUT",
            "/leaderboards/manual",
            json!({ "user": user, "points": points }),
        )
        .await;
    }

    let (status, page) = get_json(&client, "/leaderboards/global?page=0&limit=2").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(page["page"], 1);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["total_records"], 3);
    assert_eq!(page["records"][0]["username"], "hank");
    assert_eq!(page["records"][0]["place"], 1);
    assert_eq!(page["records"][1]["username"], "ivan");

    let (_, page) = get_json(&client, "/leaderboards/global?page=1&limit=2").await;
    assert_eq!(page["records"][0]["username"], "gina");
    assert_eq!(page["records"][0]["place"], 3);
}

#[rocket::async_test]
async fn competition_titles_are_unique() {
    let client = client().await;
    let body = json!({ "title": "Plank Off" });

    let (status, _) = send_json(&client, "POST", "/games/create", body.clone()).await;
    assert_eq!(status, Status::Created);
    let (status, error) = send_json(&client, "POST", "/games/create", body).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(error["message"], "competition Plank Off already exists");
}

#[rocket::async_test]
async fn last_possible_page_is_empty() {
    let client = client().await;
    send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "gina", "points": 10 }),
    )
    .await;

    let (status, page) = get_json(&client, "/leaderboards/global?page=18446744073709551615").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(page["page"], u64::MAX);
    assert_eq!(page["total_records"], 1);
    assert_eq!(page["records"].as_array().map(Vec::len), Some(0));
}

#[rocket::async_test]
async fn teams_feed_the_team_leaderboard_and_friends() {
    let client = client().await;
    login(&client, "jane").await;

    let (status, team) = send_json(
        &client,
        "POST",
        "/rewards/teams/create",
        json!({ "team_name": "Night Owls", "members": ["kim", "lee", "kim"] }),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(team["team"]["members"], json!(["jane", "kim", "lee"]));

    let (_, friends) = get_json(&client, "/rewards/friends").await;
    assert_eq!(friends["friends"], json!(["kim", "lee"]));

    send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "lee", "points": 40 }),
    )
    .await;
    let (_, board) = get_json(&client, "/leaderboards/team").await;
    let names: Vec<&str> = board["leaderboard"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["username"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["lee", "jane", "kim"]);
}

#[rocket::async_test]
async fn activity_feed_lists_newest_events_first() {
    let client = client().await;
    login(&client, "mia").await;

    send_json(&client, "POST", "/competitions/creativity", json!({})).await;
    let (_, achievement) = send_json(
        &client,
        "POST",
        "/achievements/create-custom",
        json!({ "name": "Sketch Artist" }),
    )
    .await;
    assert_eq!(achievement["rarity"], "common");
    assert_eq!(achievement["points"], 10);
    let (status, _) = send_json(
        &client,
        "POST",
        "/achievements/share",
        json!({ "achievement_id": achievement["id"] }),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let (_, feed) = get_json(&client, "/rewards/activity-feed").await;
    assert_eq!(feed["feed"][0]["action"], "shared achievement Sketch Artist");
    assert_eq!(feed["feed"][1]["action"], "joined the Creativity Challenge");
    assert_eq!(feed["feed"][0]["user"], "mia");
}

#[rocket::async_test]
async fn homepage_renders_player_table() {
    let client = client().await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));
    let html = response.into_string().await.unwrap_or_default();
    assert!(html.contains("No activity yet"));

    send_json(
        &client,
        "PUT",
        "/leaderboards/manual",
        json!({ "user": "nora", "points": 1200 }),
    )
    .await;
    let html = client
        .get("/")
        .dispatch()
        .await
        .into_string()
        .await
        .unwrap_or_default();
    assert!(html.contains("nora"));
    assert!(html.contains("1,200"));
}
