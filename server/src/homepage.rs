use html_escape::encode_text;
use num_format::{Locale, ToFormattedString};

use crate::types::{CompetitionResponse, GameResponse, PlayerResponse};

fn format_points(points: i64) -> String {
    points.to_formatted_string(&Locale::en)
}

fn player_row(player: &PlayerResponse) -> String {
    let competitions = player
        .competitions
        .iter()
        .map(encode_text)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td></tr>",
        encode_text(&player.username),
        competitions,
        format_points(player.total_progress),
        format_points(player.achievement_points),
        format_points(player.spent_points),
        format_points(player.total_points),
    )
}

fn competition_item(competition: &CompetitionResponse) -> String {
    let status = if competition.is_active {
        "active"
    } else {
        "closed"
    };
    format!(
        "<li><strong>{}</strong> ({status}){}</li>",
        encode_text(&competition.title),
        competition
            .description
            .as_deref()
            .map(|d| format!(" - {}", encode_text(d)))
            .unwrap_or_default(),
    )
}

fn game_item(game: &GameResponse) -> String {
    format!(
        "<li><strong>{}</strong> <code>{}</code></li>",
        encode_text(&game.name),
        encode_text(&game.rules.to_string()),
    )
}

/// Renders the dashboard page. The player table carries the same data as
/// `/api/players_grouped`.
pub fn render_homepage(
    players: &[PlayerResponse],
    competitions: &[CompetitionResponse],
    games: &[GameResponse],
) -> String {
    let rows: String = if players.is_empty() {
        r#"<tr><td colspan="6">No activity yet</td></tr>"#.to_string()
    } else {
        players.iter().map(player_row).collect()
    };
    let competitions: String = competitions.iter().map(competition_item).collect();
    let games: String = games.iter().map(game_item).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Office Arena</title>
</head>
<body>
<h1>Office Arena</h1>
<h2>Players</h2>
<table>
<thead><tr><th>Player</th><th>Competitions</th><th>Progress</th><th>Achievements</th><th>Spent</th><th>Total</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
<h2>Competitions</h2>
<ul>
{competitions}
</ul>
<h2>Games</h2>
<ul>
{games}
</ul>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_players_with_grouped_digits() {
        let players = vec![PlayerResponse {
            username: "<alice>".to_string(),
            competitions: vec!["Fitness".to_string(), "R&D".to_string()],
            total_progress: 1500,
            achievement_points: 50,
            spent_points: 0,
            total_points: 1550,
        }];
        let html = render_homepage(&players, &[], &[]);
        assert!(html.contains("&lt;alice&gt;"));
        assert!(html.contains("Fitness, R&amp;D"));
        assert!(html.contains("<strong>1,550</strong>"));
    }

    #[test]
    fn empty_page_says_so() {
        let html = render_homepage(&[], &[], &[]);
        assert!(html.contains("No activity yet"));
    }
}
