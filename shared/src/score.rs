use std::collections::{BTreeMap, BTreeSet};

use super::*;

/// Denormalized per-user totals shown on the homepage and served by the players API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerSummary {
    pub username: UserKey,
    pub competitions: Vec<String>,
    pub total_progress: Points,
    pub achievement_points: Points,
    pub spent_points: Points,
    pub total_points: Points,
}

impl PlayerSummary {
    pub fn empty(username: UserKey) -> Self {
        Self {
            username,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    competitions: BTreeSet<String>,
    total_progress: Points,
    achievement_points: Points,
    spent_points: Points,
    manual_points: Points,
}

impl Accumulator {
    fn into_summary(self, username: UserKey) -> PlayerSummary {
        let total = i128::from(self.total_progress)
            + i128::from(self.achievement_points)
            + i128::from(self.manual_points)
            - i128::from(self.spent_points);
        PlayerSummary {
            username,
            competitions: self.competitions.into_iter().collect(),
            total_progress: self.total_progress,
            achievement_points: self.achievement_points,
            spent_points: self.spent_points,
            total_points: total.clamp(0, i128::from(Points::MAX)) as Points,
        }
    }
}

/// Folds the raw record sets into one summary per user, ordered by username.
///
/// A user is anyone with progress, a membership, an unlock or a manual ledger
/// entry. Redemptions only reduce the total of users that already appear.
pub fn aggregate_players(records: &ScoreRecords) -> Vec<PlayerSummary> {
    let mut grouped: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for record in &records.progress {
        let entry = grouped.entry(record.user.as_str()).or_default();
        entry.competitions.insert(record.competition.clone());
        entry.total_progress = entry.total_progress.saturating_add(record.points());
    }

    for record in &records.memberships {
        grouped
            .entry(record.user.as_str())
            .or_default()
            .competitions
            .insert(record.competition.clone());
    }

    for unlock in &records.unlocks {
        let points = records
            .achievement_rarity(unlock.achievement_id)
            .map(rarity_points)
            .unwrap_or_default();
        let entry = grouped.entry(unlock.user.as_str()).or_default();
        entry.achievement_points = entry.achievement_points.saturating_add(points);
    }

    for entry in &records.manual_entries {
        let acc = grouped.entry(entry.user.as_str()).or_default();
        if entry.board == GLOBAL_BOARD {
            acc.manual_points = acc.manual_points.saturating_add(entry.points);
        }
    }

    for redemption in &records.redemptions {
        if let Some(entry) = grouped.get_mut(redemption.user.as_str()) {
            entry.spent_points = entry.spent_points.saturating_add(redemption.points);
        }
    }

    grouped
        .into_iter()
        .map(|(username, acc)| acc.into_summary(username.to_string()))
        .collect()
}

/// Summary of a single user, zeroed when they have no activity at all.
pub fn player_summary(records: &ScoreRecords, username: &str) -> PlayerSummary {
    aggregate_players(records)
        .into_iter()
        .find(|summary| summary.username == username)
        .unwrap_or_else(|| PlayerSummary::empty(username.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDateTime::default()
    }

    fn progress(user: &str, competition: &str, value: &str) -> ProgressRecord {
        ProgressRecord {
            user: user.to_string(),
            competition: competition.to_string(),
            progress: Some(value.to_string()),
        }
    }

    fn membership(user: &str, competition: &str) -> MembershipRecord {
        MembershipRecord {
            user: user.to_string(),
            competition: competition.to_string(),
        }
    }

    fn unlock(user: &str, achievement_id: AchievementId) -> UnlockRecord {
        UnlockRecord {
            user: user.to_string(),
            achievement_id,
            unlocked_at: at(),
        }
    }

    fn manual(user: &str, board: &str, points: Points) -> ManualEntry {
        ManualEntry {
            user: user.to_string(),
            board: board.to_string(),
            points,
        }
    }

    fn redemption(user: &str, points: Points) -> RedemptionRecord {
        RedemptionRecord {
            user: user.to_string(),
            points,
        }
    }

    fn records_with_epic() -> ScoreRecords {
        let mut records = ScoreRecords::default();
        records.achievements.insert(
            1,
            AchievementInfo {
                name: "Marathon".to_string(),
                rarity: "epic".to_string(),
            },
        );
        records
    }

    fn find<'a>(summaries: &'a [PlayerSummary], user: &str) -> &'a PlayerSummary {
        summaries
            .iter()
            .find(|s| s.username == user)
            .expect("user should be present")
    }

    #[test]
    fn progress_and_epic_unlock() {
        let mut records = records_with_epic();
        records.progress = vec![
            progress("alice", "Fitness", "30"),
            progress("alice", "Fitness", "20"),
        ];
        records.unlocks = vec![unlock("alice", 1)];

        let summaries = aggregate_players(&records);
        assert_eq!(
            summaries,
            vec![PlayerSummary {
                username: "alice".to_string(),
                competitions: vec!["Fitness".to_string()],
                total_progress: 50,
                achievement_points: 50,
                spent_points: 0,
                total_points: 100,
            }]
        );
    }

    #[test]
    fn manual_only_user_appears() {
        let mut records = ScoreRecords::default();
        records.manual_entries = vec![manual("bob", GLOBAL_BOARD, 100)];
        records.redemptions = vec![redemption("bob", 30)];

        let summaries = aggregate_players(&records);
        let bob = find(&summaries, "bob");
        assert_eq!(bob.total_progress, 0);
        assert_eq!(bob.achievement_points, 0);
        assert_eq!(bob.spent_points, 30);
        assert_eq!(bob.total_points, 70);
        assert!(bob.competitions.is_empty());
    }

    #[test]
    fn total_is_floored_at_zero() {
        let mut records = ScoreRecords::default();
        records.progress = vec![progress("carol", "Learning", "20")];
        records.redemptions = vec![redemption("carol", 30)];

        let summaries = aggregate_players(&records);
        let carol = find(&summaries, "carol");
        assert_eq!(carol.spent_points, 30);
        assert_eq!(carol.total_points, 0);
    }

    #[test]
    fn competitions_are_deduplicated_and_sorted() {
        let mut records = ScoreRecords::default();
        records.progress = vec![
            progress("dan", "Learning Challenge", "5"),
            progress("dan", "Creativity Challenge", "1"),
        ];
        records.memberships = vec![
            membership("dan", "Learning Challenge"),
            membership("dan", "Code Quality Challenge"),
        ];

        let summaries = aggregate_players(&records);
        assert_eq!(
            find(&summaries, "dan").competitions,
            vec![
                "Code Quality Challenge".to_string(),
                "Creativity Challenge".to_string(),
                "Learning Challenge".to_string(),
            ]
        );
    }

    #[test]
    fn non_numeric_progress_keeps_competition() {
        let mut records = ScoreRecords::default();
        records.progress = vec![
            progress("erin", "Fitness", "ten"),
            progress("erin", "Green Office Challenge", "4"),
        ];

        let summaries = aggregate_players(&records);
        let erin = find(&summaries, "erin");
        assert_eq!(erin.total_progress, 4);
        assert_eq!(erin.competitions.len(), 2);
    }

    #[test]
    fn missing_achievement_is_worth_nothing() {
        let mut records = records_with_epic();
        records.unlocks = vec![unlock("frank", 1), unlock("frank", 42)];

        let summaries = aggregate_players(&records);
        assert_eq!(find(&summaries, "frank").achievement_points, 50);
    }

    #[test]
    fn other_boards_and_redemption_only_users_are_ignored() {
        let mut records = ScoreRecords::default();
        records.manual_entries = vec![
            manual("gina", GLOBAL_BOARD, 15),
            manual("gina", "team", 1000),
            manual("hank", "team", 5),
        ];
        records.redemptions = vec![redemption("ivan", 10)];

        let summaries = aggregate_players(&records);
        assert_eq!(find(&summaries, "gina").total_points, 15);
        // a non-global entry still counts as ledger presence
        assert_eq!(find(&summaries, "hank").total_points, 0);
        assert!(summaries.iter().all(|s| s.username != "ivan"));
    }

    #[test]
    fn summaries_are_ordered_and_never_negative() {
        let mut records = records_with_epic();
        records.progress = vec![progress("zoe", "Fitness", "-500")];
        records.memberships = vec![membership("amy", "Fitness")];
        records.unlocks = vec![unlock("mia", 1)];
        records.redemptions = vec![redemption("mia", 10_000)];

        let summaries = aggregate_players(&records);
        let names: Vec<_> = summaries.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, vec!["amy", "mia", "zoe"]);
        assert!(summaries.iter().all(|s| s.total_points >= 0));
    }

    #[test]
    fn extreme_values_saturate_instead_of_overflowing() {
        let max = Points::MAX.to_string();
        let min = Points::MIN.to_string();
        let mut records = records_with_epic();
        records.progress = vec![
            progress("alice", "Fitness", &max),
            progress("alice", "Learning", "1"),
            progress("bob", "Fitness", "1"),
            progress("carol", "Fitness", &max),
            progress("dora", "Fitness", &min),
            progress("dora", "Learning", "-1"),
        ];
        records.unlocks = vec![unlock("bob", 1)];
        records.manual_entries = vec![manual("bob", GLOBAL_BOARD, Points::MAX)];
        records.redemptions = vec![redemption("carol", Points::MAX), redemption("carol", 5)];

        let summaries = aggregate_players(&records);
        let alice = find(&summaries, "alice");
        assert_eq!(alice.total_progress, Points::MAX);
        assert_eq!(alice.total_points, Points::MAX);

        assert_eq!(find(&summaries, "bob").total_points, Points::MAX);

        let carol = find(&summaries, "carol");
        assert_eq!(carol.spent_points, Points::MAX);
        assert_eq!(carol.total_points, 0);

        let dora = find(&summaries, "dora");
        assert_eq!(dora.total_progress, Points::MIN);
        assert_eq!(dora.total_points, 0);
    }

    #[test]
    fn absent_user_has_empty_summary() {
        let records = records_with_epic();
        assert_eq!(
            player_summary(&records, "nobody"),
            PlayerSummary::empty("nobody".to_string())
        );
    }
}
