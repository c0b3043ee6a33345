use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use itertools::Itertools;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub place: u64,
    #[serde(flatten)]
    pub summary: PlayerSummary,
}

/// Orders summaries by total points, ties broken by username, and numbers them from 1.
pub fn rank_players(summaries: Vec<PlayerSummary>) -> Vec<RankedPlayer> {
    summaries
        .into_iter()
        .sorted_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.username.cmp(&b.username))
        })
        .enumerate()
        .map(|(index, summary)| RankedPlayer {
            place: index as u64 + 1,
            summary,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyLeader {
    /// `YYYY-MM`
    pub month: String,
    pub top_user: UserKey,
    pub points: Points,
}

/// Top achievement earner of every calendar month that saw an unlock, newest month first.
pub fn monthly_leaders(records: &ScoreRecords) -> Vec<MonthlyLeader> {
    let mut months: BTreeMap<(i32, u32), HashMap<&str, Points>> = BTreeMap::new();
    for unlock in &records.unlocks {
        let points = records
            .achievement_rarity(unlock.achievement_id)
            .map(rarity_points)
            .unwrap_or_default();
        let date = unlock.unlocked_at.date();
        *months
            .entry((date.year(), date.month()))
            .or_default()
            .entry(unlock.user.as_str())
            .or_default() += points;
    }

    months
        .into_iter()
        .rev()
        .filter_map(|((year, month), users)| {
            let (user, points) = users
                .into_iter()
                .min_by(|(a_user, a_points), (b_user, b_points)| {
                    b_points.cmp(a_points).then_with(|| a_user.cmp(b_user))
                })?;
            Some(MonthlyLeader {
                month: format!("{year:04}-{month:02}"),
                top_user: user.to_string(),
                points,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallOfFameEntry {
    pub user: UserKey,
    pub achievements: Vec<String>,
}

/// Users holding rare-or-better achievements, most decorated first.
pub fn hall_of_fame(records: &ScoreRecords) -> Vec<HallOfFameEntry> {
    let mut by_user: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for unlock in &records.unlocks {
        let Some(info) = records.achievements.get(&unlock.achievement_id) else {
            continue;
        };
        let is_rare = info
            .rarity
            .trim()
            .parse::<Rarity>()
            .map(|rarity| rarity.is_rare())
            .unwrap_or_default();
        if is_rare {
            by_user
                .entry(unlock.user.as_str())
                .or_default()
                .push(info.name.clone());
        }
    }

    by_user
        .into_iter()
        .map(|(user, achievements)| HallOfFameEntry {
            user: user.to_string(),
            achievements: achievements.into_iter().sorted().dedup().collect(),
        })
        .sorted_by(|a, b| {
            b.achievements
                .len()
                .cmp(&a.achievements.len())
                .then_with(|| a.user.cmp(&b.user))
        })
        .collect()
}

/// Number of pages needed to show `total_records` with `limit` records per page.
pub fn total_pages(total_records: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    let extra_page = if total_records % limit == 0 { 0 } else { 1 };
    (total_records / limit) + extra_page
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn summary(username: &str, total_points: Points) -> PlayerSummary {
        PlayerSummary {
            username: username.to_string(),
            total_points,
            ..Default::default()
        }
    }

    fn unlock_on(user: &str, achievement_id: AchievementId, month: u32) -> UnlockRecord {
        UnlockRecord {
            user: user.to_string(),
            achievement_id,
            unlocked_at: NaiveDate::from_ymd_opt(2024, month, 10)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    fn records() -> ScoreRecords {
        let mut records = ScoreRecords::default();
        for (id, name, rarity) in [
            (1, "First Steps", "common"),
            (2, "Bug Hunter", "rare"),
            (3, "Marathon", "epic"),
            (4, "Legend", "legendary"),
        ] {
            records.achievements.insert(
                id,
                AchievementInfo {
                    name: name.to_string(),
                    rarity: rarity.to_string(),
                },
            );
        }
        records
    }

    #[test]
    fn ranking_breaks_ties_by_name() {
        let ranked = rank_players(vec![
            summary("carol", 10),
            summary("bob", 70),
            summary("alice", 70),
        ]);
        let order: Vec<_> = ranked
            .iter()
            .map(|r| (r.place, r.summary.username.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "alice"), (2, "bob"), (3, "carol")]);
    }

    #[test]
    fn monthly_leaders_newest_first() {
        let mut records = records();
        records.unlocks = vec![
            unlock_on("alice", 1, 8),
            unlock_on("bob", 2, 8),
            unlock_on("alice", 3, 9),
            unlock_on("bob", 1, 9),
        ];

        let leaders = monthly_leaders(&records);
        assert_eq!(
            leaders,
            vec![
                MonthlyLeader {
                    month: "2024-09".to_string(),
                    top_user: "alice".to_string(),
                    points: 50,
                },
                MonthlyLeader {
                    month: "2024-08".to_string(),
                    top_user: "bob".to_string(),
                    points: 25,
                },
            ]
        );
    }

    #[test]
    fn hall_of_fame_skips_common() {
        let mut records = records();
        records.unlocks = vec![
            unlock_on("alice", 1, 1),
            unlock_on("bob", 2, 1),
            unlock_on("bob", 4, 2),
            unlock_on("bob", 4, 3),
            unlock_on("carol", 3, 1),
        ];

        let fame = hall_of_fame(&records);
        assert_eq!(
            fame,
            vec![
                HallOfFameEntry {
                    user: "bob".to_string(),
                    achievements: vec!["Bug Hunter".to_string(), "Legend".to_string()],
                },
                HallOfFameEntry {
                    user: "carol".to_string(),
                    achievements: vec!["Marathon".to_string()],
                },
            ]
        );
    }

    #[test]
    fn page_count() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(10, 0), 0);
    }
}
