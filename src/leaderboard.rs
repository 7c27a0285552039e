use std::cmp::{Ordering, Reverse};

use rocket::serde::{self, Deserialize, Serialize};

use crate::database::GameRecord;

/// Ranking order: higher score first, then faster time.
/// Records equal on both keys compare equal.
pub fn rank_order(a: &GameRecord, b: &GameRecord) -> Ordering {
    rank_key(a).cmp(&rank_key(b))
}

fn rank_key(record: &GameRecord) -> (Reverse<u32>, u32) {
    (Reverse(record.score), record.time_taken)
}

/// `round(score / total * 100)`. A zero total counts as 0%.
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (score, total) = (u64::from(score.min(total)), u64::from(total));
    ((200 * score + total) / (2 * total)) as u32
}

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn rank_badge(rank: usize) -> String {
    match rank {
        1 => "🥇".to_owned(),
        2 => "🥈".to_owned(),
        3 => "🥉".to_owned(),
        _ => format!("#{}", rank),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RankedEntry {
    pub rank: usize,
    pub badge: String,
    pub top_three: bool,
    pub percentage: u32,
    pub time: String,
    pub seconds_per_question: f64,
    #[serde(flatten)]
    pub record: GameRecord,
}

impl RankedEntry {
    fn new(rank: usize, record: GameRecord) -> Self {
        let seconds_per_question = if record.total_questions == 0 {
            0.0
        } else {
            let average = f64::from(record.time_taken) / f64::from(record.total_questions);
            (average * 10.0).round() / 10.0
        };

        Self {
            rank,
            badge: rank_badge(rank),
            top_three: rank <= 3,
            percentage: percentage(record.score, record.total_questions),
            time: format_time(record.time_taken),
            seconds_per_question,
            record,
        }
    }
}

/// Records of one leaderboard, kept in ranking order.
#[derive(Clone)]
pub struct Leaderboard {
    collection: Vec<GameRecord>,
}

impl Leaderboard {
    pub fn new(mut collection: Vec<GameRecord>) -> Self {
        collection.sort_by(rank_order);
        Self { collection }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.collection.iter()
    }

    pub fn entries(&self) -> Vec<RankedEntry> {
        self.collection
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, record)| RankedEntry::new(index + 1, record))
            .collect()
    }
}

impl Serialize for Leaderboard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.entries().serialize(serializer)
    }
}
