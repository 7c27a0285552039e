use std::str::FromStr;

use rocket::request::FromParam;
use rocket::serde::{Deserialize, Serialize};

pub type RecordId = i64;

/// Longest player name accepted on submission, in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum GameMode {
    #[default]
    #[serde(rename = "FLAG_TO_COUNTRY")]
    FlagToCountry,
    #[serde(rename = "COUNTRY_TO_CAPITAL")]
    CountryToCapital,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::FlagToCountry, GameMode::CountryToCapital];

    /// Name used on the wire and in the `game_mode` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlagToCountry => "FLAG_TO_COUNTRY",
            Self::CountryToCapital => "COUNTRY_TO_CAPITAL",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::FlagToCountry => "Guess the country",
            Self::CountryToCapital => "Guess the capital",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FlagToCountry => "Look at the flag and pick the country out of four options",
            Self::CountryToCapital => "Read the country name and pick its capital",
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGameMode(pub String);

impl std::fmt::Display for UnknownGameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown game mode: {}", self.0)
    }
}

impl std::error::Error for UnknownGameMode {}

impl FromStr for GameMode {
    type Err = UnknownGameMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownGameMode(s.to_owned()))
    }
}

impl<'a> FromParam<'a> for GameMode {
    type Error = UnknownGameMode;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

/// A record as submitted by the quiz once a game is over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct GameRecordInput {
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken: u32,
    pub game_mode: GameMode,
}

impl GameRecordInput {
    pub fn new(
        player_name: impl Into<String>,
        score: u32,
        total_questions: u32,
        time_taken: u32,
        game_mode: GameMode,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            total_questions,
            time_taken,
            game_mode,
        }
    }

    /// Checks the record invariants and returns the record with a trimmed name.
    pub fn validate(mut self) -> Result<Self, String> {
        let name = self.player_name.trim();
        if name.is_empty() {
            return Err("player name is empty".to_owned());
        }
        if name.chars().count() > MAX_PLAYER_NAME_LEN {
            return Err(format!(
                "player name is longer than {} characters",
                MAX_PLAYER_NAME_LEN
            ));
        }
        if self.total_questions == 0 {
            return Err("total number of questions must be positive".to_owned());
        }
        if self.score > self.total_questions {
            return Err(format!(
                "score {} exceeds the number of questions {}",
                self.score, self.total_questions
            ));
        }

        self.player_name = name.to_owned();
        Ok(self)
    }
}

/// A stored record. `id` and `created_at` are assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct GameRecord {
    pub id: RecordId,
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken: u32,
    pub game_mode: GameMode,
    pub created_at: String,
}

impl GameRecord {
    pub fn from_input(id: RecordId, input: GameRecordInput, created_at: String) -> Self {
        Self {
            id,
            player_name: input.player_name,
            score: input.score,
            total_questions: input.total_questions,
            time_taken: input.time_taken,
            game_mode: input.game_mode,
            created_at,
        }
    }
}

/// Timestamp stamped on new rows.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
