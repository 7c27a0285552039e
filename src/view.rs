use tracing::debug;

use crate::database::{GameMode, GameRecord, RecordQuery, RecordStore, StoreResult};
use crate::leaderboard::Leaderboard;

/// What the screen shows once a fetch has settled: the leaderboard or an error message.
pub type ViewResult = Result<Leaderboard, String>;

/// A fetch issued by [`LeaderboardView`]. Only the latest ticket's result is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub query: RecordQuery,
}

/// Leaderboard screen state: the selected mode and what is shown for it.
pub struct LeaderboardView {
    selected: GameMode,
    limit: usize,
    generation: u64,
    /// `None` while a fetch is in flight.
    status: Option<ViewResult>,
}

impl LeaderboardView {
    pub fn new(selected: GameMode, limit: usize) -> Self {
        Self {
            selected,
            limit,
            generation: 0,
            status: None,
        }
    }

    pub fn selected(&self) -> GameMode {
        self.selected
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_none()
    }

    pub fn status(&self) -> Option<&ViewResult> {
        self.status.as_ref()
    }

    /// Switches mode. Selecting the current mode does nothing.
    pub fn select_mode(&mut self, mode: GameMode) -> Option<FetchTicket> {
        if mode == self.selected {
            return None;
        }
        self.selected = mode;
        Some(self.refresh())
    }

    /// Starts a new fetch for the selected mode; also used for manual retry.
    pub fn refresh(&mut self) -> FetchTicket {
        self.generation += 1;
        self.status = None;
        FetchTicket {
            generation: self.generation,
            query: RecordQuery::new(Some(self.selected), self.limit),
        }
    }

    /// Applies the result of `ticket`. Results of outdated tickets are dropped.
    pub fn complete(&mut self, ticket: FetchTicket, result: StoreResult<Vec<GameRecord>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "dropping an outdated leaderboard response"
            );
            return false;
        }

        self.settle(result);
        true
    }

    /// Refreshes and waits for the store.
    pub async fn load(&mut self, store: &dyn RecordStore) -> &ViewResult {
        let ticket = self.refresh();
        let result = store.select(&ticket.query).await;
        self.settle(result)
    }

    fn settle(&mut self, result: StoreResult<Vec<GameRecord>>) -> &ViewResult {
        let shown = result
            .map(Leaderboard::new)
            .map_err(|error| format!("Failed to load the leaderboard: {}", error));
        self.status.insert(shown)
    }
}
