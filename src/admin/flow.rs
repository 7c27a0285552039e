use std::time::Duration;

use tokio::time::Instant;

use super::*;

/// Default time a finished clear stays on screen before the flow resets.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub enum ClearState {
    Idle,
    PasswordEntered,
    Validating,
    Deleting,
    Success(ClearReport),
    PartialFailure(ClearReport),
    /// Holds the message describing what went wrong.
    Failure(String),
}

impl ClearState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Success(_) | Self::PartialFailure(_) | Self::Failure(_)
        )
    }
}

/// Admin "delete all records" interaction.
///
/// `Idle -> PasswordEntered -> Validating -> Deleting -> Success | PartialFailure`,
/// or `Failure` from validation or deletion. A finished flow returns to `Idle`
/// once the reset delay has passed.
pub struct ClearFlow {
    state: ClearState,
    password: String,
    reset_delay: Duration,
    finished_at: Option<Instant>,
}

impl ClearFlow {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            state: ClearState::Idle,
            password: String::new(),
            reset_delay,
            finished_at: None,
        }
    }

    pub fn state(&self) -> &ClearState {
        &self.state
    }

    /// Stores the typed password.
    pub fn enter_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.finished_at = None;
        self.state = if self.password.is_empty() {
            ClearState::Idle
        } else {
            ClearState::PasswordEntered
        };
    }

    /// Validates the entered password and clears the store when it matches.
    pub async fn submit(
        &mut self,
        store: &dyn RecordStore,
        secret: &MasterPassword,
        now: Instant,
    ) -> Result<ClearReport, ClearFailure> {
        self.state = ClearState::Validating;
        let outcome = match check_password(secret, &self.password) {
            Ok(()) => {
                self.state = ClearState::Deleting;
                delete_all_records(store).await
            }
            Err(failure) => Err(failure),
        };

        self.state = match &outcome {
            Ok(report) if report.complete() => ClearState::Success(*report),
            Ok(report) => ClearState::PartialFailure(*report),
            Err(failure) => ClearState::Failure(failure.to_string()),
        };
        self.finished_at = Some(now);
        outcome
    }

    /// Returns to `Idle` and forgets the password once a finished flow has
    /// been shown for the reset delay. Returns whether a reset happened.
    pub fn poll_reset(&mut self, now: Instant) -> bool {
        match self.finished_at {
            Some(finished_at)
                if self.state.is_finished()
                    && now.saturating_duration_since(finished_at) >= self.reset_delay =>
            {
                self.state = ClearState::Idle;
                self.password.clear();
                self.finished_at = None;
                true
            }
            _ => false,
        }
    }

    /// Text shown next to the admin controls.
    pub fn message(&self) -> Option<String> {
        match &self.state {
            ClearState::Idle | ClearState::PasswordEntered => None,
            ClearState::Validating => Some("Checking the password...".to_owned()),
            ClearState::Deleting => Some("Deleting records...".to_owned()),
            ClearState::Success(report) if report.total == 0 => {
                Some("There were no records to delete.".to_owned())
            }
            ClearState::Success(_) => Some("All records have been deleted.".to_owned()),
            ClearState::PartialFailure(report) => Some(format!(
                "Deleted {}/{} records.",
                report.deleted, report.total
            )),
            ClearState::Failure(message) => Some(format!("{}.", message)),
        }
    }
}

impl Default for ClearFlow {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_DELAY)
    }
}
