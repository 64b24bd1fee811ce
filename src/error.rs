use crate::providers::ProviderError;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Coarse classification of a [`RatingError`], used by callers to decide
/// between "ask for more data", "show not found" and "retry later".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotEnoughData,
    NotFound,
    DependencyUnavailable,
    InvalidInput
}

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("At least {required} rounds are required for a handicap index, found {found}")]
    InsufficientScores { required: usize, found: usize },

    #[error("Player {0} has no current handicap index")]
    NoCurrentHandicap(i32),

    #[error("Player {player_id} has no rounds between {from} and {to}")]
    NoDataForPeriod {
        player_id: i32,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>
    },

    #[error("Player {player_id} is not on leaderboard {leaderboard_id}")]
    PlayerNotInLeaderboard { player_id: i32, leaderboard_id: i32 },

    #[error("Player {0} has no tournament history")]
    NoTournamentHistory(i32),

    #[error("Player {0} not found")]
    PlayerNotFound(i32),

    #[error("Player {0} has no recent scores")]
    NoRecentScores(i32),

    #[error("At least {required} rounds are required for this analysis, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tournament {tournament_id} ({date}) is older than the last applied result ({last_applied})")]
    OutOfOrderResult {
        tournament_id: i32,
        date: DateTime<FixedOffset>,
        last_applied: DateTime<FixedOffset>
    },

    #[error("Cannot {action} a round that is {state}")]
    InvalidRoundTransition { action: &'static str, state: String },

    #[error("{operation} failed for player {player_id}: {source}")]
    Provider {
        operation: &'static str,
        player_id: i32,
        #[source]
        source: ProviderError
    }
}

impl RatingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RatingError::InsufficientScores { .. }
            | RatingError::InsufficientData { .. }
            | RatingError::NoRecentScores(_)
            | RatingError::NoTournamentHistory(_)
            | RatingError::NoDataForPeriod { .. } => ErrorKind::NotEnoughData,
            RatingError::NoCurrentHandicap(_)
            | RatingError::PlayerNotFound(_)
            | RatingError::PlayerNotInLeaderboard { .. } => ErrorKind::NotFound,
            RatingError::Provider { source, .. } => match source {
                ProviderError::NotFound(_) => ErrorKind::NotFound,
                _ => ErrorKind::DependencyUnavailable
            },
            RatingError::InvalidInput(_)
            | RatingError::OutOfOrderResult { .. }
            | RatingError::InvalidRoundTransition { .. } => ErrorKind::InvalidInput
        }
    }

    /// Wraps a collaborator failure with the operation and player it belonged to.
    pub fn provider(operation: &'static str, player_id: i32) -> impl FnOnce(ProviderError) -> RatingError {
        move |source| RatingError::Provider {
            operation,
            player_id,
            source
        }
    }
}

pub type RatingResult<T> = Result<T, RatingError>;
