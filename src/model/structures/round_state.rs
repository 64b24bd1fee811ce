use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;
use strum_macros::Display;

/// Lifecycle of a round that is being followed live.
#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[repr(u8)]
pub enum RoundState {
    #[default]
    NotStarted = 0,
    InProgress = 1,
    Completed = 2
}

impl TryFrom<i32> for RoundState {
    type Error = ();

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RoundState::NotStarted),
            1 => Ok(RoundState::InProgress),
            2 => Ok(RoundState::Completed),
            _ => Err(())
        }
    }
}
