//! Intake dialogue module for tracking each user's progress through the form.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{ChatId, UserId};

/// Stable identifier of the remote participant (a Telegram user id)
pub type UserKey = u64;

/// Represents the conversation state for the intake form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeState {
    #[default]
    Idle,
    AwaitingName,
    AwaitingEmail {
        name: String,
    },
}

impl IntakeState {
    /// Name collected so far, if the name step has completed
    pub fn collected_name(&self) -> Option<&str> {
        match self {
            IntakeState::AwaitingEmail { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, IntakeState::Idle)
    }
}

/// Type alias for our intake dialogue
pub type IntakeDialogue = Dialogue<IntakeState, InMemStorage<IntakeState>>;

/// Storage key for a user's dialogue; forms are tracked per user, not per chat
pub fn dialogue_key(user: UserKey) -> ChatId {
    ChatId::from(UserId(user))
}
