//! # Intake Flow Controller
//!
//! Drives each user through the form: `/start` → name → email → saved.
//! The controller knows nothing about Telegram; it takes an [`Inbound`]
//! message and answers with an [`Outcome`] that the bot layer renders.
//!
//! Per-user form state lives in teloxide's `InMemStorage`. A submission is
//! persisted at most once: the dialogue is removed before the record is
//! handed to the sink, and removal fails for every caller but the first.

use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::{InMemStorage, InMemStorageError};
use tracing::{debug, error, info, warn};

use crate::config::Blocklist;
use crate::dialogue::{dialogue_key, IntakeDialogue, IntakeState, UserKey};
use crate::error::StorageError;
use crate::storage::{Record, RecordSink};
use crate::validation::validate_email;

/// Bot commands understood by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Help,
    Unknown(String),
}

impl Command {
    /// Parse a message body as a command, e.g. `/start` or `/cancel@my_bot`.
    ///
    /// Returns `None` for text that is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        Some(match name {
            "start" => Command::Start,
            "cancel" => Command::Cancel,
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Command(Command),
    Text(String),
    /// Photos, stickers and anything else without a text body
    NonText,
}

/// One message from a user, stripped of transport details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: UserKey,
    pub display_name: Option<String>,
    pub kind: InboundKind,
}

impl Inbound {
    pub fn new(user_id: UserKey, kind: InboundKind) -> Self {
        Self {
            user_id,
            display_name: None,
            kind,
        }
    }

    /// Classify a text body as a command or free text
    pub fn from_text(user_id: UserKey, text: &str) -> Self {
        let kind = match Command::parse(text) {
            Some(command) => InboundKind::Command(command),
            None => InboundKind::Text(text.to_string()),
        };
        Self::new(user_id, kind)
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// What the controller decided; the bot layer turns it into a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sender is blocklisted; nothing is sent
    Blocked,
    /// Nothing to say, e.g. an unknown command mid-form
    Ignored,
    AskName { display_name: Option<String> },
    AskEmail,
    InvalidEmail,
    Saved(Record),
    SaveFailed,
    Cancelled,
    NothingToCancel,
    Help,
    TextExpected,
    IdleHint,
}

impl Outcome {
    /// Whether the user gets any reply at all
    pub fn is_silent(&self) -> bool {
        matches!(self, Outcome::Blocked | Outcome::Ignored)
    }
}

pub struct IntakeController {
    storage: Arc<InMemStorage<IntakeState>>,
    sink: Arc<dyn RecordSink>,
    blocklist: Blocklist,
}

impl IntakeController {
    pub fn new(sink: Arc<dyn RecordSink>, blocklist: Blocklist) -> Self {
        Self {
            storage: InMemStorage::new(),
            sink,
            blocklist,
        }
    }

    fn dialogue(&self, user: UserKey) -> IntakeDialogue {
        IntakeDialogue::new(Arc::clone(&self.storage), dialogue_key(user))
    }

    /// Current form state for a user
    pub async fn state_of(&self, user: UserKey) -> Result<IntakeState> {
        Ok(self.dialogue(user).get().await?.unwrap_or_default())
    }

    /// Drop whatever the user had in progress
    pub async fn reset(&self, user: UserKey) {
        if let Err(InMemStorageError::DialogueNotFound) = self.dialogue(user).exit().await {
            debug!(user_id = user, "No form to reset");
        }
    }

    /// Process one inbound message and decide the reply
    pub async fn handle(&self, inbound: Inbound) -> Result<Outcome> {
        let user = inbound.user_id;

        if self.blocklist.contains(user) {
            if matches!(inbound.kind, InboundKind::Command(Command::Start)) {
                warn!(user_id = user, "Blocked user tried to start the bot");
            } else {
                debug!(user_id = user, "Ignoring message from blocked user");
            }
            return Ok(Outcome::Blocked);
        }

        let dialogue = self.dialogue(user);
        let state = dialogue.get().await?.unwrap_or_default();

        let outcome = match (inbound.kind, state) {
            (InboundKind::Command(Command::Start), state) => {
                if !state.is_idle() {
                    info!(user_id = user, "User restarted the form");
                } else {
                    info!(user_id = user, "User started the form");
                }
                dialogue.update(IntakeState::AwaitingName).await?;
                Outcome::AskName {
                    display_name: inbound.display_name,
                }
            }
            (InboundKind::Command(Command::Cancel), IntakeState::Idle) => Outcome::NothingToCancel,
            (InboundKind::Command(Command::Cancel), _) => match dialogue.exit().await {
                Ok(()) => {
                    info!(user_id = user, "User cancelled the form");
                    Outcome::Cancelled
                }
                Err(e) => {
                    debug!(user_id = user, error = %e, "Form already closed before cancel");
                    Outcome::NothingToCancel
                }
            },
            (InboundKind::Command(Command::Help), _) => Outcome::Help,
            (InboundKind::Command(Command::Unknown(name)), IntakeState::Idle) => {
                debug!(user_id = user, command = %name, "Unknown command while idle");
                Outcome::IdleHint
            }
            (InboundKind::Command(Command::Unknown(name)), _) => {
                debug!(user_id = user, command = %name, "Ignoring unknown command mid-form");
                Outcome::Ignored
            }
            (InboundKind::Text(_), IntakeState::Idle) => Outcome::IdleHint,
            (InboundKind::Text(name), IntakeState::AwaitingName) => {
                debug!(user_id = user, name = %name, "User entered name");
                dialogue.update(IntakeState::AwaitingEmail { name }).await?;
                Outcome::AskEmail
            }
            (InboundKind::Text(email), IntakeState::AwaitingEmail { name }) => {
                self.submit_email(&dialogue, user, name, email).await
            }
            (InboundKind::NonText, IntakeState::Idle) => Outcome::Ignored,
            (InboundKind::NonText, _) => Outcome::TextExpected,
        };

        Ok(outcome)
    }

    async fn submit_email(
        &self,
        dialogue: &IntakeDialogue,
        user: UserKey,
        name: String,
        email: String,
    ) -> Outcome {
        info!(user_id = user, email = %email, "User entered email");

        if let Err(e) = validate_email(&email) {
            debug!(user_id = user, error = %e, "Email rejected");
            return Outcome::InvalidEmail;
        }

        // Claim the submission: only one caller can remove the dialogue.
        if let Err(e) = dialogue.exit().await {
            warn!(user_id = user, error = %e, "Form was already completed by another message");
            return Outcome::Ignored;
        }

        let record = Record::new(name, email, user);
        match self.persist(record.clone()).await {
            Ok(()) => {
                info!(user_id = user, "Submission saved");
                Outcome::Saved(record)
            }
            Err(e) => {
                error!(user_id = user, error = %e, "Failed to save submission");
                Outcome::SaveFailed
            }
        }
    }

    async fn persist(&self, record: Record) -> Result<(), StorageError> {
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || sink.append(&record))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }
}
