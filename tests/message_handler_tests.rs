//! # Message Handler Tests
//!
//! Translation of Telegram messages into controller input and the
//! recovery path taken when handling a message fails.

use anyhow::Result;
use std::sync::Arc;
use teloxide::types::Message;

use contact_intake::bot::message_handler::{inbound_from_message, reply_failure_is_fatal};
use contact_intake::bot::recover_from_error;
use contact_intake::config::Blocklist;
use contact_intake::dialogue::IntakeState;
use contact_intake::error::StorageError;
use contact_intake::intake::{Command, InboundKind, IntakeController, Outcome};
use contact_intake::localization::LocalizationManager;
use contact_intake::storage::{Record, RecordSink};

struct NullSink;

impl RecordSink for NullSink {
    fn ensure_initialized(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn append(&self, _record: &Record) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Build a private-chat message the way the Bot API delivers it
fn message_json(extra: serde_json::Value) -> Result<Message> {
    let mut json = serde_json::json!({
        "message_id": 17,
        "date": 1_760_000_000,
        "chat": { "id": 4242, "type": "private", "first_name": "Ana" },
        "from": {
            "id": 4242,
            "is_bot": false,
            "first_name": "Ana",
            "last_name": "P",
            "language_code": "fa"
        }
    });
    if let (Some(base), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    Ok(serde_json::from_value(json)?)
}

#[test]
fn test_text_message_becomes_command() -> Result<()> {
    let msg = message_json(serde_json::json!({ "text": "/start" }))?;
    let user = msg.from.as_ref().unwrap();

    let inbound = inbound_from_message(user, &msg);
    assert_eq!(inbound.user_id, 4242);
    assert_eq!(inbound.display_name.as_deref(), Some("Ana P"));
    assert_eq!(inbound.kind, InboundKind::Command(Command::Start));
    Ok(())
}

#[test]
fn test_free_text_is_kept_verbatim() -> Result<()> {
    let msg = message_json(serde_json::json!({ "text": " Ana  " }))?;
    let user = msg.from.as_ref().unwrap();

    let inbound = inbound_from_message(user, &msg);
    assert_eq!(inbound.kind, InboundKind::Text(" Ana  ".to_string()));
    Ok(())
}

#[test]
fn test_photo_message_is_non_text() -> Result<()> {
    let msg = message_json(serde_json::json!({
        "photo": [{
            "file_id": "photo-id",
            "file_unique_id": "photo-unique",
            "width": 90,
            "height": 90,
            "file_size": 1024
        }]
    }))?;
    let user = msg.from.as_ref().unwrap();

    assert_eq!(inbound_from_message(user, &msg).kind, InboundKind::NonText);
    Ok(())
}

#[tokio::test]
async fn test_recovery_resets_form_and_returns_generic_notice() -> Result<()> {
    let controller = IntakeController::new(Arc::new(NullSink), Blocklist::default());
    let localization = LocalizationManager::new()?;

    let msg = message_json(serde_json::json!({ "text": "/start" }))?;
    let user = msg.from.as_ref().unwrap();
    controller.handle(inbound_from_message(user, &msg)).await?;
    let msg = message_json(serde_json::json!({ "text": "Ana" }))?;
    controller.handle(inbound_from_message(user, &msg)).await?;
    assert!(matches!(
        controller.state_of(4242).await?,
        IntakeState::AwaitingEmail { .. }
    ));

    let notice = recover_from_error(&controller, &localization, 4242, Some("fa")).await;

    assert_eq!(notice, localization.t_lang("error-generic", Some("fa")));
    assert_eq!(controller.state_of(4242).await?, IntakeState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_recovery_for_idle_user() -> Result<()> {
    let controller = IntakeController::new(Arc::new(NullSink), Blocklist::default());
    let localization = LocalizationManager::new()?;

    let notice = recover_from_error(&controller, &localization, 7, None).await;

    assert_eq!(notice, localization.t_lang("error-generic", None));
    assert_eq!(controller.state_of(7).await?, IntakeState::Idle);
    Ok(())
}

#[test]
fn test_undelivered_confirmation_is_not_an_error() {
    let record = Record::new("Ana", "ana@example.com", 4242);
    assert!(!reply_failure_is_fatal(&Outcome::Saved(record)));

    assert!(reply_failure_is_fatal(&Outcome::AskEmail));
    assert!(reply_failure_is_fatal(&Outcome::SaveFailed));
    assert!(reply_failure_is_fatal(&Outcome::Cancelled));
}
