//! Message Handler module for processing incoming Telegram messages

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::{debug, error, warn};

use crate::dialogue::UserKey;
use crate::intake::{Inbound, InboundKind, IntakeController, Outcome};
use crate::localization::LocalizationManager;

use super::ui_builder::render_outcome;

/// Build the controller's view of a Telegram message
pub fn inbound_from_message(user: &User, msg: &Message) -> Inbound {
    let inbound = match msg.text() {
        Some(text) => Inbound::from_text(user.id.0, text),
        None => Inbound::new(user.id.0, InboundKind::NonText),
    };
    inbound.with_display_name(user.full_name())
}

/// Whether failing to deliver this outcome's reply should be treated as an error.
///
/// A saved submission stays saved; telling the user it failed would be wrong.
pub fn reply_failure_is_fatal(outcome: &Outcome) -> bool {
    !matches!(outcome, Outcome::Saved(_))
}

/// Reset the user's form after an unhandled error and return the notice to send
pub async fn recover_from_error(
    controller: &IntakeController,
    localization: &LocalizationManager,
    user: UserKey,
    language_code: Option<&str>,
) -> String {
    controller.reset(user).await;
    localization.t_lang("error-generic", language_code)
}

async fn process_message(
    bot: &Bot,
    msg: &Message,
    user: &User,
    controller: &IntakeController,
    localization: &LocalizationManager,
) -> Result<()> {
    let language_code = user.language_code.as_deref();
    let inbound = inbound_from_message(user, msg);
    debug!(user_id = %user.id, kind = ?inbound.kind, "Received message from user");

    let outcome = controller.handle(inbound).await?;

    if let Some(reply) = render_outcome(&outcome, localization, language_code) {
        let mut request = bot.send_message(msg.chat.id, reply.text.clone());
        if let Some(markup) = reply.markup() {
            request = request.reply_markup(markup);
        }

        if let Err(e) = request.await {
            if !reply_failure_is_fatal(&outcome) {
                warn!(user_id = %user.id, error = %e, "Submission saved but confirmation was not delivered");
                return Ok(());
            }
            return Err(e).with_context(|| format!("Failed to send reply for {outcome:?}"));
        }
    }

    Ok(())
}

/// Entry point for message updates.
///
/// Errors never escape to the dispatcher: they are logged, the user's form
/// is reset, and the user is told something went wrong.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    controller: Arc<IntakeController>,
    localization: Arc<LocalizationManager>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };

    if let Err(e) = process_message(&bot, &msg, user, &controller, &localization).await {
        error!(
            user_id = %user.id,
            chat_id = %msg.chat.id,
            error = ?e,
            "Unhandled error while processing message"
        );

        let text = recover_from_error(
            &controller,
            &localization,
            user.id.0,
            user.language_code.as_deref(),
        )
        .await;
        if let Err(send_err) = bot.send_message(msg.chat.id, text).await {
            error!(user_id = %user.id, error = %send_err, "Failed to send error notice");
        }
    }

    Ok(())
}
