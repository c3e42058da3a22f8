//! UI Builder module for turning controller outcomes into reply messages

use teloxide::types::{BotCommand, ForceReply};

use crate::intake::Outcome;
use crate::localization::{LocalizationManager, DEFAULT_LANGUAGE};

/// A rendered reply, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Ask the client to open a reply box for this message
    pub force_reply: bool,
}

impl Reply {
    fn text(text: String) -> Self {
        Self {
            text,
            force_reply: false,
        }
    }

    pub fn markup(&self) -> Option<ForceReply> {
        self.force_reply.then(|| ForceReply::new().selective())
    }
}

/// Render an outcome as a localized reply; `None` means stay silent
pub fn render_outcome(
    outcome: &Outcome,
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Option<Reply> {
    let t = |key: &str| localization.t_lang(key, language_code);

    let reply = match outcome {
        Outcome::Blocked | Outcome::Ignored => return None,
        Outcome::AskName {
            display_name: Some(name),
        } => Reply::text(localization.t_args_lang("ask-name", &[("name", name.as_str())], language_code)),
        Outcome::AskName { display_name: None } => Reply::text(t("ask-name-anonymous")),
        Outcome::AskEmail => Reply {
            text: t("ask-email"),
            force_reply: true,
        },
        Outcome::InvalidEmail => Reply::text(t("email-invalid")),
        Outcome::Saved(_) => Reply::text(t("save-success")),
        Outcome::SaveFailed => Reply::text(t("save-failed")),
        Outcome::Cancelled => Reply::text(t("cancelled")),
        Outcome::NothingToCancel => Reply::text(t("nothing-to-cancel")),
        Outcome::Help => Reply::text(t("help-text")),
        Outcome::TextExpected => Reply::text(t("text-expected")),
        Outcome::IdleHint => Reply::text(t("idle-hint")),
    };

    Some(reply)
}

/// Command list registered with Telegram at startup
pub fn bot_commands(localization: &LocalizationManager) -> Vec<BotCommand> {
    ["start", "cancel", "help"]
        .into_iter()
        .map(|command| {
            let description = localization.get_message_in_language(
                &format!("command-{command}"),
                DEFAULT_LANGUAGE,
                None,
            );
            BotCommand::new(command, description)
        })
        .collect()
}
