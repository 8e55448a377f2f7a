use anyhow::Result;
use async_trait::async_trait;

use crate::telegram::ChatKind;

/// Context provided to responders for handling messages
#[derive(Debug, Clone)]
pub struct ResponderContext {
    /// Chat the message was received in
    pub chat_id: i64,
    /// Private chat, group, supergroup or channel
    pub chat_kind: ChatKind,
    /// Id of the incoming message, used to reply to it
    pub message_id: i64,
    /// Display name or id of the sender
    pub sender: String,
    /// The actual message text
    pub message_body: String,
    /// Our own username, for matching `/command@bot`
    pub bot_username: Option<String>,
}

impl ResponderContext {
    pub fn is_private(&self) -> bool {
        self.chat_kind == ChatKind::Private
    }

    /// Command addressed to us, lowercased and without the leading slash.
    ///
    /// `/povod@OtherBot` is not ours and yields `None`.
    pub fn command(&self) -> Option<String> {
        let first = self.message_body.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let (name, target) = match name.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (name, None),
        };

        if let (Some(target), Some(own)) = (target, self.bot_username.as_deref()) {
            if !target.eq_ignore_ascii_case(own) {
                return None;
            }
        }

        if name.is_empty() {
            return None;
        }
        Some(name.to_lowercase())
    }
}

/// Core trait that all responders must implement
#[async_trait]
pub trait Responder: Send + Sync {
    /// Returns the name of this responder
    fn name(&self) -> &str;

    /// Returns the priority of this responder (higher = checked first)
    /// Default priority is 0
    fn priority(&self) -> i32 {
        0
    }

    /// Check if this responder should handle the message
    /// This is called first as a fast filter before handle()
    async fn should_handle(&self, context: &ResponderContext) -> bool;

    /// Handle the message and return the reply text
    /// Only called if should_handle() returns true
    async fn handle(&self, context: &ResponderContext) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context(chat_kind: ChatKind, text: &str) -> ResponderContext {
        ResponderContext {
            chat_id: 1,
            chat_kind,
            message_id: 7,
            sender: "tester".to_string(),
            message_body: text.to_string(),
            bot_username: Some("PovodBot".to_string()),
        }
    }
}
