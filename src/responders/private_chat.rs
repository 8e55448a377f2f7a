use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::composer::{self, Composer};
use crate::responder::{Responder, ResponderContext};

/// Default responder for one-to-one chats: any text gets a holiday and a toast.
/// Group chats fall through so the bot stays quiet there.
pub struct PrivateChatResponder {
    composer: Arc<Composer>,
}

impl PrivateChatResponder {
    pub fn new(composer: Arc<Composer>) -> Self {
        Self { composer }
    }
}

#[async_trait]
impl Responder for PrivateChatResponder {
    fn name(&self) -> &str {
        "PrivateChatResponder"
    }

    fn priority(&self) -> i32 {
        // Low priority - fallback after explicit commands
        10
    }

    async fn should_handle(&self, context: &ResponderContext) -> bool {
        context.is_private()
    }

    async fn handle(&self, context: &ResponderContext) -> Result<String> {
        info!(chat_id = context.chat_id, sender = %context.sender, "Private chat message");
        let reply = self.composer.compose_message(composer::today()).await;
        Ok(reply)
    }
}
