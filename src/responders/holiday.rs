use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::composer::{self, Composer};
use crate::responder::{Responder, ResponderContext};

/// Commands that ask for today's holiday
pub const HOLIDAY_COMMANDS: [&str; 2] = ["povod", "holiday"];

/// Answers `/povod` and `/holiday` in any chat
pub struct HolidayResponder {
    composer: Arc<Composer>,
}

impl HolidayResponder {
    pub fn new(composer: Arc<Composer>) -> Self {
        Self { composer }
    }
}

#[async_trait]
impl Responder for HolidayResponder {
    fn name(&self) -> &str {
        "HolidayResponder"
    }

    fn priority(&self) -> i32 {
        50
    }

    async fn should_handle(&self, context: &ResponderContext) -> bool {
        context
            .command()
            .is_some_and(|cmd| HOLIDAY_COMMANDS.contains(&cmd.as_str()))
    }

    async fn handle(&self, context: &ResponderContext) -> Result<String> {
        info!(chat_id = context.chat_id, sender = %context.sender, "Holiday requested");
        let reply = self.composer.compose_message(composer::today()).await;
        Ok(reply)
    }
}
