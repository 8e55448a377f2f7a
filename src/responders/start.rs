use anyhow::Result;
use async_trait::async_trait;

use crate::responder::{Responder, ResponderContext};

pub const HELP_TEXT: &str = "Привет! Я подскажу, какой сегодня праздник.\n\
Команда: /povod (алиас /holiday).\n\
В группе отвечаю только на эти команды, чтобы не шуметь.";

/// Answers `/start` with a short help text
pub struct StartResponder;

impl StartResponder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Responder for StartResponder {
    fn name(&self) -> &str {
        "StartResponder"
    }

    fn priority(&self) -> i32 {
        100 // Checked before anything that could swallow the command
    }

    async fn should_handle(&self, context: &ResponderContext) -> bool {
        context.command().as_deref() == Some("start")
    }

    async fn handle(&self, _context: &ResponderContext) -> Result<String> {
        Ok(HELP_TEXT.to_string())
    }
}
