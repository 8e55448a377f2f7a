use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::responder::{Responder, ResponderContext};

/// Routes chat messages to responders using Chain of Responsibility pattern
pub struct ResponderManager {
    responders: Vec<Arc<dyn Responder>>,
}

impl ResponderManager {
    /// Create a new empty responder manager
    pub fn new() -> Self {
        Self {
            responders: Vec::new(),
        }
    }

    /// Register a new responder
    /// Responders are automatically sorted by priority (highest first)
    pub fn register(&mut self, responder: Arc<dyn Responder>) {
        info!(
            "📝 Registering responder: {} (priority: {})",
            responder.name(),
            responder.priority()
        );
        self.responders.push(responder);

        // Sort by priority (highest first)
        self.responders
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Process a message through all registered responders
    /// Returns the reply of the first responder that accepts it, or None
    /// when nobody does (e.g. small talk in a group chat)
    pub async fn process_message(&self, context: &ResponderContext) -> Result<Option<String>> {
        for responder in &self.responders {
            // Two-phase dispatch: check first, then handle
            if !responder.should_handle(context).await {
                debug!("⏩ Responder '{}' declined to handle", responder.name());
                continue;
            }

            let reply = responder.handle(context).await?;
            info!("✅ Message handled by responder: {}", responder.name());
            return Ok(Some(reply));
        }

        debug!("⏩ No responder handled the message in chat {}", context.chat_id);
        Ok(None)
    }

    /// List all registered responders with their priorities, in dispatch order
    pub fn list_responders(&self) -> Vec<(String, i32)> {
        self.responders
            .iter()
            .map(|r| (r.name().to_string(), r.priority()))
            .collect()
    }
}

impl Default for ResponderManager {
    fn default() -> Self {
        Self::new()
    }
}
