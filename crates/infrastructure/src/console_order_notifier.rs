//! Console order notifier for development. Logs requests to tracing output.

use async_trait::async_trait;
use chrono::Utc;
use pickadrive_application::OrderNotifier;
use pickadrive_core::AppResult;
use pickadrive_domain::{OrderId, ValidatedOrder};
use tracing::info;

use crate::format_order_message;

/// Development notifier that logs trip requests to the console.
#[derive(Clone)]
pub struct ConsoleOrderNotifier;

impl ConsoleOrderNotifier {
    /// Creates a new console order notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleOrderNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderNotifier for ConsoleOrderNotifier {
    async fn notify_order(&self, order_id: OrderId, order: &ValidatedOrder) -> AppResult<()> {
        info!(
            %order_id,
            "--- TRIP REQUEST (console) ---\n{}\n--- END TRIP REQUEST ---",
            format_order_message(order_id, order, Utc::now())
        );

        Ok(())
    }
}
