use std::sync::Arc;

use pickadrive_application::OrderNotifier;
use pickadrive_core::AppResult;
use pickadrive_infrastructure::{ConsoleOrderNotifier, TelegramOrderNotifier};
use tracing::info;

use crate::api_config::{ApiConfig, OrderNotifierConfig};

pub(super) fn build_order_notifier(config: &ApiConfig) -> AppResult<Arc<dyn OrderNotifier>> {
    match &config.order_notifier {
        OrderNotifierConfig::Console => {
            info!("using console order notifier");
            Ok(Arc::new(ConsoleOrderNotifier::new()))
        }
        OrderNotifierConfig::Telegram(telegram) => {
            info!(chats = telegram.chat_ids.len(), "using telegram order notifier");
            Ok(Arc::new(TelegramOrderNotifier::new(
                reqwest::Client::new(),
                telegram.bot_token.clone(),
                telegram.chat_ids.clone(),
            )?))
        }
    }
}
