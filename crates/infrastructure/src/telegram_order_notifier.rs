//! Telegram Bot API order notifier.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pickadrive_application::OrderNotifier;
use pickadrive_core::{AppError, AppResult};
use pickadrive_domain::{OrderId, ValidatedOrder};
use serde::{Deserialize, Serialize};
use tracing::info;

const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier posting each trip request to one or more Telegram chats.
pub struct TelegramOrderNotifier {
    http_client: reqwest::Client,
    bot_token: String,
    chat_ids: Vec<String>,
    api_base_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramOrderNotifier {
    /// Creates a notifier for the given bot and chats.
    pub fn new(
        http_client: reqwest::Client,
        bot_token: impl Into<String>,
        chat_ids: Vec<String>,
    ) -> AppResult<Self> {
        let bot_token = bot_token.into();
        if bot_token.trim().is_empty() {
            return Err(AppError::Validation(
                "telegram bot token must not be empty".to_owned(),
            ));
        }

        let chat_ids: Vec<String> = chat_ids
            .into_iter()
            .map(|chat_id| chat_id.trim().to_owned())
            .filter(|chat_id| !chat_id.is_empty())
            .collect();
        if chat_ids.is_empty() {
            return Err(AppError::Validation(
                "at least one telegram chat id is required".to_owned(),
            ));
        }

        Ok(Self {
            http_client,
            bot_token,
            chat_ids,
            api_base_url: TELEGRAM_API_BASE_URL.to_owned(),
        })
    }

    /// Overrides the Bot API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token)
    }

    async fn send_to_chat(&self, chat_id: &str, text: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.send_message_url())
            .timeout(SEND_TIMEOUT)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|error| {
                // The request URL carries the bot token, keep it out of the message.
                AppError::Unavailable(format!(
                    "failed to reach telegram for chat {chat_id}: {}",
                    error.without_url()
                ))
            })?;

        let status = response.status();
        let body = response
            .json::<SendMessageResponse>()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "telegram returned an unreadable response ({status}): {}",
                    error.without_url()
                ))
            })?;

        if !status.is_success() || !body.ok {
            return Err(AppError::Unavailable(format!(
                "telegram rejected message for chat {chat_id} ({status}): {}",
                body.description.unwrap_or_else(|| "no description".to_owned())
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl OrderNotifier for TelegramOrderNotifier {
    async fn notify_order(&self, order_id: OrderId, order: &ValidatedOrder) -> AppResult<()> {
        let text = format_order_message(order_id, order, Utc::now());

        for chat_id in &self.chat_ids {
            self.send_to_chat(chat_id, &text).await?;
        }

        info!(%order_id, chats = self.chat_ids.len(), "trip request sent to telegram");
        Ok(())
    }
}

/// Renders the staff-facing summary of a trip request submitted at `submitted_at`.
#[must_use]
pub fn format_order_message(
    order_id: OrderId,
    order: &ValidatedOrder,
    submitted_at: DateTime<Utc>,
) -> String {
    let mut message = format!("New trip request {order_id}\n\n");
    let _ = writeln!(message, "Name: {}", order.customer_name.as_str());
    let _ = writeln!(message, "Phone: {}", order.customer_phone.as_str());
    let _ = writeln!(message, "From: {}", order.from_location.as_str());
    let _ = writeln!(message, "To: {}", order.to_location.as_str());
    let _ = writeln!(message, "Date: {}", order.trip_date.as_str());
    let _ = writeln!(message, "Passengers: {}", order.passengers_count);
    if let Some(bus_id) = order.bus_id {
        let _ = writeln!(message, "Bus: #{bus_id}");
    }
    let _ = writeln!(
        message,
        "Requests: {}",
        order.special_requests.as_deref().unwrap_or("none")
    );
    let _ = write!(
        message,
        "\nSubmitted: {}",
        submitted_at.format("%d.%m.%Y, %H:%M:%S UTC")
    );

    message
}
