//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_order_notifier;
mod in_memory_attempt_log_store;
mod json_file_attempt_log_store;
mod system_clock;
mod telegram_order_notifier;

pub use console_order_notifier::ConsoleOrderNotifier;
pub use in_memory_attempt_log_store::InMemoryAttemptLogStore;
pub use json_file_attempt_log_store::JsonFileAttemptLogStore;
pub use system_clock::SystemClock;
pub use telegram_order_notifier::{TelegramOrderNotifier, format_order_message};
