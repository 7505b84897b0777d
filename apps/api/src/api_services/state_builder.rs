use std::sync::Arc;

use pickadrive_application::{AddressAgentKeyDeriver, OrderService};
use pickadrive_core::AppError;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::{admission, notifier};

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let admission_gate = admission::build_admission_gate(config).await;
    let order_notifier = notifier::build_order_notifier(config)?;

    Ok(AppState {
        admission_gate,
        client_key_deriver: Arc::new(AddressAgentKeyDeriver),
        order_service: OrderService::new(order_notifier),
        trusted_proxies: config.trusted_proxies.clone().into(),
    })
}
