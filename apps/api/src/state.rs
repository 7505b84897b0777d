use std::sync::Arc;

use ipnet::IpNet;
use pickadrive_application::{AdmissionGate, ClientKeyDeriver, OrderService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub admission_gate: AdmissionGate,
    pub client_key_deriver: Arc<dyn ClientKeyDeriver>,
    pub order_service: OrderService,
    pub trusted_proxies: Arc<[IpNet]>,
}
