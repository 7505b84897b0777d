//! Application services and ports.

#![forbid(unsafe_code)]

mod admission_service;
mod order_service;

pub use admission_service::{
    AddressAgentKeyDeriver, AdmissionGate, AttemptLogStore, ClientKeyDeriver, Clock,
};
pub use order_service::{OrderNotifier, OrderService};
