//! Request admission gate: ports and application service.
//!
//! Counts admitted attempts per client key over a rolling window and keeps
//! the full attempt log durable so quotas survive restarts.

mod gate;
mod ports;


pub use gate::AdmissionGate;
pub use ports::{AddressAgentKeyDeriver, AttemptLogStore, ClientKeyDeriver, Clock};
