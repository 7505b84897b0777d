//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod admission;
mod attempt_log;
mod client_key;
mod order;

pub use admission::{AdmissionDecision, AdmissionPolicy, DAY_MILLIS};
pub use attempt_log::{AttemptLog, PurgeSummary};
pub use client_key::{CLIENT_KEY_SEPARATOR, ClientKey, RequestContext, UNKNOWN_COMPONENT};
pub use order::{
    CUSTOMER_NAME_MAX_LENGTH, CUSTOMER_PHONE_MAX_LENGTH, LOCATION_MAX_LENGTH, OrderId,
    OrderRequest, TRIP_DATE_MAX_LENGTH, ValidatedOrder,
};
