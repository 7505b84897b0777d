//! Trip request types and validation rules.

use pickadrive_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum customer name length.
pub const CUSTOMER_NAME_MAX_LENGTH: usize = 100;

/// Maximum customer phone length.
pub const CUSTOMER_PHONE_MAX_LENGTH: usize = 20;

/// Maximum pickup or destination length.
pub const LOCATION_MAX_LENGTH: usize = 255;

/// Maximum free-form trip date length.
pub const TRIP_DATE_MAX_LENGTH: usize = 100;

/// Reference handed back to the customer for an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random order identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unvalidated trip request as submitted by a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRequest {
    /// Customer display name.
    pub customer_name: String,
    /// Contact phone number.
    pub customer_phone: String,
    /// Pickup location.
    pub from_location: String,
    /// Destination.
    pub to_location: String,
    /// Requested trip date, free-form.
    pub trip_date: String,
    /// Number of passengers.
    pub passengers_count: i64,
    /// Optional notes for staff.
    pub special_requests: Option<String>,
    /// Optional preferred bus.
    pub bus_id: Option<i64>,
}

/// Trip request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    /// Customer display name.
    pub customer_name: NonEmptyString,
    /// Contact phone number.
    pub customer_phone: NonEmptyString,
    /// Pickup location.
    pub from_location: NonEmptyString,
    /// Destination.
    pub to_location: NonEmptyString,
    /// Requested trip date, free-form.
    pub trip_date: NonEmptyString,
    /// Number of passengers, at least one.
    pub passengers_count: u32,
    /// Notes for staff, `None` when blank.
    pub special_requests: Option<String>,
    /// Preferred bus, if any.
    pub bus_id: Option<i64>,
}

impl OrderRequest {
    /// Validates required fields and length limits.
    pub fn validate(self) -> AppResult<ValidatedOrder> {
        let customer_name = bounded_field(
            "customer_name",
            self.customer_name,
            CUSTOMER_NAME_MAX_LENGTH,
        )?;
        let customer_phone = bounded_field(
            "customer_phone",
            self.customer_phone,
            CUSTOMER_PHONE_MAX_LENGTH,
        )?;
        let from_location = bounded_field("from_location", self.from_location, LOCATION_MAX_LENGTH)?;
        let to_location = bounded_field("to_location", self.to_location, LOCATION_MAX_LENGTH)?;
        let trip_date = bounded_field("trip_date", self.trip_date, TRIP_DATE_MAX_LENGTH)?;

        if self.passengers_count < 1 {
            return Err(AppError::Validation(
                "passengers_count must be at least 1".to_owned(),
            ));
        }
        let passengers_count = u32::try_from(self.passengers_count).map_err(|error| {
            AppError::Validation(format!("passengers_count is out of range: {error}"))
        })?;

        if let Some(bus_id) = self.bus_id
            && bus_id < 1
        {
            return Err(AppError::Validation(
                "bus_id must be a positive identifier".to_owned(),
            ));
        }

        let special_requests = self
            .special_requests
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(ValidatedOrder {
            customer_name,
            customer_phone,
            from_location,
            to_location,
            trip_date,
            passengers_count,
            special_requests,
            bus_id: self.bus_id,
        })
    }
}

fn bounded_field(name: &str, value: String, max_length: usize) -> AppResult<NonEmptyString> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "{name} must not exceed {max_length} characters"
        )));
    }

    NonEmptyString::new(trimmed)
        .map_err(|_| AppError::Validation(format!("{name} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OrderRequest {
        OrderRequest {
            customer_name: "Ivan Petrov".to_owned(),
            customer_phone: "+7 900 000-00-00".to_owned(),
            from_location: "Kazan".to_owned(),
            to_location: "Innopolis".to_owned(),
            trip_date: "2026-11-02 09:00".to_owned(),
            passengers_count: 14,
            special_requests: Some("   ".to_owned()),
            bus_id: Some(2),
        }
    }

    #[test]
    fn valid_request_is_accepted() {
        let order = request().validate();
        assert!(order.is_ok());

        let order = order.unwrap_or_else(|_| panic!("test"));
        assert_eq!(order.passengers_count, 14);
        assert_eq!(order.customer_name.as_str(), "Ivan Petrov");
        assert_eq!(order.special_requests, None);
    }

    #[test]
    fn blank_name_is_rejected() {
        let order = OrderRequest {
            customer_name: "  ".to_owned(),
            ..request()
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn overlong_phone_is_rejected() {
        let order = OrderRequest {
            customer_phone: "1".repeat(CUSTOMER_PHONE_MAX_LENGTH + 1),
            ..request()
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn zero_passengers_are_rejected() {
        let order = OrderRequest {
            passengers_count: 0,
            ..request()
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn non_positive_bus_id_is_rejected() {
        let order = OrderRequest {
            bus_id: Some(0),
            ..request()
        };
        assert!(order.validate().is_err());
    }
}
