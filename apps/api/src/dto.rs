use pickadrive_domain::OrderRequest;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Trip request body. Accepts the booking form's field names as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitOrderRequest {
    #[serde(default, alias = "name")]
    pub customer_name: String,
    #[serde(default, alias = "phone")]
    pub customer_phone: String,
    #[serde(default, alias = "from")]
    pub from_location: String,
    #[serde(default, alias = "to")]
    pub to_location: String,
    #[serde(default, alias = "dateTime")]
    pub trip_date: String,
    #[serde(default, alias = "passengers", deserialize_with = "whole_number")]
    pub passengers_count: i64,
    #[serde(default, alias = "request")]
    pub special_requests: Option<String>,
    #[serde(default, alias = "busId", deserialize_with = "optional_whole_number")]
    pub bus_id: Option<i64>,
}

impl From<SubmitOrderRequest> for OrderRequest {
    fn from(value: SubmitOrderRequest) -> Self {
        Self {
            customer_name: value.customer_name,
            customer_phone: value.customer_phone,
            from_location: value.from_location,
            to_location: value.to_location,
            trip_date: value.trip_date,
            passengers_count: value.passengers_count,
            special_requests: value.special_requests,
            bus_id: value.bus_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub message: String,
    pub order_id: String,
}

// HTML forms post numbers as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_whole_number(deserializer).map(Option::unwrap_or_default)
}

fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a whole number, got '{text}'"))),
    }
}
