//! Caller fingerprints used to bucket admission attempts.
//!
//! A key is built from the network origin and the client-agent string. It is a
//! weak identity: callers sharing an address and agent share a quota, and a
//! caller that changes its agent string gets a fresh one.

use std::fmt::{Display, Formatter};

use pickadrive_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Separator placed between the origin and agent components.
pub const CLIENT_KEY_SEPARATOR: &str = "__";

/// Substitute for a missing or blank key component.
pub const UNKNOWN_COMPONENT: &str = "unknown";

/// Request attributes a key can be derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Network origin of the caller, usually an IP address.
    pub network_origin: Option<String>,
    /// Caller-supplied agent string.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Creates a request context from optional components.
    #[must_use]
    pub fn new(network_origin: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            network_origin,
            user_agent,
        }
    }
}

/// Fingerprint identifying one admission bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientKey(String);

impl ClientKey {
    /// Creates a key from an already formatted, non-blank value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "client key must not be empty".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Builds `"{origin}__{agent}"`, substituting `unknown` for blank parts.
    #[must_use]
    pub fn from_components(network_origin: Option<&str>, user_agent: Option<&str>) -> Self {
        let origin = component_or_unknown(network_origin);
        let agent = component_or_unknown(user_agent);

        Self(format!("{origin}{CLIENT_KEY_SEPARATOR}{agent}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&RequestContext> for ClientKey {
    fn from(context: &RequestContext) -> Self {
        Self::from_components(
            context.network_origin.as_deref(),
            context.user_agent.as_deref(),
        )
    }
}

impl Display for ClientKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

fn component_or_unknown(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_COMPONENT)
}
