//! Geo-targeting catalogue served by the locations API.

use serde::{Deserialize, Serialize};

/// Proxy network whose locations are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationProxyType {
    #[default]
    Residential,
    Unlimited,
}

impl LocationProxyType {
    /// Numeric code expected in `proxy_type`.
    pub fn code(self) -> u8 {
        match self {
            LocationProxyType::Residential => 1,
            LocationProxyType::Unlimited => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub country_code: String,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub state_code: String,
    pub state_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityInfo {
    pub city_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnInfo {
    pub asn_code: String,
    pub asn_name: String,
}
