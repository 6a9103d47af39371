//! Payment gateway identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported payment gateways.
///
/// Each gateway brings its own signing scheme, amount unit, and success
/// sentinel; those live in the gateway adapters, selected by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayProvider {
    Vnpay,
    Momo,
}

impl GatewayProvider {
    /// Stable lowercase identifier used in storage and routing.
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayProvider::Vnpay => "vnpay",
            GatewayProvider::Momo => "momo",
        }
    }
}

impl fmt::Display for GatewayProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GatewayProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vnpay" => Ok(GatewayProvider::Vnpay),
            "momo" => Ok(GatewayProvider::Momo),
            other => Err(format!("unknown payment provider: {}", other)),
        }
    }
}
