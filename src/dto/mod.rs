//! Composite response bodies. Each wraps an entity model (flattened into the
//! JSON object) together with the related rows the dashboard renders with it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{customer, item, package, partial_shipment, shipment};

/// A partial shipment with its packages, customs items and, when loaded,
/// the owning customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartialShipmentDetail {
    #[serde(flatten)]
    pub partial: partial_shipment::Model,
    pub packages: Vec<package::Model>,
    pub items: Vec<item::Model>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer: Option<customer::Model>,
}

impl PartialShipmentDetail {
    pub fn total_package_weight(&self) -> f64 {
        self.packages.iter().map(|p| p.weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: shipment::Model,
    pub partial_shipments: Vec<PartialShipmentDetail>,
}

/// A customer's partial shipment together with the shipment it rides on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPartialShipment {
    #[serde(flatten)]
    pub partial: partial_shipment::Model,
    pub shipment: Option<shipment::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: customer::Model,
    pub partial_shipments: Vec<CustomerPartialShipment>,
}

/// Body of successful DELETE requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
