use crate::{
    common::NumericInput,
    db::DbPool,
    dto::{PartialShipmentDetail, ShipmentDetail},
    entities::{partial_shipment, shipment},
    errors::ServiceError,
    services::partial_shipments::load_details,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "customerId": 1, "shipmentId": 2 }))]
pub struct InvoiceRequest {
    #[serde(default)]
    pub partial_shipment_ids: Option<Vec<NumericInput>>,
    #[serde(default)]
    pub customer_id: Option<NumericInput>,
    #[serde(default)]
    pub shipment_id: Option<NumericInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDocumentRequest {
    pub shipment_id: NumericInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDocument {
    pub message: String,
    pub partials: Vec<PartialShipmentDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShipmentDocument {
    pub message: String,
    pub shipment: ShipmentDetail,
}

/// Selects the partial shipments an invoice covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceSelector {
    Partials(Vec<i32>),
    CustomerInShipment { customer_id: i32, shipment_id: i32 },
}

impl InvoiceRequest {
    pub fn selector(&self) -> Result<InvoiceSelector, ServiceError> {
        if let Some(ids) = self.partial_shipment_ids.as_ref().filter(|ids| !ids.is_empty()) {
            let ids = ids
                .iter()
                .map(|id| id.to_id("partialShipmentIds"))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(InvoiceSelector::Partials(ids));
        }
        match (&self.customer_id, &self.shipment_id) {
            (Some(customer), Some(shipment)) => Ok(InvoiceSelector::CustomerInShipment {
                customer_id: customer.to_id("customerId")?,
                shipment_id: shipment.to_id("shipmentId")?,
            }),
            _ => Err(ServiceError::BadRequest(
                "Provide partialShipmentIds or both customerId and shipmentId".to_string(),
            )),
        }
    }
}

/// JSON document payloads. Rendering to paper happens on the client.
#[derive(Clone)]
pub struct DocumentService {
    db_pool: Arc<DbPool>,
}

impl DocumentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn invoice(&self, request: InvoiceRequest) -> Result<InvoiceDocument, ServiceError> {
        let selector = request.selector()?;
        let db = &*self.db_pool;

        let query = match &selector {
            InvoiceSelector::Partials(ids) => partial_shipment::Entity::find()
                .filter(partial_shipment::Column::Id.is_in(ids.iter().copied())),
            InvoiceSelector::CustomerInShipment {
                customer_id,
                shipment_id,
            } => partial_shipment::Entity::find()
                .filter(partial_shipment::Column::CustomerId.eq(*customer_id))
                .filter(partial_shipment::Column::ShipmentId.eq(*shipment_id)),
        };
        let partials = query
            .order_by_asc(partial_shipment::Column::Id)
            .all(db)
            .await?;
        let partials = load_details(db, partials, true).await?;

        info!(?selector, count = partials.len(), "Invoice generated");
        Ok(InvoiceDocument {
            message: "Invoice generated".to_string(),
            partials,
        })
    }

    async fn shipment_detail(&self, shipment: shipment::Model) -> Result<ShipmentDetail, ServiceError> {
        let db = &*self.db_pool;
        let partials = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::ShipmentId.eq(shipment.id))
            .order_by_asc(partial_shipment::Column::Id)
            .all(db)
            .await?;
        Ok(ShipmentDetail {
            shipment,
            partial_shipments: load_details(db, partials, true).await?,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn delivery_list(
        &self,
        request: ShipmentDocumentRequest,
    ) -> Result<ShipmentDocument, ServiceError> {
        let shipment_id = request.shipment_id.to_id("shipmentId")?;
        let shipment = shipment::Entity::find_by_id(shipment_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))?;

        info!(shipment_id, "Delivery list generated");
        Ok(ShipmentDocument {
            message: "Delivery list generated".to_string(),
            shipment: self.shipment_detail(shipment).await?,
        })
    }

    /// Customs paperwork exists only for shipments that have been handed over.
    #[instrument(skip(self, request))]
    pub async fn customs(
        &self,
        request: ShipmentDocumentRequest,
    ) -> Result<ShipmentDocument, ServiceError> {
        let shipment_id = request.shipment_id.to_id("shipmentId")?;
        let shipment = shipment::Entity::find_by_id(shipment_id)
            .one(&*self.db_pool)
            .await?
            .filter(|s| !s.is_open)
            .ok_or_else(|| {
                ServiceError::BadRequest("Shipment not found or not closed".to_string())
            })?;

        info!(shipment_id, "Customs document generated");
        Ok(ShipmentDocument {
            message: "Customs document generated".to_string(),
            shipment: self.shipment_detail(shipment).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_ids_take_precedence() {
        let request: InvoiceRequest = serde_json::from_value(json!({
            "partialShipmentIds": [3, "4"],
            "customerId": 1,
            "shipmentId": 2
        }))
        .unwrap();
        assert_eq!(request.selector().unwrap(), InvoiceSelector::Partials(vec![3, 4]));
    }

    #[test]
    fn customer_and_shipment_select_together() {
        let request: InvoiceRequest =
            serde_json::from_value(json!({ "partialShipmentIds": [], "customerId": 1, "shipmentId": 2 }))
                .unwrap();
        assert_eq!(
            request.selector().unwrap(),
            InvoiceSelector::CustomerInShipment {
                customer_id: 1,
                shipment_id: 2
            }
        );
    }

    #[test]
    fn missing_selector_is_a_bad_request() {
        let request: InvoiceRequest = serde_json::from_value(json!({ "customerId": 1 })).unwrap();
        assert!(matches!(request.selector(), Err(ServiceError::BadRequest(_))));
    }
}
