use crate::{
    commands::Command,
    common::clean_optional,
    db::{DatabaseAccess, DbPool},
    entities::shipment,
    errors::ServiceError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "driverName": "Samir",
    "driverVehicle": "Volvo FH 34-221",
    "note": "Sealed at dock 3"
}))]
pub struct CloseShipmentRequest {
    #[validate(length(min = 1, message = "Driver name is required"))]
    pub driver_name: String,
    #[validate(length(min = 1, message = "Driver vehicle is required"))]
    pub driver_vehicle: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Hands a shipment over to a driver. Closing happens once: a closed
/// shipment cannot be closed again or reopened.
#[derive(Debug, Clone)]
pub struct CloseShipmentCommand {
    pub shipment_id: i32,
    pub driver_name: String,
    pub driver_vehicle: String,
    pub note: Option<String>,
    /// Defaults to now
    pub date_closed: Option<DateTime<Utc>>,
    /// Written in the same transaction as the close
    pub destination: Option<String>,
}

impl CloseShipmentCommand {
    pub fn new(shipment_id: i32, request: CloseShipmentRequest) -> Self {
        Self {
            shipment_id,
            driver_name: request.driver_name.trim().to_string(),
            driver_vehicle: request.driver_vehicle.trim().to_string(),
            note: request.note,
            date_closed: None,
            destination: None,
        }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if self.driver_name.trim().is_empty() || self.driver_vehicle.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Driver name and vehicle are required to close a shipment".to_string(),
            ));
        }
        if matches!(&self.destination, Some(d) if d.trim().is_empty()) {
            return Err(ServiceError::ValidationError(
                "Destination must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Command for CloseShipmentCommand {
    type Result = shipment::Model;

    #[instrument(skip(self, db_pool), fields(shipment_id = self.shipment_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let command = self.clone();
        let closed = DatabaseAccess::new(db_pool)
            .transaction::<_, shipment::Model, ServiceError>(move |txn| {
                Box::pin(async move { command.close(txn).await })
            })
            .await
            .map_err(|e| {
                error!("Failed to close shipment {}: {}", self.shipment_id, e);
                e
            })?;

        info!(
            shipment_id = closed.id,
            driver = %self.driver_name,
            "Shipment closed"
        );
        Ok(closed)
    }
}

impl CloseShipmentCommand {
    async fn close(self, txn: &DatabaseTransaction) -> Result<shipment::Model, ServiceError> {
        let existing = shipment::Entity::find_by_id(self.shipment_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))?;
        if !existing.is_open {
            return Err(ServiceError::Conflict(format!(
                "Shipment {} is already closed",
                self.shipment_id
            )));
        }

        let mut update = shipment::Entity::update_many()
            .col_expr(shipment::Column::IsOpen, Expr::value(false))
            .col_expr(
                shipment::Column::DateClosed,
                Expr::value(self.date_closed.unwrap_or_else(Utc::now)),
            )
            .col_expr(shipment::Column::DriverName, Expr::value(self.driver_name))
            .col_expr(
                shipment::Column::DriverVehicle,
                Expr::value(self.driver_vehicle),
            );
        if self.note.is_some() {
            update = update.col_expr(
                shipment::Column::Note,
                Expr::value(clean_optional(self.note)),
            );
        }
        if let Some(destination) = self.destination {
            update = update.col_expr(
                shipment::Column::Destination,
                Expr::value(destination.trim().to_string()),
            );
        }

        // Guarded on is_open so two concurrent closes cannot both succeed.
        let result = update
            .filter(shipment::Column::Id.eq(self.shipment_id))
            .filter(shipment::Column::IsOpen.eq(true))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Shipment {} is already closed",
                self.shipment_id
            )));
        }

        shipment::Entity::find_by_id(self.shipment_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_driver_details_are_rejected() {
        let command = CloseShipmentCommand::new(
            1,
            CloseShipmentRequest {
                driver_name: "  ".into(),
                driver_vehicle: "Truck".into(),
                note: None,
            },
        );
        assert!(matches!(
            command.validate(),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn request_requires_both_driver_fields() {
        let request: CloseShipmentRequest =
            serde_json::from_value(json!({ "driverName": "Samir", "driverVehicle": "" })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn blank_destination_is_rejected_before_closing() {
        let mut command = CloseShipmentCommand::new(
            1,
            CloseShipmentRequest {
                driver_name: "Samir".into(),
                driver_vehicle: "Truck".into(),
                note: None,
            },
        );
        command.destination = Some("   ".into());
        assert!(matches!(
            command.validate(),
            Err(ServiceError::ValidationError(ref m)) if m.contains("Destination")
        ));
    }
}
