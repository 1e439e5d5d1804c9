use crate::{
    commands::{shipments::CloseShipmentCommand, Command},
    db::DbPool,
    dto::ShipmentDetail,
    entities::{partial_shipment, shipment},
    errors::ServiceError,
    services::partial_shipments::load_details,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query string of `GET /shipments`. Unknown `status` values apply no filter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShipmentFilter {
    /// `open` or `closed`
    pub status: Option<String>,
    /// Exact destination match
    pub destination: Option<String>,
}

impl ShipmentFilter {
    fn open_flag(&self) -> Option<bool> {
        match self.status.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("open") => Some(true),
            Some(s) if s.eq_ignore_ascii_case("closed") => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "destination": "Syria", "note": "Weekly consolidation" }))]
pub struct CreateShipmentRequest {
    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "isOpen": false, "driverName": "Samir", "driverVehicle": "Volvo FH" }))]
pub struct UpdateShipmentRequest {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_vehicle: Option<String>,
    /// `false` closes the shipment. Closed shipments cannot be reopened.
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub date_closed: Option<DateTime<Utc>>,
}

/// Service for managing shipments
#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<shipment::Model, ServiceError> {
        shipment::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list_shipments(
        &self,
        filter: ShipmentFilter,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        let mut query = shipment::Entity::find();
        if let Some(open) = filter.open_flag() {
            query = query.filter(shipment::Column::IsOpen.eq(open));
        }
        if let Some(destination) = filter.destination.filter(|d| !d.trim().is_empty()) {
            query = query.filter(shipment::Column::Destination.eq(destination.trim()));
        }
        Ok(query
            .order_by_desc(shipment::Column::DateCreated)
            .order_by_desc(shipment::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_shipment(
        &self,
        request: CreateShipmentRequest,
    ) -> Result<shipment::Model, ServiceError> {
        let destination = request.destination.trim().to_string();
        if destination.is_empty() {
            return Err(ServiceError::ValidationError(
                "Destination is required".to_string(),
            ));
        }

        let created = shipment::ActiveModel {
            destination: Set(destination),
            date_created: Set(Utc::now()),
            is_open: Set(true),
            total_weight: Set(0.0),
            total_volume: Set(0.0),
            driver_name: Set(None),
            driver_vehicle: Set(None),
            date_closed: Set(None),
            note: Set(crate::common::clean_optional(request.note)),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(shipment_id = created.id, destination = %created.destination, "Shipment created");
        Ok(created)
    }

    /// Shipment with every partial shipment, their packages, items and
    /// customers.
    #[instrument(skip(self))]
    pub async fn get_shipment(&self, id: i32) -> Result<ShipmentDetail, ServiceError> {
        let db = &*self.db_pool;
        let shipment = Self::find(db, id).await?;
        let partials = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::ShipmentId.eq(id))
            .order_by_asc(partial_shipment::Column::Id)
            .all(db)
            .await?;

        Ok(ShipmentDetail {
            shipment,
            partial_shipments: load_details(db, partials, true).await?,
        })
    }

    /// Updates descriptive fields. `isOpen: false` closes the shipment through
    /// the same path as `POST /shipments/:id/close`.
    #[instrument(skip(self, request))]
    pub async fn update_shipment(
        &self,
        id: i32,
        request: UpdateShipmentRequest,
    ) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = Self::find(db, id).await?;

        match request.is_open {
            Some(true) if !existing.is_open => {
                return Err(ServiceError::Conflict(format!(
                    "Shipment {} is closed and cannot be reopened",
                    id
                )));
            }
            Some(false) if existing.is_open => {
                return CloseShipmentCommand {
                    shipment_id: id,
                    driver_name: request
                        .driver_name
                        .or(existing.driver_name)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                    driver_vehicle: request
                        .driver_vehicle
                        .or(existing.driver_vehicle)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                    note: request.note,
                    date_closed: request.date_closed,
                    destination: request.destination,
                }
                .execute(self.db_pool.clone())
                .await;
            }
            _ => {}
        }

        let mut active = existing.into_active_model();
        if let Some(destination) = request.destination {
            let destination = destination.trim().to_string();
            if destination.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Destination must not be empty".to_string(),
                ));
            }
            active.destination = Set(destination);
        }
        if request.note.is_some() {
            active.note = Set(crate::common::clean_optional(request.note));
        }
        if request.driver_name.is_some() {
            active.driver_name = Set(crate::common::clean_optional(request.driver_name));
        }
        if request.driver_vehicle.is_some() {
            active.driver_vehicle = Set(crate::common::clean_optional(request.driver_vehicle));
        }

        let updated = active.update(db).await?;
        info!(shipment_id = updated.id, "Shipment updated");
        Ok(updated)
    }

    pub async fn close_shipment(
        &self,
        command: CloseShipmentCommand,
    ) -> Result<shipment::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Deletes a shipment that carries no partial shipments
    #[instrument(skip(self))]
    pub async fn delete_shipment(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        Self::find(db, id).await?;

        let partials = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::ShipmentId.eq(id))
            .count(db)
            .await?;
        if partials > 0 {
            warn!(shipment_id = id, partials, "Refusing to delete shipment with partial shipments");
            return Err(ServiceError::Conflict(format!(
                "Shipment {} still has {} partial shipment(s)",
                id, partials
            )));
        }

        shipment::Entity::delete_by_id(id).exec(db).await?;
        info!(shipment_id = id, "Shipment deleted");
        Ok(())
    }
}
