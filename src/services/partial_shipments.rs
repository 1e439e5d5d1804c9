use crate::{
    commands::{
        partial_shipments::{
            CreatePartialShipmentCommand, CreatePartialShipmentRequest,
            DeletePartialShipmentCommand,
        },
        Command,
    },
    common::{clean_optional, require_non_negative_decimal, NumericInput},
    db::DbPool,
    dto::PartialShipmentDetail,
    entities::{
        customer, item, package, partial_shipment, shipment, PaymentResponsibility, PaymentStatus,
    },
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    LoaderTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "paymentCompleted": true }))]
pub struct UpdatePartialShipmentRequest {
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub receiver_phone: Option<String>,
    #[serde(default)]
    pub receiver_address: Option<String>,
    #[serde(default)]
    pub cost: Option<NumericInput>,
    #[serde(default)]
    pub amount_paid: Option<NumericInput>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub payment_responsibility: Option<PaymentResponsibility>,
    /// Marks the partial shipment as fully paid (`amountPaid = cost`)
    #[serde(default)]
    pub payment_completed: Option<bool>,
}

/// Attaches packages, items and optionally the owning customer to each
/// partial shipment, preserving input order.
pub(crate) async fn load_details<C: ConnectionTrait>(
    db: &C,
    partials: Vec<partial_shipment::Model>,
    with_customer: bool,
) -> Result<Vec<PartialShipmentDetail>, DbErr> {
    let packages = partials.load_many(package::Entity, db).await?;
    let items = partials.load_many(item::Entity, db).await?;
    let customers = if with_customer {
        partials.load_one(customer::Entity, db).await?
    } else {
        vec![None; partials.len()]
    };

    Ok(partials
        .into_iter()
        .zip(packages)
        .zip(items)
        .zip(customers)
        .map(|(((partial, mut packages), mut items), customer)| {
            packages.sort_by_key(|p| p.id);
            items.sort_by_key(|i| i.id);
            PartialShipmentDetail {
                partial,
                packages,
                items,
                customer,
            }
        })
        .collect())
}

/// Service for the partial shipments of a shipment
#[derive(Clone)]
pub struct PartialShipmentService {
    db_pool: Arc<DbPool>,
}

impl PartialShipmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn ensure_shipment(&self, shipment_id: i32) -> Result<(), ServiceError> {
        shipment::Entity::find_by_id(shipment_id)
            .one(&*self.db_pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Shipment"))
    }

    async fn find_in_shipment(
        &self,
        shipment_id: i32,
        partial_shipment_id: i32,
    ) -> Result<partial_shipment::Model, ServiceError> {
        partial_shipment::Entity::find_by_id(partial_shipment_id)
            .filter(partial_shipment::Column::ShipmentId.eq(shipment_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Partial shipment"))
    }

    #[instrument(skip(self))]
    pub async fn list_for_shipment(
        &self,
        shipment_id: i32,
    ) -> Result<Vec<PartialShipmentDetail>, ServiceError> {
        self.ensure_shipment(shipment_id).await?;
        let db = &*self.db_pool;
        let partials = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::ShipmentId.eq(shipment_id))
            .order_by_asc(partial_shipment::Column::Id)
            .all(db)
            .await?;
        Ok(load_details(db, partials, false).await?)
    }

    /// Runs the atomic creation workflow
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        shipment_id: i32,
        request: CreatePartialShipmentRequest,
    ) -> Result<PartialShipmentDetail, ServiceError> {
        CreatePartialShipmentCommand {
            shipment_id,
            request,
        }
        .execute(self.db_pool.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        shipment_id: i32,
        partial_shipment_id: i32,
    ) -> Result<PartialShipmentDetail, ServiceError> {
        let partial = self
            .find_in_shipment(shipment_id, partial_shipment_id)
            .await?;
        load_details(&*self.db_pool, vec![partial], true)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Partial shipment"))
    }

    /// Plain field update. Balances and shipment totals are not touched.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        shipment_id: i32,
        partial_shipment_id: i32,
        request: UpdatePartialShipmentRequest,
    ) -> Result<partial_shipment::Model, ServiceError> {
        let existing = self
            .find_in_shipment(shipment_id, partial_shipment_id)
            .await?;

        let cost = match &request.cost {
            Some(input) => require_non_negative_decimal(input.to_decimal("cost")?, "cost")?,
            None => existing.cost,
        };
        let mut amount_paid = match &request.amount_paid {
            Some(input) => {
                require_non_negative_decimal(input.to_decimal("amountPaid")?, "amountPaid")?
            }
            None => existing.amount_paid,
        };
        let mut payment_status = request.payment_status.unwrap_or(existing.payment_status);
        if request.payment_completed == Some(true) {
            payment_status = PaymentStatus::Paid;
            amount_paid = cost;
        }

        let mut active = existing.into_active_model();
        if request.receiver_name.is_some() {
            active.receiver_name = Set(clean_optional(request.receiver_name));
        }
        if request.receiver_phone.is_some() {
            active.receiver_phone = Set(clean_optional(request.receiver_phone));
        }
        if request.receiver_address.is_some() {
            active.receiver_address = Set(clean_optional(request.receiver_address));
        }
        if let Some(responsibility) = request.payment_responsibility {
            active.payment_responsibility = Set(responsibility);
        }
        active.cost = Set(cost);
        active.amount_paid = Set(amount_paid);
        active.payment_status = Set(payment_status);
        active.is_paid = Set(payment_status == PaymentStatus::Paid);

        let updated = active.update(&*self.db_pool).await?;
        info!(
            partial_shipment_id = updated.id,
            payment_status = %updated.payment_status,
            "Partial shipment updated"
        );
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        shipment_id: i32,
        partial_shipment_id: i32,
    ) -> Result<(), ServiceError> {
        DeletePartialShipmentCommand {
            shipment_id,
            partial_shipment_id,
        }
        .execute(self.db_pool.clone())
        .await
    }
}
