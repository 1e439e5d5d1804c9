use crate::{
    commands::{customers::UpdateCustomerCommand, Command},
    db::DbPool,
    dto::{CustomerDetail, CustomerPartialShipment},
    entities::{customer, partial_shipment, shipment},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Rami Haddad",
    "phone": "+49 170 5550101",
    "address": "Kaiserstr. 12, Frankfurt"
}))]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// All customers, ordered by name
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        Ok(customer::Entity::find()
            .order_by_asc(customer::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        let name = request.name.trim().to_string();
        let address = request.address.trim().to_string();
        if name.is_empty() || address.is_empty() {
            return Err(ServiceError::ValidationError(
                "Name and address are required".to_string(),
            ));
        }

        let created = customer::ActiveModel {
            name: Set(name),
            phone: Set(crate::common::clean_optional(request.phone)),
            address: Set(address),
            balance: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = created.id, "Customer created");
        Ok(created)
    }

    /// Customer with each partial shipment and the shipment it belongs to
    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: i32) -> Result<CustomerDetail, ServiceError> {
        let db = &*self.db_pool;
        let customer = customer::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))?;

        let partials = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::CustomerId.eq(id))
            .order_by_desc(partial_shipment::Column::CreatedAt)
            .all(db)
            .await?;
        let shipments = partials.load_one(shipment::Entity, db).await?;

        Ok(CustomerDetail {
            customer,
            partial_shipments: partials
                .into_iter()
                .zip(shipments)
                .map(|(partial, shipment)| CustomerPartialShipment { partial, shipment })
                .collect(),
        })
    }

    pub async fn update_customer(
        &self,
        command: UpdateCustomerCommand,
    ) -> Result<customer::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Deletes a customer that no partial shipment references
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))?;

        let references = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        if references > 0 {
            warn!(customer_id = id, references, "Refusing to delete customer with shipments");
            return Err(ServiceError::Conflict(format!(
                "Customer {} still has {} partial shipment(s)",
                id, references
            )));
        }

        customer::Entity::delete_by_id(id).exec(db).await?;
        info!(customer_id = id, "Customer deleted");
        Ok(())
    }
}
