use crate::{
    commands::Command,
    common::NumericInput,
    db::{DatabaseAccess, DbPool},
    entities::customer,
    errors::ServiceError,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "phone": "+963 944 000 123", "balanceIncrement": "-25.50" }))]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Signed amount added to the balance at the database
    #[serde(default)]
    pub balance_increment: Option<NumericInput>,
    /// Rejected when present; balances only move through increments
    #[serde(default, skip_serializing)]
    #[schema(ignore)]
    pub balance: Option<serde_json::Value>,
}

/// Updates customer fields and applies an optional balance increment in one
/// transaction.
#[derive(Debug, Clone)]
pub struct UpdateCustomerCommand {
    pub customer_id: i32,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub balance_increment: Option<Decimal>,
}

impl UpdateCustomerCommand {
    pub fn from_request(
        customer_id: i32,
        request: UpdateCustomerRequest,
    ) -> Result<Self, ServiceError> {
        if request.balance.is_some() {
            return Err(ServiceError::ValidationError(
                "balance cannot be assigned directly; send balanceIncrement instead".to_string(),
            ));
        }

        let required = |value: Option<String>, field: &str| match value {
            Some(v) if v.trim().is_empty() => Err(ServiceError::ValidationError(format!(
                "{} must not be empty",
                field
            ))),
            other => Ok(other.map(|v| v.trim().to_string())),
        };

        Ok(Self {
            customer_id,
            name: required(request.name, "name")?,
            phone: request.phone.map(|p| p.trim().to_string()),
            address: required(request.address, "address")?,
            balance_increment: request
                .balance_increment
                .as_ref()
                .map(|v| v.to_decimal("balanceIncrement"))
                .transpose()?,
        })
    }
}

#[async_trait]
impl Command for UpdateCustomerCommand {
    type Result = customer::Model;

    #[instrument(skip(self, db_pool), fields(customer_id = self.customer_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let command = self.clone();
        let updated = DatabaseAccess::new(db_pool)
            .transaction::<_, customer::Model, ServiceError>(move |txn| {
                Box::pin(async move { command.apply(txn).await })
            })
            .await
            .map_err(|e| {
                error!("Failed to update customer {}: {}", self.customer_id, e);
                e
            })?;

        if let Some(increment) = self.balance_increment {
            info!(
                customer_id = updated.id,
                increment = %increment,
                balance = %updated.balance,
                "Customer balance adjusted"
            );
        }
        Ok(updated)
    }
}

impl UpdateCustomerCommand {
    async fn apply(self, txn: &DatabaseTransaction) -> Result<customer::Model, ServiceError> {
        let existing = customer::Entity::find_by_id(self.customer_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))?;

        if self.name.is_some() || self.phone.is_some() || self.address.is_some() {
            let mut active = existing.into_active_model();
            if let Some(name) = self.name {
                active.name = Set(name);
            }
            if let Some(phone) = self.phone {
                active.phone = Set(Some(phone).filter(|p| !p.is_empty()));
            }
            if let Some(address) = self.address {
                active.address = Set(address);
            }
            active.update(txn).await?;
        }

        if let Some(increment) = self.balance_increment {
            customer::Entity::update_many()
                .col_expr(
                    customer::Column::Balance,
                    Expr::col(customer::Column::Balance).add(increment),
                )
                .filter(customer::Column::Id.eq(self.customer_id))
                .exec(txn)
                .await?;
        }

        customer::Entity::find_by_id(self.customer_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_increment_accepts_signed_numeric_text() {
        let request: UpdateCustomerRequest =
            serde_json::from_value(json!({ "balanceIncrement": "-25.50" })).unwrap();
        let command = UpdateCustomerCommand::from_request(4, request).unwrap();
        assert_eq!(command.balance_increment, Some(dec!(-25.50)));
        assert!(command.name.is_none());
    }

    #[test]
    fn direct_balance_assignment_is_rejected() {
        let request: UpdateCustomerRequest =
            serde_json::from_value(json!({ "balance": 500 })).unwrap();
        assert!(matches!(
            UpdateCustomerCommand::from_request(4, request),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let request = UpdateCustomerRequest {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(UpdateCustomerCommand::from_request(4, request).is_err());
    }
}
