use crate::{
    commands::Command,
    db::{DatabaseAccess, DbPool},
    entities::{item, package, partial_shipment, shipment},
    errors::ServiceError,
};
use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseTransaction, EntityTrait, ModelTrait, QueryFilter,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Removes a partial shipment with its packages and items and takes its
/// volume and package weight back off the parent shipment totals.
///
/// The customer balance is left untouched; balance corrections go through
/// the customer update endpoint.
#[derive(Debug, Clone)]
pub struct DeletePartialShipmentCommand {
    pub shipment_id: i32,
    pub partial_shipment_id: i32,
}

#[async_trait]
impl Command for DeletePartialShipmentCommand {
    type Result = ();

    #[instrument(skip(self, db_pool))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let shipment_id = self.shipment_id;
        let partial_shipment_id = self.partial_shipment_id;

        DatabaseAccess::new(db_pool)
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move { Self::remove(txn, shipment_id, partial_shipment_id).await })
            })
            .await
            .map_err(|e| {
                error!(
                    "Failed to delete partial shipment {} of shipment {}: {}",
                    partial_shipment_id, shipment_id, e
                );
                e
            })?;

        info!(shipment_id, partial_shipment_id, "Partial shipment deleted");
        Ok(())
    }
}

impl DeletePartialShipmentCommand {
    async fn remove(
        txn: &DatabaseTransaction,
        shipment_id: i32,
        partial_shipment_id: i32,
    ) -> Result<(), ServiceError> {
        let partial = partial_shipment::Entity::find_by_id(partial_shipment_id)
            .filter(partial_shipment::Column::ShipmentId.eq(shipment_id))
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Partial shipment"))?;

        let packages = partial.find_related(package::Entity).all(txn).await?;
        let package_weight: f64 = packages.iter().map(|p| p.weight).sum();

        item::Entity::delete_many()
            .filter(item::Column::PartialShipmentId.eq(partial.id))
            .exec(txn)
            .await?;
        package::Entity::delete_many()
            .filter(package::Column::PartialShipmentId.eq(partial.id))
            .exec(txn)
            .await?;
        partial_shipment::Entity::delete_by_id(partial.id)
            .exec(txn)
            .await?;

        shipment::Entity::update_many()
            .col_expr(
                shipment::Column::TotalVolume,
                Expr::col(shipment::Column::TotalVolume).sub(partial.volume),
            )
            .col_expr(
                shipment::Column::TotalWeight,
                Expr::col(shipment::Column::TotalWeight).sub(package_weight),
            )
            .filter(shipment::Column::Id.eq(shipment_id))
            .exec(txn)
            .await?;

        Ok(())
    }
}
