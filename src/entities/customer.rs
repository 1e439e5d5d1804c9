use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A sender whose running balance tracks money owed across partial shipments.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "customers")]
#[serde(rename_all = "camelCase")]
#[schema(as = Customer)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub address: String,
    /// Positive when the customer owes money
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::partial_shipment::Entity")]
    PartialShipments,
}

impl Related<super::partial_shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartialShipments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
