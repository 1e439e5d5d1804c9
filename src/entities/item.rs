use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Customs-declarable line within a partial shipment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "items")]
#[serde(rename_all = "camelCase")]
#[schema(as = Item)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub partial_shipment_id: i32,
    pub weight: f64,
    pub origin: String,
    pub hscode: String,
    pub amount: f64,
    pub value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partial_shipment::Entity",
        from = "Column::PartialShipmentId",
        to = "super::partial_shipment::Column::Id",
        on_delete = "Cascade"
    )]
    PartialShipment,
}

impl Related<super::partial_shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartialShipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
