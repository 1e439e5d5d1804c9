use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "packages")]
#[serde(rename_all = "camelCase")]
#[schema(as = Package)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub partial_shipment_id: i32,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

impl Model {
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
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
