use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A batch transport run to one destination.
///
/// `total_weight` and `total_volume` are running sums: they are only ever
/// moved by in-database increments when partial shipments are added or
/// removed, never recomputed from the children.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "shipments")]
#[serde(rename_all = "camelCase")]
#[schema(as = Shipment)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub destination: String,
    pub date_created: DateTime<Utc>,
    pub is_open: bool,
    pub total_weight: f64,
    pub total_volume: f64,
    pub driver_name: Option<String>,
    pub driver_vehicle: Option<String>,
    pub date_closed: Option<DateTime<Utc>>,
    pub note: Option<String>,
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
