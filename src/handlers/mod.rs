pub mod common;
pub mod customers;
pub mod documents;
pub mod health;
pub mod partial_shipments;
pub mod shipments;

use crate::{
    db::DbPool,
    services::{
        customers::CustomerService, documents::DocumentService, exports::ExportService,
        partial_shipments::PartialShipmentService, shipments::ShipmentService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub shipments: Arc<ShipmentService>,
    pub partial_shipments: Arc<PartialShipmentService>,
    pub documents: Arc<DocumentService>,
    pub exports: Arc<ExportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            shipments: Arc::new(ShipmentService::new(db_pool.clone())),
            partial_shipments: Arc::new(PartialShipmentService::new(db_pool.clone())),
            documents: Arc::new(DocumentService::new(db_pool.clone())),
            exports: Arc::new(ExportService::new(db_pool)),
        }
    }
}
