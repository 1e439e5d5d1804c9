use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShipDesk API",
        version = "1.0.0",
        description = r#"
# ShipDesk Shipping Management API

Back office for a freight forwarder consolidating customer parcels into
outbound shipments.

- **Customers**: senders with a running balance of money owed
- **Shipments**: consolidated loads, open until handed to a driver
- **Partial shipments**: one customer's consignment inside a shipment, with
  packages and customs items
- **Documents and exports**: invoice, delivery list and customs data, CSV
  manifests and ZPL package labels

## Error Handling

Errors are returned as `{ "error": "...", "requestId": "..." }` with status
400, 404, 409, 500 or 503.
"#
    ),
    tags(
        (name = "customers", description = "Customer management endpoints"),
        (name = "shipments", description = "Shipment endpoints"),
        (name = "partial-shipments", description = "Partial shipment endpoints"),
        (name = "documents", description = "Document data endpoints"),
        (name = "exports", description = "CSV and label exports"),
        (name = "health", description = "Service health")
    ),
    paths(
        crate::handlers::health::health_check,
        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,
        // Shipments
        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::create_shipment,
        crate::handlers::shipments::get_shipment,
        crate::handlers::shipments::update_shipment,
        crate::handlers::shipments::close_shipment,
        crate::handlers::shipments::delete_shipment,
        crate::handlers::shipments::export_items_csv,
        crate::handlers::shipments::export_handover_csv,
        // Partial shipments
        crate::handlers::partial_shipments::list_partial_shipments,
        crate::handlers::partial_shipments::create_partial_shipment,
        crate::handlers::partial_shipments::get_partial_shipment,
        crate::handlers::partial_shipments::update_partial_shipment,
        crate::handlers::partial_shipments::delete_partial_shipment,
        crate::handlers::partial_shipments::partial_shipment_labels,
        // Documents
        crate::handlers::documents::generate_invoice,
        crate::handlers::documents::generate_delivery_list,
        crate::handlers::documents::generate_customs_document,
    ),
    components(
        schemas(
            crate::entities::customer::Model,
            crate::entities::shipment::Model,
            crate::entities::partial_shipment::Model,
            crate::entities::package::Model,
            crate::entities::item::Model,
            crate::entities::PaymentStatus,
            crate::entities::PaymentResponsibility,
            crate::common::NumericInput,
            crate::dto::PartialShipmentDetail,
            crate::dto::ShipmentDetail,
            crate::dto::CustomerPartialShipment,
            crate::dto::CustomerDetail,
            crate::dto::DeleteResponse,
            crate::services::customers::CreateCustomerRequest,
            crate::commands::customers::UpdateCustomerRequest,
            crate::services::shipments::CreateShipmentRequest,
            crate::services::shipments::UpdateShipmentRequest,
            crate::commands::shipments::CloseShipmentRequest,
            crate::commands::partial_shipments::CreatePartialShipmentRequest,
            crate::commands::partial_shipments::PackageInput,
            crate::commands::partial_shipments::ItemInput,
            crate::services::partial_shipments::UpdatePartialShipmentRequest,
            crate::services::documents::InvoiceRequest,
            crate::services::documents::ShipmentDocumentRequest,
            crate::services::documents::InvoiceDocument,
            crate::services::documents::ShipmentDocument,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentHealth,
            crate::handlers::health::ComponentStatus,
            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn openapi_routes<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_partial_shipment_routes() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("ShipDesk API"));
        assert!(json.contains("/api/shipments/{id}/partial-shipments"));
        assert!(json.contains("/api/customers/{id}"));
    }
}
