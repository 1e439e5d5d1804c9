use super::common::ApiResult;
use crate::{
    common::ApiJson,
    errors::ErrorResponse,
    services::documents::{
        InvoiceDocument, InvoiceRequest, ShipmentDocument, ShipmentDocumentRequest,
    },
    AppState,
};
use axum::{extract::State, routing::post, Json, Router};

#[utoipa::path(
    post,
    path = "/api/documents/invoice",
    request_body = InvoiceRequest,
    responses(
        (status = 200, description = "Invoice data", body = InvoiceDocument),
        (status = 400, description = "No selector given", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn generate_invoice(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<InvoiceRequest>,
) -> ApiResult<InvoiceDocument> {
    Ok(Json(state.document_service().invoice(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/documents/delivery-list",
    request_body = ShipmentDocumentRequest,
    responses(
        (status = 200, description = "Delivery list data", body = ShipmentDocument),
        (status = 404, description = "Shipment not found", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn generate_delivery_list(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ShipmentDocumentRequest>,
) -> ApiResult<ShipmentDocument> {
    Ok(Json(state.document_service().delivery_list(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/documents/customs",
    request_body = ShipmentDocumentRequest,
    responses(
        (status = 200, description = "Customs document data", body = ShipmentDocument),
        (status = 400, description = "Shipment not found or not closed", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn generate_customs_document(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ShipmentDocumentRequest>,
) -> ApiResult<ShipmentDocument> {
    Ok(Json(state.document_service().customs(payload).await?))
}

pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/invoice", post(generate_invoice))
        .route("/delivery-list", post(generate_delivery_list))
        .route("/customs", post(generate_customs_document))
}
