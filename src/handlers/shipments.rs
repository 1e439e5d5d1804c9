use super::common::{created_response, file_response, path_id, validate_input, ApiResult};
use crate::{
    commands::shipments::{CloseShipmentCommand, CloseShipmentRequest},
    common::{ApiJson, ApiPath},
    dto::{DeleteResponse, ShipmentDetail},
    entities::shipment,
    errors::{ErrorResponse, ServiceError},
    services::shipments::{CreateShipmentRequest, ShipmentFilter, UpdateShipmentRequest},
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[utoipa::path(
    get,
    path = "/api/shipments",
    params(ShipmentFilter),
    responses(
        (status = 200, description = "Shipments, newest first", body = [shipment::Model])
    ),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    Query(filter): Query<ShipmentFilter>,
) -> ApiResult<Vec<shipment::Model>> {
    Ok(Json(state.shipment_service().list_shipments(filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment created", body = shipment::Model),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateShipmentRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let created = state.shipment_service().create_shipment(payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    params(("id" = i32, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment with partial shipments, packages and items", body = ShipmentDetail),
        (status = 404, description = "Shipment not found", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<ShipmentDetail> {
    let id = path_id(id, "shipment")?;
    Ok(Json(state.shipment_service().get_shipment(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/shipments/{id}",
    params(("id" = i32, Path, description = "Shipment ID")),
    request_body = UpdateShipmentRequest,
    responses(
        (status = 200, description = "Shipment updated", body = shipment::Model),
        (status = 404, description = "Shipment not found", body = ErrorResponse),
        (status = 409, description = "Closed shipments cannot be reopened", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateShipmentRequest>,
) -> ApiResult<shipment::Model> {
    let id = path_id(id, "shipment")?;
    Ok(Json(state.shipment_service().update_shipment(id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/shipments/{id}/close",
    params(("id" = i32, Path, description = "Shipment ID")),
    request_body = CloseShipmentRequest,
    responses(
        (status = 200, description = "Shipment closed", body = shipment::Model),
        (status = 400, description = "Driver details missing", body = ErrorResponse),
        (status = 404, description = "Shipment not found", body = ErrorResponse),
        (status = 409, description = "Shipment already closed", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn close_shipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CloseShipmentRequest>,
) -> ApiResult<shipment::Model> {
    validate_input(&payload)?;
    let command = CloseShipmentCommand::new(path_id(id, "shipment")?, payload);
    Ok(Json(state.shipment_service().close_shipment(command).await?))
}

#[utoipa::path(
    delete,
    path = "/api/shipments/{id}",
    params(("id" = i32, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment deleted", body = DeleteResponse),
        (status = 404, description = "Shipment not found", body = ErrorResponse),
        (status = 409, description = "Shipment still has partial shipments", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<DeleteResponse> {
    state
        .shipment_service()
        .delete_shipment(path_id(id, "shipment")?)
        .await?;
    Ok(Json(DeleteResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}/exports/items.csv",
    params(("id" = i32, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Customs item manifest", content_type = "text/csv", body = String),
        (status = 404, description = "Shipment or items not found", body = ErrorResponse),
        (status = 409, description = "Shipment is still open", body = ErrorResponse)
    ),
    tag = "exports"
)]
pub async fn export_items_csv(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Response, ServiceError> {
    let id = path_id(id, "shipment")?;
    let body = state.export_service().items_csv(id).await?;
    Ok(file_response(
        body,
        CSV_CONTENT_TYPE,
        &format!("shipment_{}_items.csv", id),
    ))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}/exports/handover.csv",
    params(("id" = i32, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Driver handover sheet", content_type = "text/csv", body = String),
        (status = 404, description = "Shipment not found", body = ErrorResponse),
        (status = 409, description = "Shipment is still open", body = ErrorResponse)
    ),
    tag = "exports"
)]
pub async fn export_handover_csv(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Response, ServiceError> {
    let id = path_id(id, "shipment")?;
    let body = state.export_service().handover_csv(id).await?;
    Ok(file_response(
        body,
        CSV_CONTENT_TYPE,
        &format!("shipment_{}_handover.csv", id),
    ))
}

pub fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route(
            "/:id",
            get(get_shipment).patch(update_shipment).delete(delete_shipment),
        )
        .route("/:id/close", post(close_shipment))
        .route("/:id/exports/items.csv", get(export_items_csv))
        .route("/:id/exports/handover.csv", get(export_handover_csv))
        .nest(
            "/:id/partial-shipments",
            super::partial_shipments::partial_shipment_routes(),
        )
}
