use super::common::{created_response, file_response, path_id, ApiResult};
use crate::{
    commands::partial_shipments::CreatePartialShipmentRequest,
    common::{ApiJson, ApiPath},
    dto::{DeleteResponse, PartialShipmentDetail},
    entities::partial_shipment,
    errors::{ErrorResponse, ServiceError},
    services::partial_shipments::UpdatePartialShipmentRequest,
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::get,
    Json, Router,
};

fn ids(shipment_id: i32, partial_shipment_id: i32) -> Result<(i32, i32), ServiceError> {
    Ok((
        path_id(shipment_id, "shipment")?,
        path_id(partial_shipment_id, "partial shipment")?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}/partial-shipments",
    params(("id" = i32, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Partial shipments with packages and items", body = [PartialShipmentDetail]),
        (status = 404, description = "Shipment not found", body = ErrorResponse)
    ),
    tag = "partial-shipments"
)]
pub async fn list_partial_shipments(
    State(state): State<AppState>,
    ApiPath(shipment_id): ApiPath<i32>,
) -> ApiResult<Vec<PartialShipmentDetail>> {
    let shipment_id = path_id(shipment_id, "shipment")?;
    Ok(Json(
        state
            .partial_shipment_service()
            .list_for_shipment(shipment_id)
            .await?,
    ))
}

/// Creates a partial shipment, its packages and items, and updates the
/// shipment totals and customer balance atomically.
#[utoipa::path(
    post,
    path = "/api/shipments/{id}/partial-shipments",
    params(("id" = i32, Path, description = "Shipment ID")),
    request_body = CreatePartialShipmentRequest,
    responses(
        (status = 201, description = "Partial shipment created", body = PartialShipmentDetail),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Shipment or customer not found", body = ErrorResponse),
        (status = 409, description = "Shipment is closed", body = ErrorResponse),
        (status = 500, description = "Transaction failed", body = ErrorResponse)
    ),
    tag = "partial-shipments"
)]
pub async fn create_partial_shipment(
    State(state): State<AppState>,
    ApiPath(shipment_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreatePartialShipmentRequest>,
) -> Result<Response, ServiceError> {
    let shipment_id = path_id(shipment_id, "shipment")?;
    let created = state
        .partial_shipment_service()
        .create(shipment_id, payload)
        .await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}/partial-shipments/{pid}",
    params(
        ("id" = i32, Path, description = "Shipment ID"),
        ("pid" = i32, Path, description = "Partial shipment ID")
    ),
    responses(
        (status = 200, description = "Partial shipment with customer, packages and items", body = PartialShipmentDetail),
        (status = 404, description = "Partial shipment not found", body = ErrorResponse)
    ),
    tag = "partial-shipments"
)]
pub async fn get_partial_shipment(
    State(state): State<AppState>,
    ApiPath((shipment_id, pid)): ApiPath<(i32, i32)>,
) -> ApiResult<PartialShipmentDetail> {
    let (shipment_id, pid) = ids(shipment_id, pid)?;
    Ok(Json(
        state
            .partial_shipment_service()
            .get(shipment_id, pid)
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/shipments/{id}/partial-shipments/{pid}",
    params(
        ("id" = i32, Path, description = "Shipment ID"),
        ("pid" = i32, Path, description = "Partial shipment ID")
    ),
    request_body = UpdatePartialShipmentRequest,
    responses(
        (status = 200, description = "Partial shipment updated", body = partial_shipment::Model),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Partial shipment not found", body = ErrorResponse)
    ),
    tag = "partial-shipments"
)]
pub async fn update_partial_shipment(
    State(state): State<AppState>,
    ApiPath((shipment_id, pid)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdatePartialShipmentRequest>,
) -> ApiResult<partial_shipment::Model> {
    let (shipment_id, pid) = ids(shipment_id, pid)?;
    Ok(Json(
        state
            .partial_shipment_service()
            .update(shipment_id, pid, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/shipments/{id}/partial-shipments/{pid}",
    params(
        ("id" = i32, Path, description = "Shipment ID"),
        ("pid" = i32, Path, description = "Partial shipment ID")
    ),
    responses(
        (status = 200, description = "Partial shipment deleted and totals reduced", body = DeleteResponse),
        (status = 404, description = "Partial shipment not found", body = ErrorResponse)
    ),
    tag = "partial-shipments"
)]
pub async fn delete_partial_shipment(
    State(state): State<AppState>,
    ApiPath((shipment_id, pid)): ApiPath<(i32, i32)>,
) -> ApiResult<DeleteResponse> {
    let (shipment_id, pid) = ids(shipment_id, pid)?;
    state
        .partial_shipment_service()
        .delete(shipment_id, pid)
        .await?;
    Ok(Json(DeleteResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}/partial-shipments/{pid}/labels.zpl",
    params(
        ("id" = i32, Path, description = "Shipment ID"),
        ("pid" = i32, Path, description = "Partial shipment ID")
    ),
    responses(
        (status = 200, description = "One ZPL label per package", content_type = "text/plain", body = String),
        (status = 400, description = "Partial shipment has no packages", body = ErrorResponse),
        (status = 404, description = "Partial shipment not found", body = ErrorResponse)
    ),
    tag = "exports"
)]
pub async fn partial_shipment_labels(
    State(state): State<AppState>,
    ApiPath((shipment_id, pid)): ApiPath<(i32, i32)>,
) -> Result<Response, ServiceError> {
    let (shipment_id, pid) = ids(shipment_id, pid)?;
    let zpl = state.export_service().labels(shipment_id, pid).await?;
    Ok(file_response(
        zpl,
        "text/plain; charset=utf-8",
        &format!("labels_{}.zpl", pid),
    ))
}

/// Nested under `/shipments/:id/partial-shipments`.
pub fn partial_shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_partial_shipments).post(create_partial_shipment))
        .route(
            "/:pid",
            get(get_partial_shipment)
                .patch(update_partial_shipment)
                .delete(delete_partial_shipment),
        )
        .route("/:pid/labels.zpl", get(partial_shipment_labels))
}
