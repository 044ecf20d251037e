use crate::Coverage;
use crate::model::{ServiceArea, UpsertAreaRequest};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use platter_domain::constants::TAG_COVERAGE;
use platter_domain::pincode::Pincode;
use platter_kernel::prelude::*;

fn coverage(state: &ApiState) -> Result<&Coverage, ApiError> {
    Ok(state.try_get_slice::<Coverage>()?)
}

fn pincode(raw: &str) -> Result<Pincode, ApiError> {
    Pincode::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

#[api_handler(
    get,
    path = "/api/pincodes",
    params(PageQuery),
    responses((status = OK, description = "Active service areas", body = Vec<ServiceArea>)),
    tag = TAG_COVERAGE,
)]
pub(crate) async fn list(
    State(state): State<ApiState>,
    page: Page,
) -> Result<Json<Vec<ServiceArea>>, ApiError> {
    Ok(Json(coverage(&state)?.service.list(page).await?))
}

#[api_handler(
    post,
    path = "/api/pincodes",
    request_body = UpsertAreaRequest,
    responses(
        (status = CREATED, description = "Area added", body = ServiceArea),
        (status = OK, description = "Existing area updated and reactivated", body = ServiceArea),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = FORBIDDEN, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_COVERAGE,
)]
pub(crate) async fn upsert(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpsertAreaRequest>,
) -> Result<(StatusCode, Json<ServiceArea>), ApiError> {
    user.require(RoleSet::ADMIN)?;
    let (area, created) = coverage(&state)?.service.upsert(request).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(area)))
}

#[api_handler(
    get,
    path = "/api/pincodes/{code}",
    params(("code" = String, Path, description = "Six-digit pincode")),
    responses(
        (status = OK, body = ServiceArea),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    tag = TAG_COVERAGE,
)]
pub(crate) async fn check(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> Result<Json<ServiceArea>, ApiError> {
    Ok(Json(coverage(&state)?.service.check(&pincode(&code)?).await?))
}

#[api_handler(
    delete,
    path = "/api/pincodes/{code}",
    params(("code" = String, Path, description = "Six-digit pincode")),
    responses(
        (status = OK, description = "Area deactivated", body = ServiceArea),
        (status = FORBIDDEN, body = ErrorBody),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_COVERAGE,
)]
pub(crate) async fn deactivate(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<ServiceArea>, ApiError> {
    user.require(RoleSet::ADMIN)?;
    Ok(Json(coverage(&state)?.service.deactivate(&pincode(&code)?).await?))
}
