use crate::Ordering;
use crate::model::{Order, OrdersQuery, PlaceOrderRequest, TransitionRequest};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use platter_domain::constants::{ORDER, TAG_ORDERS};
use platter_kernel::prelude::*;

fn ordering(state: &ApiState) -> Result<&Ordering, ApiError> {
    Ok(state.try_get_slice::<Ordering>()?)
}

#[api_handler(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = CREATED, description = "Order placed", body = Order),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = FORBIDDEN, description = "Only customers place orders", body = ErrorBody),
        (status = NOT_FOUND, description = "Unknown vendor", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_ORDERS,
)]
pub(crate) async fn place(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    user.require(RoleSet::CUSTOMER)?;
    let order = ordering(&state)?.service.place(&user, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[api_handler(
    get,
    path = "/api/orders",
    params(OrdersQuery, PageQuery),
    responses((status = OK, description = "Orders visible to the caller, newest first", body = Vec<Order>)),
    security(("bearer" = [])),
    tag = TAG_ORDERS,
)]
pub(crate) async fn list(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<OrdersQuery>,
    page: Page,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(ordering(&state)?.service.list(&user, query.status, page).await?))
}

#[api_handler(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = OK, body = Order),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_ORDERS,
)]
pub(crate) async fn get(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    Ok(Json(ordering(&state)?.service.get(&user, &id).await?))
}

#[api_handler(
    post,
    path = "/api/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = TransitionRequest,
    responses(
        (status = OK, description = "Status changed", body = Order),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = NOT_FOUND, body = ErrorBody),
        (status = CONFLICT, description = "Move not allowed, or the order changed meanwhile", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_ORDERS,
)]
pub(crate) async fn transition(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<TransitionRequest>,
) -> Result<Json<Order>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    Ok(Json(ordering(&state)?.service.transition(&user, &id, request).await?))
}
