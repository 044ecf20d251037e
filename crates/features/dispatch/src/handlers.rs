use crate::Dispatch;
use crate::model::{AvailabilityRequest, DeliveriesQuery, PartnerProfile, UpsertPartnerRequest};
use axum::Json;
use axum::extract::{Path, State};
use platter_domain::constants::{ORDER, TAG_DISPATCH};
use platter_kernel::prelude::*;
use platter_ordering::model::Order;

fn dispatch(state: &ApiState) -> Result<&Dispatch, ApiError> {
    Ok(state.try_get_slice::<Dispatch>()?)
}

fn partner(user: &AuthUser) -> Result<&AuthUser, ApiError> {
    user.require(RoleSet::PARTNER)
}

#[api_handler(
    get,
    path = "/api/partner/profile",
    responses(
        (status = OK, body = PartnerProfile),
        (status = NOT_FOUND, description = "Profile not set up yet", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn get_profile(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<PartnerProfile>, ApiError> {
    Ok(Json(dispatch(&state)?.service.profile(&partner(&user)?.id).await?))
}

#[api_handler(
    put,
    path = "/api/partner/profile",
    request_body = UpsertPartnerRequest,
    responses(
        (status = OK, body = PartnerProfile),
        (status = BAD_REQUEST, description = "Invalid fields or pincode not serviceable", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn put_profile(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpsertPartnerRequest>,
) -> Result<Json<PartnerProfile>, ApiError> {
    let id = &partner(&user)?.id;
    Ok(Json(dispatch(&state)?.service.upsert_profile(id, request).await?))
}

#[api_handler(
    post,
    path = "/api/partner/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = OK, body = PartnerProfile),
        (status = NOT_FOUND, description = "Profile not set up yet", body = ErrorBody),
        (status = CONFLICT, description = "A delivery is still open", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn availability(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<AvailabilityRequest>,
) -> Result<Json<PartnerProfile>, ApiError> {
    let id = &partner(&user)?.id;
    Ok(Json(dispatch(&state)?.service.set_availability(id, request.online).await?))
}

#[api_handler(
    get,
    path = "/api/partner/orders",
    params(DeliveriesQuery, PageQuery),
    responses((status = OK, description = "Orders assigned to the caller, newest first", body = Vec<Order>)),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn my_deliveries(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<DeliveriesQuery>,
    page: Page,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user = partner(&user)?;
    Ok(Json(dispatch(&state)?.service.my_deliveries(user, query.status, page).await?))
}

#[api_handler(
    get,
    path = "/api/partner/orders/available",
    params(PageQuery),
    responses(
        (status = OK, description = "Unassigned orders in the caller's area, oldest first", body = Vec<Order>),
        (status = CONFLICT, description = "Caller is offline", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn available(
    State(state): State<ApiState>,
    user: AuthUser,
    page: Page,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(dispatch(&state)?.service.available_orders(partner(&user)?, page).await?))
}

#[api_handler(
    post,
    path = "/api/partner/orders/{id}/accept",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = OK, description = "Order assigned to the caller", body = Order),
        (status = NOT_FOUND, body = ErrorBody),
        (status = CONFLICT, description = "Offline, busy, or the order was taken", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn accept(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    Ok(Json(dispatch(&state)?.service.accept(partner(&user)?, &id).await?))
}

#[api_handler(
    post,
    path = "/api/partner/orders/{id}/release",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = OK, description = "Order returned to the pool", body = Order),
        (status = NOT_FOUND, body = ErrorBody),
        (status = CONFLICT, description = "Already picked up", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn release(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    Ok(Json(dispatch(&state)?.service.release(partner(&user)?, &id).await?))
}

#[api_handler(
    post,
    path = "/api/partner/orders/{id}/pickup",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = OK, description = "Order is out for delivery", body = Order),
        (status = NOT_FOUND, body = ErrorBody),
        (status = CONFLICT, description = "Order is not ready for pickup", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn pickup(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    Ok(Json(dispatch(&state)?.service.pickup(partner(&user)?, &id).await?))
}

#[api_handler(
    post,
    path = "/api/partner/orders/{id}/deliver",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = OK, description = "Order delivered", body = Order),
        (status = NOT_FOUND, body = ErrorBody),
        (status = CONFLICT, description = "Order is not out for delivery", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_DISPATCH,
)]
pub(crate) async fn deliver(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    Ok(Json(dispatch(&state)?.service.deliver(partner(&user)?, &id).await?))
}
