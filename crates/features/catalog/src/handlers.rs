use crate::Catalog;
use crate::model::{
    CreateMenuItemRequest, MenuItem, Storefront, UpdateMenuItemRequest, UpsertProfileRequest,
    VendorProfile, VendorsQuery,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use platter_domain::constants::{MENU_ITEM, TAG_CATALOG, VENDOR};
use platter_domain::pincode::Pincode;
use platter_kernel::prelude::*;

fn catalog(state: &ApiState) -> Result<&Catalog, ApiError> {
    Ok(state.try_get_slice::<Catalog>()?)
}

fn vendor(user: &AuthUser) -> Result<&str, ApiError> {
    Ok(&user.require(RoleSet::VENDOR)?.id)
}

#[api_handler(
    get,
    path = "/api/vendor/profile",
    responses(
        (status = OK, body = VendorProfile),
        (status = NOT_FOUND, description = "Profile not set up yet", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_CATALOG,
)]
pub(crate) async fn get_profile(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<VendorProfile>, ApiError> {
    Ok(Json(catalog(&state)?.service.own_profile(vendor(&user)?).await?))
}

#[api_handler(
    put,
    path = "/api/vendor/profile",
    request_body = UpsertProfileRequest,
    responses(
        (status = OK, body = VendorProfile),
        (status = BAD_REQUEST, description = "Invalid fields or pincode not serviceable", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_CATALOG,
)]
pub(crate) async fn put_profile(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpsertProfileRequest>,
) -> Result<Json<VendorProfile>, ApiError> {
    Ok(Json(catalog(&state)?.service.upsert_profile(vendor(&user)?, request).await?))
}

#[api_handler(
    get,
    path = "/api/vendor/menu",
    responses((status = OK, description = "All items, including unavailable ones", body = Vec<MenuItem>)),
    security(("bearer" = [])),
    tag = TAG_CATALOG,
)]
pub(crate) async fn own_menu(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    Ok(Json(catalog(&state)?.service.own_menu(vendor(&user)?).await?))
}

#[api_handler(
    post,
    path = "/api/vendor/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = CREATED, body = MenuItem),
        (status = BAD_REQUEST, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_CATALOG,
)]
pub(crate) async fn create_item(
    State(state): State<ApiState>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    let item = catalog(&state)?.service.create_item(vendor(&user)?, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[api_handler(
    patch,
    path = "/api/vendor/menu/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = OK, body = MenuItem),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_CATALOG,
)]
pub(crate) async fn update_item(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateMenuItemRequest>,
) -> Result<Json<MenuItem>, ApiError> {
    let id = ResourceGuard::verify(id, MENU_ITEM)?;
    Ok(Json(catalog(&state)?.service.update_item(vendor(&user)?, &id, request).await?))
}

#[api_handler(
    delete,
    path = "/api/vendor/menu/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    responses(
        (status = NO_CONTENT, description = "Item deleted"),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_CATALOG,
)]
pub(crate) async fn delete_item(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = ResourceGuard::verify(id, MENU_ITEM)?;
    catalog(&state)?.service.delete_item(vendor(&user)?, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    get,
    path = "/api/vendors",
    params(VendorsQuery, PageQuery),
    responses(
        (status = OK, description = "Open vendors delivering to the pincode", body = Vec<VendorProfile>),
        (status = BAD_REQUEST, body = ErrorBody),
    ),
    tag = TAG_CATALOG,
)]
pub(crate) async fn list_vendors(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<VendorsQuery>,
    page: Page,
) -> Result<Json<Vec<VendorProfile>>, ApiError> {
    let pincode = Pincode::parse(&query.pincode).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(catalog(&state)?.service.list_vendors(&pincode, page).await?))
}

#[api_handler(
    get,
    path = "/api/vendors/{id}",
    params(("id" = String, Path, description = "Vendor id")),
    responses(
        (status = OK, body = Storefront),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    tag = TAG_CATALOG,
)]
pub(crate) async fn storefront(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Storefront>, ApiError> {
    let id = ResourceGuard::verify(id, VENDOR)?;
    Ok(Json(catalog(&state)?.service.storefront(&id).await?))
}
