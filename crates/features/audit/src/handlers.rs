use crate::Audit;
use crate::model::OrderEvent;
use axum::Json;
use axum::extract::{Path, State};
use platter_domain::constants::{ORDER, TAG_ORDERS};
use platter_kernel::prelude::*;

#[api_handler(
    get,
    path = "/api/orders/{id}/timeline",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = OK, description = "Status history, oldest first", body = Vec<OrderEvent>),
        (status = NOT_FOUND, body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TAG_ORDERS,
)]
pub(crate) async fn timeline(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderEvent>>, ApiError> {
    let id = ResourceGuard::verify(id, ORDER)?;
    let audit = state.try_get_slice::<Audit>()?;
    Ok(Json(audit.service.timeline(&user, &id).await?))
}
