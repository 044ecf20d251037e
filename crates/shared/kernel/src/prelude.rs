//! Items nearly every slice handler needs.

pub use crate::safe_nanoid;
pub use crate::security::resource::ResourceGuard;
pub use crate::security::session::AuthUser;
pub use crate::server::error::{ApiError, ErrorBody};
pub use crate::server::extract::{ApiJson, ApiQuery};
pub use crate::server::pagination::{Page, PageQuery};
pub use crate::server::state::ApiState;
pub use platter_derive::{api_handler, api_model};
pub use platter_domain::roles::{Role, RoleSet};
