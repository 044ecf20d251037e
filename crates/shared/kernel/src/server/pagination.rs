use crate::server::error::ApiError;
use crate::server::state::ApiState;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use platter_domain::config::MarketplaceConfig;
use serde::Deserialize;
use utoipa::IntoParams;

/// `?limit=&offset=` as sent by clients.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size; clamped to the configured maximum.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A clamped page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    #[must_use]
    pub fn new(query: PageQuery, config: &MarketplaceConfig) -> Self {
        let max = config.max_page_size.max(1);
        let limit = query.limit.unwrap_or(config.default_page_size).clamp(1, max);
        Self { limit, offset: query.offset.unwrap_or(0) }
    }

    /// First page with the configured default size.
    #[must_use]
    pub fn first(config: &MarketplaceConfig) -> Self {
        Self::new(PageQuery::default(), config)
    }
}

impl FromRequestParts<ApiState> for Page {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::try_from_uri(&parts.uri)?;
        Ok(Self::new(query, &state.config.marketplace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        let config = MarketplaceConfig { default_page_size: 20, max_page_size: 50, ..Default::default() };
        assert_eq!(Page::first(&config), Page { limit: 20, offset: 0 });
        assert_eq!(Page::new(PageQuery { limit: Some(0), offset: Some(5) }, &config).limit, 1);
        assert_eq!(Page::new(PageQuery { limit: Some(500), offset: None }, &config).limit, 50);
    }
}
