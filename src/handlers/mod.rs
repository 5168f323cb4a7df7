pub mod companies;
pub mod extract;

use axum::routing::{get, post, put};
use axum::Router;

use crate::services::CompanyService;

#[derive(Clone)]
pub struct AppState {
    pub service: CompanyService,
}

pub fn company_routes(state: AppState) -> Router {
    Router::new()
        // Collection-level operations on the caller's own profile
        .route(
            "/api/companies",
            post(companies::company_post)
                .patch(companies::company_patch)
                .delete(companies::company_delete),
        )
        .route("/api/companies/me", get(companies::company_me_get))
        // Fixed segments before the id capture
        .route("/api/companies/search", get(companies::company_search_get))
        .route("/api/companies/stats", get(companies::company_stats_get))
        .route("/api/companies/check-name", get(companies::check_name_get))
        .route("/api/companies/images/:kind", put(companies::company_image_put))
        .route("/api/companies/:id", get(companies::company_get))
        .with_state(state)
}
